pub mod audit_logs;
pub mod codes;
pub mod users;
