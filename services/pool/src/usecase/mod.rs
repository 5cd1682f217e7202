pub mod audit;
pub mod my_codes;
pub mod pool_admin;
pub mod release;
pub mod reserve;
pub mod user;
