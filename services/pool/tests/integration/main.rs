mod audit_test;
mod concurrency_test;
mod helpers;
mod release_test;
mod reserve_test;
