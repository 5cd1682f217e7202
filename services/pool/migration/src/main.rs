use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(ekpool_pool_migration::Migrator).await;
}
