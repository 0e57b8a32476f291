//! Migration CLI tool.
//!
//! Reads `DATABASE_URL`; run `migration up` / `migration down` / `migration status`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();

    tracing::info!("Running Agora migrations");
    cli::run_cli(migration::Migrator).await;
}
