//! One-shot migration CLI: applies pending migrations from the
//! embedded `migrations/` set against the configured database.
//! Exits non-zero on any failure; a second run applies nothing.

use anyhow::Context;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use talkdeck_server::{db, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("Failed to migrate: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Settings::new().context("loading configuration")?;
    info!(
        "Running migrations on '{}' ({})",
        config.environment,
        config.database_endpoint()
    );

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(db::connect_options(&config.database))
        .await
        .context("connecting to database")?;

    let migrator = sqlx::migrate!("./migrations");
    for migration in migrator.iter() {
        info!(
            "known migration {:04}: {}",
            migration.version, migration.description
        );
    }

    migrator
        .run(&pool)
        .await
        .context("applying migrations")?;

    info!("migrations applied successfully; database is up to date");
    pool.close().await;
    Ok(())
}
