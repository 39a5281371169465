//! Recurring-task generator entrypoint.
//!
//! Invoked with no arguments by an external scheduler (daily cron). Runs
//! one sweep, prints a human-readable summary, and exits 0 -- even when
//! individual rules errored. Only an unhandled fatal error exits 1.

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ems_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Recurring sweep failed fatally");
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL")?;
    let pool = ems_db::create_pool(&database_url).await?;
    ems_db::run_migrations(&pool).await?;

    let summary = ems_worker::sweep::run_sweep(&pool, Utc::now()).await?;
    print!("{summary}");

    Ok(())
}
