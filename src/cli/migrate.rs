use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// Run embedded migrations against the connected database
pub async fn execute(pool: PgPool) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Migration failed")?;

    println!("✅ Database migrations applied");
    Ok(())
}
