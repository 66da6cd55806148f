use crate::error::PortalError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, PortalError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    info!("Connected to database");

    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<(), PortalError> {
    sqlx::migrate!().run(pool).await?;
    info!("Migrations applied");
    Ok(())
}
