use crate::config::StoreConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Open a Postgres pool for `config.uri`. A non-empty username/password in the
/// config overrides credentials embedded in the URI.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    let mut options: PgConnectOptions = config.uri.parse()?;
    if !config.username.is_empty() {
        options = options.username(&config.username);
    }
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}
