//! Database connection management.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::secrets::get_database_credentials;
use crate::{Config, Error, Result};

/// Resolve the connection string, fetching credentials from Secrets Manager
/// when no `DATABASE_URL` is configured.
pub async fn database_url(config: &Config) -> Result<String> {
    if let Some(url) = &config.database_url {
        return Ok(url.clone());
    }

    let host = config
        .db_host
        .as_deref()
        .ok_or_else(|| Error::Config("DB_HOST not set".to_string()))?;
    let secret_arn = config
        .db_secret_arn
        .as_deref()
        .ok_or_else(|| Error::Config("DB_SECRET_ARN not set".to_string()))?;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
    let creds = get_database_credentials(&secrets_client, secret_arn).await?;
    Ok(creds.connection_url(host, &config.db_name))
}

/// Create a database connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let url = database_url(config).await?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .map_err(Error::Database)?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
