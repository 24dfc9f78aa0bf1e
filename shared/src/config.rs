//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full connection string, takes precedence over host/name/secret
    pub database_url: Option<String>,
    /// Database host
    pub db_host: Option<String>,
    /// Database name
    pub db_name: String,
    /// ARN of the secret containing database credentials
    pub db_secret_arn: Option<String>,
    /// AWS region
    pub aws_region: String,
    /// Apply pending migrations at cold start
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            database_url: lookup("DATABASE_URL"),
            db_host: lookup("DB_HOST"),
            db_name: lookup("DB_NAME").unwrap_or_else(|| "task_board".to_string()),
            db_secret_arn: lookup("DB_SECRET_ARN"),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        if config.database_url.is_none() && config.db_host.is_none() {
            return Err(Error::Config(
                "either DATABASE_URL or DB_HOST must be set".to_string(),
            ));
        }

        Ok(config)
    }
}
