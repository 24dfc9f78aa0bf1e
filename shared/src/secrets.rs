//! Database credentials held in AWS Secrets Manager.

use std::collections::HashMap;
use std::sync::OnceLock;

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Raw secret strings by ARN, kept for the lifetime of the Lambda instance.
static SECRET_STRINGS: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn secret_strings() -> &'static RwLock<HashMap<String, String>> {
    SECRET_STRINGS.get_or_init(Default::default)
}

/// The JSON document RDS stores for a managed database user. Only
/// `username` and `password` are guaranteed.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
}

impl DatabaseCredentials {
    /// Postgres URL, preferring the secret's host and database over the
    /// configured fallbacks.
    pub fn connection_url(&self, fallback_host: &str, fallback_db: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password,
            self.host.as_deref().unwrap_or(fallback_host),
            self.port.unwrap_or(5432),
            self.dbname.as_deref().unwrap_or(fallback_db)
        )
    }
}

/// A secret's string value; fetched once per ARN.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    if let Some(cached) = secret_strings().read().await.get(secret_arn) {
        return Ok(cached.clone());
    }

    debug!("Fetching secret {}", secret_arn);
    let value = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?
        .secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?;

    secret_strings()
        .write()
        .await
        .insert(secret_arn.to_string(), value.clone());
    Ok(value)
}

pub async fn get_database_credentials(client: &SecretsClient, secret_arn: &str) -> Result<DatabaseCredentials> {
    parse_credentials(&get_secret(client, secret_arn).await?)
}

fn parse_credentials(raw: &str) -> Result<DatabaseCredentials> {
    serde_json::from_str(raw).map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}
