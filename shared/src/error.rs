//! Error taxonomy shared by the store and the REST handlers.
//!
//! `Validation`, `NotFound` and `Conflict` are the caller's fault and carry
//! a message fit for the response body. Everything else becomes a 500.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Secrets Manager lookup failed
    #[error("AWS error: {0}")]
    Aws(String),

    /// Missing or malformed environment
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing field, bad date, unknown tag or calendar reference
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tag name already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown calendar or task id
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status the handlers answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Whether the error is the caller's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Conflict("x".into()).status_code(), 409);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
        assert_eq!(Error::Database(sqlx::Error::PoolTimedOut).status_code(), 500);
    }

    #[test]
    fn test_client_error() {
        assert!(Error::Conflict("dup".into()).is_client_error());
        assert!(!Error::Aws("boom".into()).is_client_error());
    }
}
