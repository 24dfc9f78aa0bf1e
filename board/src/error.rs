//! Error types for the board client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Error, Debug)]
pub enum BoardError {
    /// Transport failure talking to the API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Session file could not be used
    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Task id not present in the loaded month
    #[error("Task {0} is not on the board")]
    NotLoaded(uuid::Uuid),
}

impl BoardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BoardError::Api { status: 404, .. })
    }
}
