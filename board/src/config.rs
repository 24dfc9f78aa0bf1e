//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Base URL of the REST API, including the `/api` stage
    pub api_url: String,
    /// Base URL of the public holiday service
    pub holiday_api_url: String,
    /// ISO country code for the holiday overlay
    pub holiday_country: String,
    /// Where the calendar id is cached between runs
    pub session_file: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            holiday_api_url: "https://date.nager.at".to_string(),
            holiday_country: "PL".to_string(),
            session_file: PathBuf::from(".task-board-session.json"),
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("BOARD_API_URL").unwrap_or(defaults.api_url),
            holiday_api_url: env::var("HOLIDAY_API_URL").unwrap_or(defaults.holiday_api_url),
            holiday_country: env::var("HOLIDAY_COUNTRY").unwrap_or(defaults.holiday_country),
            session_file: env::var("BOARD_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
        }
    }
}
