//! The calendar a client works against, cached in a small JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::BoardBackend;
use crate::error::{BoardError, Result};

pub const DEFAULT_CALENDAR_NAME: &str = "My Main Calendar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub calendar_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session has been saved yet.
    pub async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| BoardError::Session(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let text = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

impl Session {
    /// Reuse the cached calendar if the server still knows it, otherwise
    /// provision a fresh one and cache its id.
    pub async fn resolve<B: BoardBackend + ?Sized>(backend: &B, file: &SessionFile) -> Result<Session> {
        let cached = match file.load().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Ignoring unreadable session file: {}", e);
                None
            }
        };

        if let Some(session) = cached {
            if backend.get_calendar(session.calendar_id).await?.is_some() {
                return Ok(session);
            }
            warn!("Calendar {} no longer exists, provisioning a new one", session.calendar_id);
        }

        let calendar = backend.create_calendar(DEFAULT_CALENDAR_NAME).await?;
        info!("Created calendar {} ({})", calendar.name, calendar.id);
        let session = Session {
            calendar_id: calendar.id,
        };
        file.save(&session).await?;
        Ok(session)
    }
}
