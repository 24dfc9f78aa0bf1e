//! REST handlers for the task board.
//!
//! Each resource is served by its own Lambda binary (`calendar`, `tags`,
//! `tasks`); the handlers live here so they can be exercised against an
//! in-memory store.
//!
//! Endpoints:
//! - POST /calendar - Create a calendar
//! - GET /calendar?id= - Get a calendar (first one when id is omitted)
//! - GET /tags - List tags
//! - POST /tags - Create a tag
//! - GET /tasks?year=&month=&calendarId= - List a month of tasks
//! - POST /tasks - Create a task
//! - PUT /tasks/{id} - Update a task
//! - DELETE /tasks/{id} - Delete a task

pub mod calendar;
pub mod tags;
pub mod tasks;

mod request;

use std::sync::Arc;

use shared::{BoardStore, Config, PgStore};
use tracing_subscriber::EnvFilter;

/// Application state shared across invocations of one Lambda instance.
pub struct AppState {
    pub store: Arc<dyn BoardStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    /// Connect to Postgres using the environment configuration.
    pub async fn from_env() -> Result<Self, lambda_http::Error> {
        let config = Config::from_env()?;
        let pool = shared::db::create_pool(&config).await?;
        Ok(Self::new(Arc::new(PgStore::new(pool))))
    }
}

/// JSON logs filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
}
