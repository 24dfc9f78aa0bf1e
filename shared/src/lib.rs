//! Shared library for the task board Lambda functions and client.
//!
//! This crate provides the data model, error taxonomy, configuration,
//! database access and HTTP helpers used across all members.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod secrets;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{day_key, parse_task_date, Calendar, MonthRange, NewTask, Tag, Task, TaskPatch};
pub use secrets::{get_database_credentials, get_secret, DatabaseCredentials};
pub use store::{BoardStore, MemoryStore, PgStore};
