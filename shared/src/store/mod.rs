//! Persistence for calendars, tags and tasks.
//!
//! Handlers talk to a [`BoardStore`]; production wires in [`PgStore`],
//! tests and local runs use [`MemoryStore`]. Every call is an independent,
//! non-atomic store operation.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Calendar, MonthRange, NewTask, Tag, Task, TaskPatch};
use crate::Result;

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn create_calendar(&self, name: &str) -> Result<Calendar>;

    /// The calendar with `id`, or the first one ever created when `id` is `None`.
    async fn get_calendar(&self, id: Option<Uuid>) -> Result<Option<Calendar>>;

    /// All tags, ordered by name ascending.
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Fails with `Error::Conflict` when the name is taken.
    async fn create_tag(&self, name: &str, color: &str) -> Result<Tag>;

    /// Tasks of one calendar dated within `range`, ordered by order index, tags attached.
    async fn list_tasks(&self, calendar_id: Uuid, range: MonthRange) -> Result<Vec<Task>>;

    async fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Fails with `Error::NotFound` when no task has `id`.
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task>;

    /// Fails with `Error::NotFound` when no task has `id`.
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}
