use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BoardStore;
use crate::models::{Calendar, MonthRange, NewTask, Tag, Task, TaskPatch};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct TaskRecord {
    id: Uuid,
    calendar_id: Uuid,
    date: NaiveDate,
    content: String,
    order: i32,
    tag_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    calendars: Vec<Calendar>,
    tags: HashMap<Uuid, Tag>,
    tasks: HashMap<Uuid, TaskRecord>,
}

impl Inner {
    fn check_tags(&self, tag_ids: &[Uuid]) -> Result<()> {
        match tag_ids.iter().find(|id| !self.tags.contains_key(id)) {
            Some(missing) => Err(Error::Validation(format!("Unknown tag id: {}", missing))),
            None => Ok(()),
        }
    }

    fn hydrate(&self, record: &TaskRecord) -> Task {
        let mut tags: Vec<Tag> = record
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Task {
            id: record.id,
            calendar_id: record.calendar_id,
            date: record.date,
            content: record.content.clone(),
            order: record.order,
            tags,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Process-local store for tests and single-process runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of task records currently held.
    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    /// Number of tag records currently held.
    pub async fn tag_count(&self) -> usize {
        self.inner.read().await.tags.len()
    }
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn create_calendar(&self, name: &str) -> Result<Calendar> {
        let calendar = Calendar {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.inner.write().await.calendars.push(calendar.clone());
        Ok(calendar)
    }

    async fn get_calendar(&self, id: Option<Uuid>) -> Result<Option<Calendar>> {
        let inner = self.inner.read().await;
        Ok(match id {
            Some(id) => inner.calendars.iter().find(|c| c.id == id).cloned(),
            None => inner.calendars.first().cloned(),
        })
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let inner = self.inner.read().await;
        let mut tags: Vec<Tag> = inner.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let mut inner = self.inner.write().await;
        if inner.tags.values().any(|t| t.name == name) {
            return Err(Error::Conflict(format!("Tag \"{}\" already exists.", name)));
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
        };
        inner.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn list_tasks(&self, calendar_id: Uuid, range: MonthRange) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut records: Vec<&TaskRecord> = inner
            .tasks
            .values()
            .filter(|t| t.calendar_id == calendar_id && range.contains(t.date))
            .collect();
        records.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        Ok(records.into_iter().map(|r| inner.hydrate(r)).collect())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        if !inner.calendars.iter().any(|c| c.id == task.calendar_id) {
            return Err(Error::Validation(format!("Unknown calendar id: {}", task.calendar_id)));
        }
        let tag_ids = dedup(task.tag_ids);
        inner.check_tags(&tag_ids)?;

        let now = Utc::now();
        let record = TaskRecord {
            id: Uuid::new_v4(),
            calendar_id: task.calendar_id,
            date: task.date,
            content: task.content,
            order: task.order,
            tag_ids,
            created_at: now,
            updated_at: now,
        };
        let created = inner.hydrate(&record);
        inner.tasks.insert(record.id, record);
        Ok(created)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let mut inner = self.inner.write().await;
        let tag_ids = patch.tag_ids.map(dedup);
        if let Some(ids) = &tag_ids {
            inner.check_tags(ids)?;
        }

        let record = inner
            .tasks
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Task {} not found", id)))?;
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(content) = patch.content {
            record.content = content;
        }
        if let Some(order) = patch.order {
            record.order = order;
        }
        if let Some(ids) = tag_ids {
            record.tag_ids = ids;
        }
        record.updated_at = Utc::now();

        let record = record.clone();
        Ok(inner.hydrate(&record))
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        match self.inner.write().await.tasks.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("Task {} not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    async fn seeded() -> (MemoryStore, Calendar) {
        let store = MemoryStore::new();
        let calendar = store.create_calendar("My Main Calendar").await.unwrap();
        (store, calendar)
    }

    fn new_task(calendar_id: Uuid, date: NaiveDate, content: &str, order: i32) -> NewTask {
        NewTask {
            calendar_id,
            date,
            content: content.to_string(),
            order,
            tag_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_first_calendar_when_id_omitted() {
        let (store, first) = seeded().await;
        store.create_calendar("Second").await.unwrap();
        let found = store.get_calendar(None).await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.get_calendar(Some(Uuid::new_v4())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_tag_conflicts() {
        let store = MemoryStore::new();
        store.create_tag("Urgent", "bg-red-500").await.unwrap();
        let err = store.create_tag("Urgent", "bg-blue-500").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.tag_count().await, 1);
    }

    #[tokio::test]
    async fn test_tags_sorted_by_name() {
        let store = MemoryStore::new();
        store.create_tag("work", "bg-blue-500").await.unwrap();
        store.create_tag("home", "bg-green-500").await.unwrap();
        let names: Vec<String> = store.list_tags().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["home", "work"]);
    }

    #[tokio::test]
    async fn test_task_tags_sorted_by_name() {
        let (store, calendar) = seeded().await;
        let work = store.create_tag("work", "bg-blue-500").await.unwrap();
        let home = store.create_tag("home", "bg-green-500").await.unwrap();
        let mut task = new_task(calendar.id, day(3), "tagged", 0);
        task.tag_ids = vec![work.id, home.id];

        let created = store.create_task(task).await.unwrap();
        assert_eq!(created.tag_ids(), vec![home.id, work.id]);
    }

    #[tokio::test]
    async fn test_list_tasks_bounded_and_ordered() {
        let (store, calendar) = seeded().await;
        let other = store.create_calendar("Other").await.unwrap();
        store.create_task(new_task(calendar.id, day(31), "last", 1)).await.unwrap();
        store.create_task(new_task(calendar.id, day(1), "first", 0)).await.unwrap();
        store
            .create_task(new_task(calendar.id, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), "june", 0))
            .await
            .unwrap();
        store.create_task(new_task(other.id, day(2), "elsewhere", 0)).await.unwrap();

        let tasks = store
            .list_tasks(calendar.id, MonthRange::new(2024, 5).unwrap())
            .await
            .unwrap();
        let contents: Vec<&str> = tasks.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn test_update_replaces_tag_set() {
        let (store, calendar) = seeded().await;
        let a = store.create_tag("A", "bg-red-500").await.unwrap();
        let b = store.create_tag("B", "bg-red-500").await.unwrap();
        let c = store.create_tag("C", "bg-red-500").await.unwrap();
        let mut task = new_task(calendar.id, day(3), "tagged", 0);
        task.tag_ids = vec![a.id, b.id];
        let task = store.create_task(task).await.unwrap();

        let updated = store
            .update_task(
                task.id,
                TaskPatch {
                    tag_ids: Some(vec![c.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.tag_ids(), vec![c.id]);
        assert_eq!(updated.content, "tagged");
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_tag_rejected() {
        let (store, calendar) = seeded().await;
        let task = store.create_task(new_task(calendar.id, day(3), "x", 0)).await.unwrap();
        let err = store
            .update_task(
                task.id,
                TaskPatch {
                    tag_ids: Some(vec![Uuid::new_v4()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_task_not_found() {
        let (store, calendar) = seeded().await;
        store.create_task(new_task(calendar.id, day(3), "keep", 0)).await.unwrap();

        let err = store.delete_task(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = store.update_task(Uuid::new_v4(), TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.task_count().await, 1);
    }
}
