use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::BoardStore;
use crate::models::{Calendar, MonthRange, NewTask, Tag, Task, TaskPatch};
use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct CalendarRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<CalendarRow> for Calendar {
    fn from(row: CalendarRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    name: String,
    color: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    calendar_id: Uuid,
    date: NaiveDate,
    content: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self, tags: Vec<Tag>) -> Task {
        Task {
            id: self.id,
            calendar_id: self.calendar_id,
            date: self.date,
            content: self.content,
            order: self.sort_order,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskTagRow {
    task_id: Uuid,
    id: Uuid,
    name: String,
    color: String,
}

const TASK_COLUMNS: &str = "id, calendar_id, date, content, sort_order, created_at, updated_at";

/// Map driver errors onto the API taxonomy: unique violations are conflicts,
/// dangling references are the caller's fault.
fn map_sqlx_error(e: sqlx::Error, what: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return Error::Conflict(format!("{} already exists.", what));
        }
        if db_err.is_foreign_key_violation() {
            return Error::Validation(format!("{} references a missing record", what));
        }
    }
    Error::Database(e)
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tags_for(&self, task_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<TaskTagRow> = sqlx::query_as(
            r#"
            SELECT tt.task_id, t.id, t.name, t.color
            FROM task_tags tt
            JOIN tags t ON t.id = tt.tag_id
            WHERE tt.task_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_task: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            by_task.entry(row.task_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                color: row.color,
            });
        }
        Ok(by_task)
    }

    async fn load_task(&self, id: Uuid) -> Result<Task> {
        let row: TaskRow = sqlx::query_as(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Task {} not found", id)))?;
        let mut tags = self.tags_for(&[id]).await?;
        Ok(row.into_task(tags.remove(&id).unwrap_or_default()))
    }
}

async fn attach_tags(tx: &mut Transaction<'_, Postgres>, task_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
        .bind(tag_ids)
        .fetch_one(&mut **tx)
        .await?;
    let mut wanted = tag_ids.to_vec();
    wanted.sort();
    wanted.dedup();
    if known != wanted.len() as i64 {
        return Err(Error::Validation("Unknown tag id in tagIds".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO task_tags (task_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS tag_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(task_id)
    .bind(&wanted)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl BoardStore for PgStore {
    #[instrument(skip(self))]
    async fn create_calendar(&self, name: &str) -> Result<Calendar> {
        let row: CalendarRow = sqlx::query_as(
            "INSERT INTO calendars (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get_calendar(&self, id: Option<Uuid>) -> Result<Option<Calendar>> {
        let row: Option<CalendarRow> = match id {
            Some(id) => {
                sqlx::query_as("SELECT id, name, created_at FROM calendars WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id, name, created_at FROM calendars ORDER BY created_at LIMIT 1")
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(row.map(Calendar::from))
    }

    #[instrument(skip(self))]
    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name, color FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    #[instrument(skip(self))]
    async fn create_tag(&self, name: &str, color: &str) -> Result<Tag> {
        let row: TagRow = sqlx::query_as(
            "INSERT INTO tags (id, name, color) VALUES ($1, $2, $3) RETURNING id, name, color",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &format!("Tag \"{}\"", name)))?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self, calendar_id: Uuid, range: MonthRange) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE calendar_id = $1 AND date >= $2 AND date <= $3
            ORDER BY sort_order ASC, created_at ASC
            "#,
            TASK_COLUMNS
        ))
        .bind(calendar_id)
        .bind(range.first)
        .bind(range.last)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut tags = self.tags_for(&ids).await?;
        debug!("Loaded {} tasks", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| {
                let task_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_task(task_tags)
            })
            .collect())
    }

    #[instrument(skip(self, task), fields(calendar_id = %task.calendar_id))]
    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tasks (id, calendar_id, date, content, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(task.calendar_id)
        .bind(task.date)
        .bind(&task.content)
        .bind(task.order)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "Task"))?;

        attach_tags(&mut tx, id, &task.tag_ids).await?;
        tx.commit().await?;

        self.load_task(id).await
    }

    #[instrument(skip(self, patch))]
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET date = COALESCE($2, date),
                content = COALESCE($3, content),
                sort_order = COALESCE($4, sort_order),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.date)
        .bind(&patch.content)
        .bind(patch.order)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Task {} not found", id)));
        }

        if let Some(tag_ids) = &patch.tag_ids {
            sqlx::query("DELETE FROM task_tags WHERE task_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            attach_tags(&mut tx, id, tag_ids).await?;
        }

        tx.commit().await?;
        self.load_task(id).await
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Task {} not found", id)));
        }
        Ok(())
    }
}
