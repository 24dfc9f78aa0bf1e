//! Board controller: owns the visible month and drives the optimistic
//! reorder protocol against a [`BoardBackend`].

use chrono::{Months, NaiveDate};
use futures::future::try_join_all;
use shared::{MonthRange, Tag, Task};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::{BoardBackend, CreateTask, UpdateTask};
use crate::error::{BoardError, Result};
use crate::grid::{self, GridDay};
use crate::holidays::{Holiday, HolidaySource};
use crate::reducer::{apply_move, plan_persistence, BoardSnapshot, DragMove, DropLocation, PersistPlan};
use crate::session::Session;
use crate::views::{DayCell, Intent, TaskCard};

/// What a drag-release turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Cancelled, out-of-month target, unknown task, or nothing changed.
    Ignored,
    /// Optimistic state was confirmed by the server.
    Persisted,
    /// Persisting failed and the month was reloaded from the server.
    Recovered,
}

pub struct BoardController<B, H> {
    backend: B,
    holiday_source: H,
    session: Session,
    month: MonthRange,
    snapshot: BoardSnapshot,
    tags: Vec<Tag>,
    holidays: Vec<Holiday>,
    search: String,
}

impl<B: BoardBackend, H: HolidaySource> BoardController<B, H> {
    pub fn new(backend: B, holiday_source: H, session: Session, month: MonthRange) -> Self {
        Self {
            backend,
            holiday_source,
            session,
            month,
            snapshot: BoardSnapshot::default(),
            tags: Vec::new(),
            holidays: Vec::new(),
            search: String::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn month(&self) -> MonthRange {
        self.month
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn tasks(&self) -> &[Task] {
        &self.snapshot.tasks
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Fetch tasks, holidays and tags for the visible month.
    pub async fn load(&mut self) -> Result<()> {
        self.show(self.month).await
    }

    /// Switch to `month`. Only a failed task fetch is reported, and it leaves
    /// the board on the month it was showing. A failed tag fetch keeps the
    /// previous tags.
    async fn show(&mut self, month: MonthRange) -> Result<()> {
        info!("Loading board for {}-{:02}", month.year(), month.month());
        let tasks = self
            .backend
            .list_tasks(self.session.calendar_id, month)
            .await
            .inspect_err(|e| error!("Failed to fetch tasks: {}", e))?;

        self.month = month;
        self.snapshot = self.snapshot.replaced(tasks);
        self.holidays = self.holiday_source.holidays(month.year()).await;

        match self.backend.list_tags().await {
            Ok(tags) => self.tags = tags,
            Err(e) => error!("Failed to fetch tags: {}", e),
        }
        Ok(())
    }

    /// Replace local tasks with server truth.
    pub async fn refresh_tasks(&mut self) -> Result<()> {
        let tasks = self.backend.list_tasks(self.session.calendar_id, self.month).await?;
        self.snapshot = self.snapshot.replaced(tasks);
        debug!(
            "Board refreshed: {} tasks, generation {}",
            self.snapshot.tasks.len(),
            self.snapshot.generation
        );
        Ok(())
    }

    async fn recover(&mut self) -> MoveOutcome {
        if let Err(e) = self.refresh_tasks().await {
            error!("Failed to reload board after move: {}", e);
        }
        MoveOutcome::Recovered
    }

    pub async fn next_month(&mut self) -> Result<()> {
        self.go_to(self.month.first.checked_add_months(Months::new(1))).await
    }

    pub async fn prev_month(&mut self) -> Result<()> {
        self.go_to(self.month.first.checked_sub_months(Months::new(1))).await
    }

    async fn go_to(&mut self, first: Option<NaiveDate>) -> Result<()> {
        let Some(first) = first else {
            return Ok(());
        };
        self.show(MonthRange::containing(first)).await
    }

    /// The drag event that moves a loaded task to `index` on `date`.
    pub fn move_of(&self, task_id: Uuid, date: NaiveDate, index: usize) -> Result<DragMove> {
        let task = self.snapshot.get(task_id).ok_or(BoardError::NotLoaded(task_id))?;
        let from = self
            .snapshot
            .day(task.date)
            .iter()
            .position(|t| t.id == task_id)
            .unwrap_or_default();
        Ok(DragMove {
            task_id,
            source: DropLocation::new(task.date, from),
            destination: Some(DropLocation::new(date, index)),
        })
    }

    pub fn card(&self, task_id: Uuid) -> Option<TaskCard> {
        self.snapshot.get(task_id).cloned().map(TaskCard::new)
    }

    pub fn day_cell(&self, date: NaiveDate) -> DayCell {
        DayCell::new(date, self.month, self.snapshot.day(date))
    }

    /// Apply a drag-release optimistically, then persist it.
    pub async fn on_drag_end(&mut self, mv: DragMove) -> MoveOutcome {
        let Some(destination) = mv.destination else {
            return MoveOutcome::Ignored;
        };
        if !self.month.contains(destination.group) {
            debug!("Drop on {} is outside the visible month", destination.group);
            return MoveOutcome::Ignored;
        }
        if self.snapshot.get(mv.task_id).is_none() {
            warn!("Dragged task {} is not on the board", mv.task_id);
            return MoveOutcome::Ignored;
        }

        let previous = self.snapshot.clone();
        let plan = plan_persistence(&previous, &mv);
        if plan == PersistPlan::Nothing {
            return MoveOutcome::Ignored;
        }
        self.snapshot = apply_move(&previous, &mv);

        match plan {
            PersistPlan::Nothing => MoveOutcome::Ignored,
            PersistPlan::Reorder(updates) => {
                info!("Reordering {} tasks on {}", updates.len(), mv.source.group);
                let bodies: Vec<(Uuid, UpdateTask)> =
                    updates.iter().map(|u| (u.task_id, UpdateTask::order(u.order))).collect();
                let calls = bodies.iter().map(|(id, body)| self.backend.update_task(*id, body));
                let result = try_join_all(calls).await;
                match result {
                    Ok(_) => MoveOutcome::Persisted,
                    Err(e) => {
                        error!("Failed to persist reorder: {}", e);
                        self.recover().await
                    }
                }
            }
            PersistPlan::Relocate { task_id, date, order } => {
                info!("Moving task {} to {} at {}", task_id, date, order);
                let result = self.backend.update_task(task_id, &UpdateTask::relocate(date, order)).await;
                match result {
                    Ok(_) => match self.refresh_tasks().await {
                        Ok(()) => MoveOutcome::Persisted,
                        Err(e) => {
                            error!("Failed to reload board after move: {}", e);
                            MoveOutcome::Recovered
                        }
                    },
                    Err(e) => {
                        error!("Failed to move task {}: {}", task_id, e);
                        self.recover().await
                    }
                }
            }
        }
    }

    /// Create a task at the top of `date`. Blank content is skipped.
    pub async fn create_task(&mut self, date: NaiveDate, content: &str, tag_ids: Vec<Uuid>) -> Result<Option<Task>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        let body = CreateTask {
            date,
            content: content.to_string(),
            calendar_id: self.session.calendar_id,
            order: 0,
            tag_ids,
        };
        let task = self
            .backend
            .create_task(&body)
            .await
            .inspect_err(|e| error!("Failed to create task: {}", e))?;
        self.refresh_tasks().await?;
        Ok(Some(task))
    }

    pub async fn update_task(&mut self, task_id: Uuid, content: String, tag_ids: Vec<Uuid>) -> Result<Task> {
        let task = self
            .backend
            .update_task(task_id, &UpdateTask::edit(content, tag_ids))
            .await
            .inspect_err(|e| error!("Failed to update task {}: {}", task_id, e))?;
        self.refresh_tasks().await?;
        Ok(task)
    }

    pub async fn delete_task(&mut self, task_id: Uuid) -> Result<()> {
        if self.snapshot.get(task_id).is_none() {
            return Err(BoardError::NotLoaded(task_id));
        }
        self.backend
            .delete_task(task_id)
            .await
            .inspect_err(|e| error!("Failed to delete task {}: {}", task_id, e))?;
        self.refresh_tasks().await
    }

    /// Carry out an intent emitted by a view. Failures are logged and leave
    /// the board as it was.
    pub async fn dispatch(&mut self, intent: Intent) -> bool {
        let result = match intent {
            Intent::Create { date, content, tag_ids } => self.create_task(date, &content, tag_ids).await.map(|_| ()),
            Intent::Update {
                task_id,
                content,
                tag_ids,
            } => self.update_task(task_id, content, tag_ids).await.map(|_| ()),
            Intent::Delete { task_id } => self.delete_task(task_id).await,
        };
        result.is_ok()
    }

    /// The month grid with the current search applied.
    pub fn grid(&self) -> Vec<GridDay> {
        grid::build_grid(self.month, &self.snapshot.tasks, &self.holidays, &self.search)
    }

    pub fn day_cells(&self) -> Vec<DayCell> {
        self.grid()
            .into_iter()
            .map(|day| DayCell::new(day.date, self.month, day.tasks))
            .collect()
    }
}
