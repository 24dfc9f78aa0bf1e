//! In-process fakes shared by the board tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use shared::{Calendar, MonthRange, Tag, Task};
use uuid::Uuid;

use crate::backend::{BoardBackend, CreateTask, UpdateTask};
use crate::error::{BoardError, Result};
use crate::holidays::{Holiday, HolidaySource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateCalendar(String),
    GetCalendar(Uuid),
    ListTags,
    ListTasks(i32, u32),
    CreateTask(CreateTask),
    UpdateTask(Uuid, UpdateTask),
    DeleteTask(Uuid),
}

#[derive(Default)]
struct State {
    calendars: Vec<Calendar>,
    tags: Vec<Tag>,
    tasks: Vec<Task>,
    calls: Vec<Call>,
}

/// A [`BoardBackend`] that keeps data in memory and records every call.
#[derive(Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
    fail_writes: AtomicBool,
    fail_tag_reads: AtomicBool,
    fail_task_reads: AtomicBool,
}

pub fn task(calendar_id: Uuid, content: &str, date: NaiveDate, order: i32) -> Task {
    Task {
        id: Uuid::new_v4(),
        calendar_id,
        date,
        content: content.to_string(),
        order,
        tags: vec![],
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn check(flag: &AtomicBool) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        return Err(BoardError::Api {
            status: 500,
            message: "Internal server error".to_string(),
        });
    }
    Ok(())
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(&self, name: &str) -> Calendar {
        let calendar = Calendar {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().calendars.push(calendar.clone());
        calendar
    }

    pub fn with_tasks(&self, tasks: Vec<Task>) {
        self.state.lock().unwrap().tasks.extend(tasks);
    }

    pub fn with_tag(&self, name: &str, color: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.state.lock().unwrap().tags.push(tag.clone());
        tag
    }

    /// Make every create/update/delete fail with a 500.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_tag_reads(&self, fail: bool) {
        self.fail_tag_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_task_reads(&self, fail: bool) {
        self.fail_task_reads.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn stored(&self, id: Uuid) -> Option<Task> {
        self.state.lock().unwrap().tasks.iter().find(|t| t.id == id).cloned()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_write(&self) -> Result<()> {
        check(&self.fail_writes)
    }
}

#[async_trait]
impl BoardBackend for RecordingBackend {
    async fn create_calendar(&self, name: &str) -> Result<Calendar> {
        self.record(Call::CreateCalendar(name.to_string()));
        self.check_write()?;
        Ok(self.with_calendar(name))
    }

    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        self.record(Call::GetCalendar(id));
        let state = self.state.lock().unwrap();
        Ok(state.calendars.iter().find(|c| c.id == id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.record(Call::ListTags);
        check(&self.fail_tag_reads)?;
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn list_tasks(&self, calendar_id: Uuid, month: MonthRange) -> Result<Vec<Task>> {
        self.record(Call::ListTasks(month.year(), month.month()));
        check(&self.fail_task_reads)?;
        let state = self.state.lock().unwrap();
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.calendar_id == calendar_id && month.contains(t.date))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order);
        Ok(tasks)
    }

    async fn create_task(&self, new: &CreateTask) -> Result<Task> {
        self.record(Call::CreateTask(new.clone()));
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let tags = state.tags.iter().filter(|t| new.tag_ids.contains(&t.id)).cloned().collect();
        let created = Task {
            tags,
            ..task(new.calendar_id, &new.content, new.date, new.order)
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: Uuid, update: &UpdateTask) -> Result<Task> {
        self.record(Call::UpdateTask(id, update.clone()));
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let all_tags = state.tags.clone();
        let stored = state.tasks.iter_mut().find(|t| t.id == id).ok_or(BoardError::Api {
            status: 404,
            message: "Task not found".to_string(),
        })?;
        if let Some(date) = update.date {
            stored.date = date;
        }
        if let Some(content) = &update.content {
            stored.content = content.clone();
        }
        if let Some(order) = update.order {
            stored.order = order;
        }
        if let Some(tag_ids) = &update.tag_ids {
            stored.tags = all_tags.into_iter().filter(|t| tag_ids.contains(&t.id)).collect();
        }
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.record(Call::DeleteTask(id));
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(BoardError::Api {
                status: 404,
                message: "Task not found".to_string(),
            });
        }
        Ok(())
    }
}

/// Fixed holiday list; records which years were asked for.
#[derive(Default)]
pub struct StaticHolidays {
    holidays: Vec<Holiday>,
    years: Mutex<Vec<i32>>,
}

impl StaticHolidays {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self {
            holidays,
            years: Mutex::new(Vec::new()),
        }
    }

    pub fn years(&self) -> Vec<i32> {
        self.years.lock().unwrap().clone()
    }
}

#[async_trait]
impl HolidaySource for StaticHolidays {
    async fn holidays(&self, year: i32) -> Vec<Holiday> {
        self.years.lock().unwrap().push(year);
        self.holidays.iter().filter(|h| h.date.year() == year).cloned().collect()
    }
}
