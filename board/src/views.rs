//! View state for a single day cell and a single task card.
//!
//! These hold only transient UI flags and drafts. Everything that must reach
//! the server leaves as an [`Intent`] for the controller to act on.

use chrono::NaiveDate;
use shared::{day_key, MonthRange, Tag, Task};
use uuid::Uuid;

/// Content longer than this is collapsed until expanded.
pub const COLLAPSE_AT: usize = 60;

const DEFAULT_BADGE: &str = "bg-gray-400 text-white";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create {
        date: NaiveDate,
        content: String,
        tag_ids: Vec<Uuid>,
    },
    Update {
        task_id: Uuid,
        content: String,
        tag_ids: Vec<Uuid>,
    },
    Delete {
        task_id: Uuid,
    },
}

/// Class list for a tag badge.
pub fn tag_badge_class(tag: &Tag) -> &str {
    if tag.color.starts_with("bg-") {
        &tag.color
    } else {
        DEFAULT_BADGE
    }
}

#[derive(Debug, Clone)]
pub struct TaskCard {
    task: Task,
    pub editing: bool,
    pub expanded: bool,
    pub show_actions: bool,
    pub draft_content: String,
    pub draft_tag_ids: Vec<Uuid>,
}

impl TaskCard {
    pub fn new(task: Task) -> Self {
        let draft_content = task.content.clone();
        let draft_tag_ids = task.tag_ids();
        Self {
            task,
            editing: false,
            expanded: false,
            show_actions: false,
            draft_content,
            draft_tag_ids,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Drag handle id.
    pub fn drag_id(&self) -> String {
        self.task.id.to_string()
    }

    pub fn hover(&mut self, over: bool) {
        self.show_actions = over;
    }

    pub fn is_long(&self) -> bool {
        self.task.content.chars().count() > COLLAPSE_AT
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn display_text(&self) -> String {
        if !self.is_long() || self.expanded {
            return self.task.content.clone();
        }
        let head: String = self.task.content.chars().take(COLLAPSE_AT).collect();
        format!("{}...", head.trim_end())
    }

    pub fn start_edit(&mut self) {
        self.editing = true;
    }

    pub fn toggle_tag(&mut self, tag_id: Uuid) {
        if let Some(pos) = self.draft_tag_ids.iter().position(|id| *id == tag_id) {
            self.draft_tag_ids.remove(pos);
        } else {
            self.draft_tag_ids.push(tag_id);
        }
    }

    /// Leave edit mode; emits an update unless the draft is blank.
    pub fn save(&mut self) -> Option<Intent> {
        self.editing = false;
        let content = self.draft_content.trim();
        if content.is_empty() {
            return None;
        }
        Some(Intent::Update {
            task_id: self.task.id,
            content: content.to_string(),
            tag_ids: self.draft_tag_ids.clone(),
        })
    }

    pub fn cancel(&mut self) {
        self.editing = false;
        self.draft_content = self.task.content.clone();
        self.draft_tag_ids = self.task.tag_ids();
    }

    pub fn delete(&self, confirmed: bool) -> Option<Intent> {
        confirmed.then_some(Intent::Delete { task_id: self.task.id })
    }
}

#[derive(Debug, Clone)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub tasks: Vec<Task>,
    pub adding: bool,
    pub draft_content: String,
    pub draft_tag_ids: Vec<Uuid>,
}

impl DayCell {
    pub fn new(date: NaiveDate, month: MonthRange, tasks: Vec<Task>) -> Self {
        Self {
            date,
            in_month: month.contains(date),
            tasks,
            adding: false,
            draft_content: String::new(),
            draft_tag_ids: Vec::new(),
        }
    }

    /// Drop group id of this cell.
    pub fn group_key(&self) -> String {
        day_key(self.date)
    }

    pub fn drop_disabled(&self) -> bool {
        !self.in_month
    }

    pub fn cards(&self) -> Vec<TaskCard> {
        self.tasks.iter().cloned().map(TaskCard::new).collect()
    }

    pub fn start_adding(&mut self) {
        self.adding = true;
    }

    pub fn submit(&mut self) -> Option<Intent> {
        let content = self.draft_content.trim().to_string();
        let tag_ids = std::mem::take(&mut self.draft_tag_ids);
        self.draft_content.clear();
        self.adding = false;
        if content.is_empty() {
            return None;
        }
        Some(Intent::Create {
            date: self.date,
            content,
            tag_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn tag(name: &str, color: &str) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    fn task(content: &str, tags: Vec<Tag>) -> Task {
        Task {
            id: Uuid::new_v4(),
            calendar_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            content: content.to_string(),
            order: 0,
            tags,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_tag_badge_class() {
        assert_eq!(tag_badge_class(&tag("Work", "bg-blue-500 text-white")), "bg-blue-500 text-white");
        assert_eq!(tag_badge_class(&tag("Odd", "#ff0000")), "bg-gray-400 text-white");
    }

    #[test]
    fn test_long_content_collapses() {
        let long = "x".repeat(80);
        let mut card = TaskCard::new(task(&long, vec![]));
        assert!(card.is_long());
        assert_eq!(card.display_text().chars().count(), COLLAPSE_AT + 3);
        assert!(card.display_text().ends_with("..."));

        card.toggle_expanded();
        assert_eq!(card.display_text(), long);

        let short = TaskCard::new(task("Buy milk", vec![]));
        assert_eq!(short.display_text(), "Buy milk");
    }

    #[test]
    fn test_save_emits_update() {
        let work = tag("Work", "bg-blue-500");
        let mut card = TaskCard::new(task("Buy milk", vec![work.clone()]));
        card.start_edit();
        card.draft_content = "  Buy oat milk ".to_string();
        card.toggle_tag(work.id);

        let intent = card.save();
        assert!(!card.editing);
        assert_eq!(
            intent,
            Some(Intent::Update {
                task_id: card.task().id,
                content: "Buy oat milk".to_string(),
                tag_ids: vec![],
            })
        );
    }

    #[test]
    fn test_blank_save_leaves_edit_mode_without_intent() {
        let mut card = TaskCard::new(task("Buy milk", vec![]));
        card.start_edit();
        card.draft_content = "   ".to_string();
        assert!(card.save().is_none());
        assert!(!card.editing);
    }

    #[test]
    fn test_cancel_restores_task_values() {
        let work = tag("Work", "bg-blue-500");
        let mut card = TaskCard::new(task("Buy milk", vec![work.clone()]));
        card.start_edit();
        card.draft_content = "changed".to_string();
        card.toggle_tag(work.id);
        card.cancel();
        assert!(!card.editing);
        assert_eq!(card.draft_content, "Buy milk");
        assert_eq!(card.draft_tag_ids, vec![work.id]);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let card = TaskCard::new(task("Buy milk", vec![]));
        assert!(card.delete(false).is_none());
        assert_eq!(card.delete(true), Some(Intent::Delete { task_id: card.task().id }));
    }

    #[test]
    fn test_day_cell_submit() {
        let month = MonthRange::new(2024, 5).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let mut cell = DayCell::new(date, month, vec![]);
        assert_eq!(cell.group_key(), "2024-05-07");
        assert!(!cell.drop_disabled());

        cell.start_adding();
        cell.draft_content = "   ".to_string();
        assert!(cell.submit().is_none());
        assert!(!cell.adding);

        let tag_id = Uuid::new_v4();
        cell.start_adding();
        cell.draft_content = "Dentist".to_string();
        cell.draft_tag_ids.push(tag_id);
        assert_eq!(
            cell.submit(),
            Some(Intent::Create {
                date,
                content: "Dentist".to_string(),
                tag_ids: vec![tag_id],
            })
        );
        assert!(cell.draft_content.is_empty());
        assert!(cell.draft_tag_ids.is_empty());
    }

    #[test]
    fn test_out_of_month_cell_rejects_drops() {
        let month = MonthRange::new(2024, 5).unwrap();
        let cell = DayCell::new(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), month, vec![]);
        assert!(cell.drop_disabled());
    }
}
