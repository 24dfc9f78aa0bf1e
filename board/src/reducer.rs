//! Day-local ordering and cross-day moves as pure transitions over an
//! immutable snapshot.
//!
//! Within one day, order indices are meant to be a dense `0..n` sequence
//! matching display order. The store does not enforce this; every
//! transition here re-establishes it for the groups it touches.

use chrono::NaiveDate;
use shared::Task;
use uuid::Uuid;

/// A day group and a position within it, as reported by a drag event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub group: NaiveDate,
    pub index: usize,
}

impl DropLocation {
    pub fn new(group: NaiveDate, index: usize) -> Self {
        Self { group, index }
    }

    /// Build from a `YYYY-MM-DD` group key.
    pub fn parse(key: &str, index: usize) -> Option<Self> {
        NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .ok()
            .map(|group| Self { group, index })
    }
}

/// A drag-release event. `destination` is `None` when the drop was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub task_id: Uuid,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

impl DragMove {
    pub fn is_same_day(&self) -> bool {
        self.destination.is_some_and(|d| d.group == self.source.group)
    }
}

/// Tasks of the visible month, sorted by `(date, order)`.
///
/// `generation` increases with every replacement so stale responses can at
/// least be spotted in the logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub tasks: Vec<Task>,
    pub generation: u64,
}

impl BoardSnapshot {
    pub fn new(mut tasks: Vec<Task>, generation: u64) -> Self {
        sort_board(&mut tasks);
        Self { tasks, generation }
    }

    /// Replace the contents with server truth.
    pub fn replaced(&self, tasks: Vec<Task>) -> Self {
        Self::new(tasks, self.generation + 1)
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// One day's tasks in display order.
    pub fn day(&self, date: NaiveDate) -> Vec<Task> {
        group_of(&self.tasks, date)
    }
}

/// A single order change to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub task_id: Uuid,
    pub order: i32,
}

/// What has to reach the server after a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistPlan {
    Nothing,
    /// Same-day reorder: one update per task whose position changed.
    Reorder(Vec<OrderUpdate>),
    /// Cross-day move: a single update of the dragged task.
    Relocate { task_id: Uuid, date: NaiveDate, order: i32 },
}

fn sort_board(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.date.cmp(&b.date).then(a.order.cmp(&b.order)));
}

fn to_order(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// The tasks of one day, sorted by current order (stable on ties).
pub fn group_of(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let mut group: Vec<Task> = tasks.iter().filter(|t| t.date == date).cloned().collect();
    group.sort_by_key(|t| t.order);
    group
}

/// Assign dense 0-based order indices following the current sequence.
pub fn reindex(group: Vec<Task>) -> Vec<Task> {
    group
        .into_iter()
        .enumerate()
        .map(|(i, mut task)| {
            task.order = to_order(i);
            task
        })
        .collect()
}

/// Take the task with `id` out of the list.
pub fn remove_task(tasks: &[Task], id: Uuid) -> (Vec<Task>, Option<Task>) {
    let mut removed = None;
    let rest = tasks
        .iter()
        .filter(|t| {
            if t.id == id && removed.is_none() {
                removed = Some((*t).clone());
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();
    (rest, removed)
}

/// One day's tasks sorted by order and densely re-indexed.
pub fn reindex_group(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    reindex(group_of(tasks, date))
}

/// Splice `task` into the day `date` at `index` (clamped to the group size),
/// re-date it, and re-index the whole day.
pub fn insert_into_group(tasks: &[Task], mut task: Task, date: NaiveDate, index: usize) -> Vec<Task> {
    let mut group: Vec<Task> = group_of(tasks, date).into_iter().filter(|t| t.id != task.id).collect();
    task.date = date;
    task.order = to_order(index);
    let at = index.min(group.len());
    group.insert(at, task);
    reindex(group)
}

/// Replace whole day groups, keeping every other task untouched.
pub fn merge_groups(tasks: &[Task], groups: &[(NaiveDate, Vec<Task>)]) -> Vec<Task> {
    let replaced_ids: Vec<Uuid> = groups.iter().flat_map(|(_, g)| g.iter().map(|t| t.id)).collect();
    let mut merged: Vec<Task> = tasks
        .iter()
        .filter(|t| !groups.iter().any(|(date, _)| *date == t.date) && !replaced_ids.contains(&t.id))
        .cloned()
        .collect();
    for (_, group) in groups {
        merged.extend(group.iter().cloned());
    }
    sort_board(&mut merged);
    merged
}

/// The optimistic state after a drag: remove, re-index the source day,
/// splice into the destination day, merge.
pub fn apply_move(snapshot: &BoardSnapshot, mv: &DragMove) -> BoardSnapshot {
    let Some(destination) = mv.destination else {
        return snapshot.clone();
    };
    let (rest, Some(dragged)) = remove_task(&snapshot.tasks, mv.task_id) else {
        return snapshot.clone();
    };

    let source_group = reindex_group(&rest, mv.source.group);
    let rest = merge_groups(&rest, &[(mv.source.group, source_group)]);

    let destination_group = insert_into_group(&rest, dragged, destination.group, destination.index);
    let tasks = merge_groups(&rest, &[(destination.group, destination_group)]);

    BoardSnapshot {
        tasks,
        generation: snapshot.generation + 1,
    }
}

/// Work out the server updates for a move, from the state before it.
pub fn plan_persistence(previous: &BoardSnapshot, mv: &DragMove) -> PersistPlan {
    let Some(destination) = mv.destination else {
        return PersistPlan::Nothing;
    };

    if destination.group != mv.source.group {
        return PersistPlan::Relocate {
            task_id: mv.task_id,
            date: destination.group,
            order: to_order(destination.index),
        };
    }

    let mut day = previous.day(mv.source.group);
    // Trust the event's index only when it points at the dragged task.
    let from = match day.get(mv.source.index) {
        Some(t) if t.id == mv.task_id => mv.source.index,
        _ => match day.iter().position(|t| t.id == mv.task_id) {
            Some(pos) => pos,
            None => return PersistPlan::Nothing,
        },
    };
    let moved = day.remove(from);
    let to = destination.index.min(day.len());
    day.insert(to, moved);

    let updates: Vec<OrderUpdate> = day
        .iter()
        .enumerate()
        .filter(|(i, t)| t.order != to_order(*i))
        .map(|(i, t)| OrderUpdate {
            task_id: t.id,
            order: to_order(i),
        })
        .collect();

    if updates.is_empty() {
        PersistPlan::Nothing
    } else {
        PersistPlan::Reorder(updates)
    }
}
