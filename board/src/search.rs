use shared::Task;

/// Case-insensitive substring match on content or any tag name.
/// A blank term matches every task.
pub fn matches(task: &Task, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    task.content.to_lowercase().contains(&term) || task.tags.iter().any(|tag| tag.name.to_lowercase().contains(&term))
}

pub fn filter_tasks<'a>(tasks: &'a [Task], term: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|t| matches(t, term)).collect()
}
