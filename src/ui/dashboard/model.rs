//! Derived view state for the dashboard: which tasks are visible and which
//! one is selected. Pure functions over the collection snapshot.

use uuid::Uuid;

use crate::filter::TaskFilter;
use crate::task::Task;

/// Indices of tasks visible under the filter, in collection order.
pub fn filter_task_indices(tasks: &[Task], filter: &TaskFilter) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task))
        .map(|(idx, _)| idx)
        .collect()
}

/// Keep the previously selected task selected when it is still visible;
/// otherwise fall back to the first visible task.
pub fn select_by_id(tasks: &[Task], filtered: &[usize], previous: Option<Uuid>) -> Option<usize> {
    if filtered.is_empty() {
        return None;
    }

    if let Some(previous) = previous {
        if let Some(idx) = filtered
            .iter()
            .copied()
            .find(|idx| tasks.get(*idx).map(|task| task.id) == Some(previous))
        {
            return Some(idx);
        }
    }

    filtered.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusFilter;
    use crate::task::{Priority, Status};
    use chrono::Utc;

    fn task(title: &str, status: Status) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            status,
            created_at: Utc::now(),
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn filtering_preserves_collection_order() {
        let tasks = vec![
            task("one", Status::Todo),
            task("two", Status::Completed),
            task("three", Status::Todo),
        ];
        let filter = TaskFilter {
            status: StatusFilter::Only(Status::Todo),
            ..TaskFilter::default()
        };
        assert_eq!(filter_task_indices(&tasks, &filter), vec![0, 2]);
    }

    #[test]
    fn selection_sticks_to_surviving_task() {
        let tasks = vec![task("one", Status::Todo), task("two", Status::Todo)];
        let filtered = vec![0, 1];
        let keep = tasks[1].id;
        assert_eq!(select_by_id(&tasks, &filtered, Some(keep)), Some(1));
        assert_eq!(select_by_id(&tasks, &filtered, None), Some(0));
        assert_eq!(select_by_id(&tasks, &[], Some(keep)), None);
    }
}
