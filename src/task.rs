//! Task model shared by the state containers, the backends, and the views.
//!
//! A task row has the wire shape
//! `{id, title, description, priority, status, created_at, user_id}`.
//! Identifier, creation timestamp, and owner are assigned by the backend and
//! never change afterwards; everything else is patchable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(label)
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{other}' (expected low, medium, or high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Completed,
}

impl Status {
    /// Next status in the circular `todo -> in-progress -> completed -> todo`
    /// sequence. This is a view-layer convenience; containers never apply it
    /// on their own.
    pub fn next(self) -> Status {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::Todo,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in-progress" | "in_progress" | "progress" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected todo, in-progress, or completed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Payload for creating a task. Status always starts at `todo`; the backend
/// assigns id, timestamp, and owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl NewTask {
    /// Reject payloads the backend would bounce anyway (empty title).
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Partial update for a task. `None` fields are left untouched; id and owner
/// are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    /// Merge this patch over an existing task, in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Per-status tallies for the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn tally(tasks: &[Task]) -> Self {
        let mut counts = StatusCounts::default();
        for task in tasks {
            match task.status {
                Status::Todo => counts.todo += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Completed => counts.completed += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cycles_in_order() {
        assert_eq!(Status::Todo.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Completed);
        assert_eq!(Status::Completed.next(), Status::Todo);
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&Status::InProgress).expect("serialize");
        assert_eq!(json, "\"in-progress\"");
        let parsed: Status = serde_json::from_str("\"in-progress\"").expect("deserialize");
        assert_eq!(parsed, Status::InProgress);
    }

    #[test]
    fn patch_merge_keeps_unset_fields() {
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "Write spec".to_string(),
            description: "draft v1".to_string(),
            priority: Priority::High,
            status: Status::Todo,
            created_at: Utc::now(),
            user_id: Uuid::new_v4(),
        };
        let patch = TaskPatch {
            status: Some(Status::Completed),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut task);
        assert_eq!(task.status, Status::Completed);
        assert_eq!(task.title, "Write spec");
        assert_eq!(task.priority, Priority::High);
    }
}
