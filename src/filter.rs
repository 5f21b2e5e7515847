//! Pure filtering over the task collection.
//!
//! Three predicates AND-combined: status match-or-all, priority
//! match-or-all, and a case-insensitive substring match on the title. The
//! filter never mutates the collection and preserves its order, so equal
//! inputs always produce the same subsequence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::task::{Priority, Status, Task};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Ok(StatusFilter::Only(value.parse()?))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl FromStr for PriorityFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        Ok(PriorityFilter::Only(value.parse()?))
    }
}

/// View-local filter criteria. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub search: String,
}

impl TaskFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.status == StatusFilter::All
            && self.priority == PriorityFilter::All
            && self.search.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        if let PriorityFilter::Only(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }

        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            if !task.title.to_lowercase().contains(&needle) {
                return false;
            }
        }

        true
    }

    /// Apply the filter, returning the matching subsequence in the
    /// collection's own order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}
