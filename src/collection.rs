//! Task collection state container.
//!
//! Sole in-memory owner of the task list; the backend remains the owner of
//! record. `refresh` replaces the collection wholesale, `add` appends,
//! `update` merges in place, `delete` removes. Collection order is insertion
//! order throughout. Every operation brackets the loading flag, publishes a
//! transient notification, and retains a failure message until the next
//! successful operation clears it.
//!
//! No cancellation: an in-flight operation always applies its result, even
//! when a newer one was started meanwhile (last-resolved-wins).

use std::sync::{Arc, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::session::SessionState;
use crate::store::TaskService;
use crate::task::{NewTask, StatusCounts, Task, TaskPatch};

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

/// Read-only view of the container for rendering.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct TaskCollection {
    service: Arc<dyn TaskService>,
    session: Arc<SessionState>,
    notifier: Notifier,
    inner: RwLock<Inner>,
}

impl TaskCollection {
    pub fn new(
        service: Arc<dyn TaskService>,
        session: Arc<SessionState>,
        notifier: Notifier,
    ) -> Self {
        Self {
            service,
            session,
            notifier,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Fetch the full task set and replace local state wholesale. Repeated
    /// calls against an unchanged backend yield an identical collection.
    pub async fn refresh(&self) -> Result<()> {
        let session = self.require_session("Failed to fetch tasks")?;
        self.begin();

        match self.service.list(&session).await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task collection refreshed");
                {
                    let mut inner = self.write();
                    inner.tasks = tasks;
                    inner.loading = false;
                    inner.error = None;
                }
                self.notifier.success("Tasks refreshed");
                Ok(())
            }
            Err(err) => {
                self.settle_failure("Failed to fetch tasks", &err);
                Err(err)
            }
        }
    }

    /// Create a task and append the backend-populated row at the end.
    pub async fn add(&self, new: NewTask) -> Result<Task> {
        let session = self.require_session("Failed to add task")?;
        self.begin();

        match self.service.insert(&session, &new).await {
            Ok(task) => {
                {
                    let mut inner = self.write();
                    inner.tasks.push(task.clone());
                    inner.loading = false;
                    inner.error = None;
                }
                self.notifier.success("Task added");
                Ok(task)
            }
            Err(err) => {
                self.settle_failure("Failed to add task", &err);
                Err(err)
            }
        }
    }

    /// Merge partial fields over an existing task. Fails with `TaskNotFound`
    /// when the id is not in the local collection; the entry keeps its
    /// position.
    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let session = self.require_session("Failed to update task")?;

        if !self.contains(id) {
            let err = Error::TaskNotFound(id);
            self.settle_failure("Failed to update task", &err);
            return Err(err);
        }

        self.begin();

        match self.service.update(&session, id, &patch).await {
            Ok(task) => {
                {
                    let mut inner = self.write();
                    if let Some(entry) = inner.tasks.iter_mut().find(|task| task.id == id) {
                        *entry = task.clone();
                    }
                    inner.loading = false;
                    inner.error = None;
                }
                self.notifier.success("Task updated");
                Ok(task)
            }
            Err(err) => {
                self.settle_failure("Failed to update task", &err);
                Err(err)
            }
        }
    }

    /// Remove a task. Deleting an id that is already gone is reported as
    /// `TaskNotFound`, never silently ignored.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let session = self.require_session("Failed to delete task")?;

        if !self.contains(id) {
            let err = Error::TaskNotFound(id);
            self.settle_failure("Failed to delete task", &err);
            return Err(err);
        }

        self.begin();

        match self.service.delete(&session, id).await {
            Ok(()) => {
                {
                    let mut inner = self.write();
                    inner.tasks.retain(|task| task.id != id);
                    inner.loading = false;
                    inner.error = None;
                }
                self.notifier.success("Task deleted");
                Ok(())
            }
            Err(err) => {
                self.settle_failure("Failed to delete task", &err);
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        let inner = self.read();
        CollectionSnapshot {
            tasks: inner.tasks.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.read().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.read().tasks)
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    fn contains(&self, id: Uuid) -> bool {
        self.read().tasks.iter().any(|task| task.id == id)
    }

    fn require_session(&self, context: &str) -> Result<crate::profile::Session> {
        match self.session.session() {
            Some(session) => Ok(session),
            None => {
                let err = Error::NotAuthenticated;
                self.settle_failure(context, &err);
                Err(err)
            }
        }
    }

    fn begin(&self) {
        self.write().loading = true;
    }

    fn settle_failure(&self, context: &str, err: &Error) {
        let message = format!("{context}: {err}");
        {
            let mut inner = self.write();
            inner.loading = false;
            inner.error = Some(message.clone());
        }
        self.notifier.error(message);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("task collection poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("task collection poisoned")
    }
}
