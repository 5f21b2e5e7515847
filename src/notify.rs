//! Transient user-facing notifications.
//!
//! Containers publish a notification after every operation, success or
//! failure. Delivery is fire-and-forget: nothing is queued, nothing is
//! persisted, and the retained per-container error state is tracked
//! separately. Subscribers register a sink at composition time; a container
//! is never built without a notifier, so missing wiring fails at
//! construction rather than degrading silently.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Error,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Success => f.write_str("success"),
            Level::Error => f.write_str("error"),
            Level::Info => f.write_str("info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receiver of transient notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Publish/subscribe hub for notifications. Cheap to clone; clones share the
/// same subscriber list.
#[derive(Clone, Default)]
pub struct Notifier {
    sinks: Arc<RwLock<Vec<Arc<dyn NotificationSink>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, sink: Arc<dyn NotificationSink>) {
        let mut sinks = self.sinks.write().expect("notifier poisoned");
        sinks.push(sink);
    }

    pub fn emit(&self, notification: Notification) {
        let sinks = self.sinks.read().expect("notifier poisoned");
        for sink in sinks.iter() {
            sink.notify(&notification);
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Notification::new(Level::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notification::new(Level::Error, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Notification::new(Level::Info, message));
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.sinks.read().map(|sinks| sinks.len()).unwrap_or(0);
        f.debug_struct("Notifier").field("sinks", &count).finish()
    }
}

/// Sink that prints to stderr, used by the CLI.
pub struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&self, notification: &Notification) {
        eprintln!("[{}] {}", notification.level, notification.message);
    }
}

/// Sink that collects notifications in memory, used by tests and the
/// dashboard status line.
#[derive(Default)]
pub struct MemorySink {
    received: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut received = self.received.lock().expect("sink poisoned");
        std::mem::take(&mut *received)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.received.lock().expect("sink poisoned").clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().expect("sink poisoned").last().cloned()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: &Notification) {
        let mut received = self.received.lock().expect("sink poisoned");
        received.push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_every_subscriber() {
        let notifier = Notifier::new();
        let first = Arc::new(MemorySink::new());
        let second = Arc::new(MemorySink::new());
        notifier.subscribe(first.clone());
        notifier.subscribe(second.clone());

        notifier.success("task added");

        assert_eq!(first.snapshot().len(), 1);
        assert_eq!(second.snapshot().len(), 1);
        assert_eq!(second.last().expect("notification").level, Level::Success);
    }
}
