//! User-visible notifications (the toast messages of the analyzer page)

use colored::Colorize;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{info, warn};

pub const MSG_EMPTY_URL: &str = "Введите ссылку на сообщение";
pub const MSG_ANALYSIS_DONE: &str = "Анализ завершён!";
pub const MSG_ANALYSIS_FAILED: &str = "Ошибка при анализе";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to stderr
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                eprintln!("{} {}", "✔".green().bold(), notification.message.green())
            }
            NotificationKind::Error => {
                eprintln!("{} {}", "✖".red().bold(), notification.message.red())
            }
        }
    }
}

/// Emits notifications as log events
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!(message = %notification.message, "notification"),
            NotificationKind::Error => warn!(message = %notification.message, "notification"),
        }
    }
}

/// Keeps the most recent notifications in memory
#[derive(Debug)]
pub struct MemoryNotifier {
    limit: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl MemoryNotifier {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Oldest first
    pub fn all(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        // A panic while holding the lock leaves the queue itself intact
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        let mut entries = self.lock();
        if entries.len() == self.limit {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}

/// Fans a notification out to several sinks
pub struct Tee<A, B>(pub A, pub B);

impl<A: Notifier, B: Notifier> Notifier for Tee<A, B> {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
