//! User-facing notices raised when an action is refused or fails

use crate::error::{ErrorSeverity, KanbanError, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: String,
    pub severity: ErrorSeverity,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(severity: ErrorSeverity, message: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            severity,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn from_error(error: &KanbanError) -> Self {
        Self::new(error.severity(), error.to_string())
    }
}

/// Notices in the order they were raised, until dismissed
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: Vec<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice and return its id
    pub fn push(&mut self, notice: Notice) -> String {
        let id = notice.id.clone();
        self.notices.push(notice);
        id
    }

    /// Remove a notice; false if it was already gone
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn list(&self) -> &[Notice] {
        &self.notices
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
