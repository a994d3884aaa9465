//! Activity log entries recorded for every board mutation attempt

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ULID, so entries sort by creation time
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g. "move task", "delete row")
    pub op: String,

    /// The operation as it was issued
    pub input: Value,

    /// The result value, or `{"error": ...}` when the attempt failed
    pub output: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(
        op: impl Into<String>,
        input: Value,
        output: Value,
        actor: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor,
            duration_ms,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// True when the recorded attempt failed
    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}
