//! Operation processor that records board activity.
//!
//! Every operation run through the processor is a mutation attempt, so each
//! one leaves exactly one entry in the context's activity log, whether it
//! succeeded or failed.

use crate::activity::LogEntry;
use crate::context::BoardContext;
use crate::error::{KanbanError, Result};
use crate::operation::Execute;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct BoardOperationProcessor {
    actor: Option<String>,
}

impl BoardOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute every logged entry to `actor`
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Execute `operation` and log the attempt
    pub async fn process<T>(&self, operation: &T, ctx: &BoardContext) -> Result<Value>
    where
        T: Execute<BoardContext, KanbanError> + Serialize + Send + Sync,
    {
        let op = operation.op_string();
        let input = serde_json::to_value(operation)?;
        let start = Instant::now();

        let result = operation.execute(ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let output = match &result {
            Ok(value) => {
                debug!(%op, duration_ms, "operation succeeded");
                value.clone()
            }
            Err(error) => {
                warn!(%op, %error, duration_ms, "operation failed");
                json!({ "error": error.to_string() })
            }
        };

        ctx.append_activity(LogEntry::new(op, input, output, self.actor.clone(), duration_ms))
            .await;
        result
    }
}
