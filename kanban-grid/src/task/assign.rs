//! AssignUser command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::gateway::Applied;
use crate::operation::{operation, Execute};
use crate::types::{TaskId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Assign a user to a task, respecting the user's personal WIP limit.
///
/// The limit is checked with the service first; a user who would exceed it
/// is never assigned. If the service still refuses the assignment (the
/// limit was reached in the meantime), its message is returned unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUser {
    pub task_id: TaskId,
    pub user_id: UserId,
}

operation!(
    AssignUser,
    verb = "assign",
    noun = "user",
    description = "Assign a user to a task"
);

impl AssignUser {
    pub fn new(task_id: impl Into<TaskId>, user_id: impl Into<UserId>) -> Self {
        Self {
            task_id: task_id.into(),
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for AssignUser {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let task = ctx.model().await.require_task(&self.task_id)?.clone();
        if task.is_assigned(&self.user_id) {
            debug!(task = %self.task_id, user = %self.user_id, "user already assigned");
            return Ok(json!({ "assigned": false, "task": task }));
        }

        let status = ctx.gateway().check_user_wip_status(&self.user_id).await?;
        if status.will_exceed_limit {
            warn!(user = %self.user_id, wip_limit = status.wip_limit, "assignment blocked by WIP limit");
            return Err(KanbanError::UserWipLimit {
                user_name: status.user_name,
                wip_limit: status.wip_limit,
            });
        }

        ctx.gateway()
            .assign_user_to_task(&self.task_id, &self.user_id)
            .await
            .applied()?;

        let assigned = ctx
            .commit(&[Collection::Tasks], |m| {
                m.assign_user(&self.task_id, &self.user_id)
                    .map(|t| t.clone())
            })
            .await?;
        info!(task = %self.task_id, user = %self.user_id, "user assigned");

        ctx.reconcile(Collection::Tasks).await;
        Ok(json!({
            "assigned": true,
            "task": assigned.unwrap_or(task),
        }))
    }
}
