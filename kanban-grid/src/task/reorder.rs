//! ReorderTask command

use super::mv::persist_cell;
use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::gateway::Applied;
use crate::operation::{operation, Execute};
use crate::reorder::plan_reorder;
use crate::types::TaskId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Drop a task onto another task: the dragged task takes the target's index
/// in the target's cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTask {
    pub id: TaskId,
    pub target: TaskId,
}

operation!(
    ReorderTask,
    verb = "reorder",
    noun = "task",
    description = "Move a task to the position of another task"
);

impl ReorderTask {
    pub fn new(id: impl Into<TaskId>, target: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for ReorderTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let mut planned = ctx.snapshot().await;
        let dragged = planned.require_task(&self.id)?.clone();
        let cell = planned.require_task(&self.target)?.cell();

        if self.id == self.target {
            debug!(task = %self.id, "task dropped on itself");
            return Ok(json!({ "id": self.id, "changes": [] }));
        }

        // A drop onto a task in another cell joins that cell first
        let changes_cell = !dragged.is_in(&cell);
        if changes_cell {
            planned.move_task(&self.id, &cell)?;
        }
        let plan = plan_reorder(&planned.cell_order(&cell), &self.id, &self.target).ok_or_else(
            || KanbanError::TaskNotFound {
                id: self.target.to_string(),
            },
        )?;

        if changes_cell {
            persist_cell(ctx, &dragged, &cell).await?;
        }
        let mut persisted = changes_cell;
        for (id, position) in &plan {
            if let Err(error) = ctx
                .gateway()
                .reorder_task_position(id, *position)
                .await
                .applied()
            {
                if persisted {
                    ctx.reconcile(Collection::Tasks).await;
                }
                return Err(error);
            }
            persisted = true;
        }

        ctx.commit(&[Collection::Tasks], |m| {
            if changes_cell {
                m.move_task(&self.id, &cell)?;
            }
            for (id, position) in &plan {
                m.set_task_position(id, *position)?;
            }
            Ok(())
        })
        .await?;
        info!(task = %self.id, target = %self.target, %cell, updates = plan.len(), "task reordered");

        ctx.reconcile(Collection::Tasks).await;
        Ok(json!({
            "id": self.id,
            "cell": cell,
            "changes": plan
                .iter()
                .map(|(id, position)| json!({ "id": id, "position": position }))
                .collect::<Vec<_>>(),
        }))
    }
}
