//! MoveTask command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::gateway::Applied;
use crate::operation::{operation, Execute};
use crate::types::{Cell, Task, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Move a task into another grid cell, at the end of that cell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub id: TaskId,
    pub target: Cell,
}

operation!(
    MoveTask,
    verb = "move",
    noun = "task",
    description = "Move a task to a different column and/or row"
);

impl MoveTask {
    pub fn new(id: impl Into<TaskId>, target: Cell) -> Self {
        Self {
            id: id.into(),
            target,
        }
    }
}

/// Persist the column and/or row change that puts `task` into `target`.
///
/// If the row call fails after the column call went through, tasks are
/// refetched so the model follows whatever the service now holds.
pub(crate) async fn persist_cell(ctx: &BoardContext, task: &Task, target: &Cell) -> Result<()> {
    let gateway = ctx.gateway();
    let mut column_moved = false;

    if task.column_id != target.column_id {
        gateway
            .move_task_to_column(&task.id, &target.column_id)
            .await
            .applied()?;
        column_moved = true;
    }

    if task.row_id != target.row_id {
        if let Err(error) = gateway
            .move_task_to_row(&task.id, target.row_id.as_ref())
            .await
            .applied()
        {
            if column_moved {
                ctx.reconcile(Collection::Tasks).await;
            }
            return Err(error);
        }
    }
    Ok(())
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for MoveTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let task = {
            let model = ctx.model().await;
            model.require_column(&self.target.column_id)?;
            if let Some(row_id) = &self.target.row_id {
                model.require_row(row_id)?;
            }
            model.require_task(&self.id)?.clone()
        };

        if task.is_in(&self.target) {
            debug!(task = %self.id, cell = %self.target, "task already in target cell");
            return Ok(serde_json::to_value(&task)?);
        }

        persist_cell(ctx, &task, &self.target).await?;

        let moved = ctx
            .commit(&[Collection::Tasks], |m| {
                m.move_task(&self.id, &self.target).map(Task::clone)
            })
            .await?;
        info!(task = %self.id, from = %task.cell(), to = %self.target, "task moved");

        ctx.reconcile(Collection::Tasks).await;
        let current = ctx.model().await.task(&self.id).cloned().or(moved);
        Ok(serde_json::to_value(current.unwrap_or(task))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::setup;
    use crate::gateway::GatewayCall;
    use crate::types::{ColumnId, RowId};

    #[tokio::test]
    async fn test_move_to_other_column_same_row() {
        let (gw, ctx) = setup().await;

        let result = MoveTask::new("t1", Cell::at("c2", "r1"))
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(result["columnId"], "c2");
        assert_eq!(result["rowId"], "r1");
        assert_eq!(
            gw.mutations().await,
            vec![GatewayCall::MoveTaskToColumn {
                task: TaskId::from("t1"),
                column: ColumnId::from("c2"),
            }]
        );

        let model = ctx.model().await;
        assert_eq!(model.cell_tasks(&Cell::at("c1", "r1")).len(), 2);
        model.validate().unwrap();
    }

    #[tokio::test]
    async fn test_move_to_other_column_and_row() {
        let (gw, ctx) = setup().await;

        MoveTask::new("t2", Cell::at("c3", "r2"))
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(
            gw.mutations().await,
            vec![
                GatewayCall::MoveTaskToColumn {
                    task: TaskId::from("t2"),
                    column: ColumnId::from("c3"),
                },
                GatewayCall::MoveTaskToRow {
                    task: TaskId::from("t2"),
                    row: Some(RowId::from("r2")),
                },
            ]
        );
        assert!(ctx
            .model()
            .await
            .task(&TaskId::from("t2"))
            .unwrap()
            .is_in(&Cell::at("c3", "r2")));
    }

    #[tokio::test]
    async fn test_move_within_same_cell_makes_no_calls() {
        let (gw, ctx) = setup().await;
        let before = ctx.snapshot().await;

        MoveTask::new("t1", Cell::at("c1", "r1"))
            .execute(&ctx)
            .await
            .unwrap();

        assert!(gw.calls().await.is_empty());
        assert_eq!(ctx.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_rejected_move_leaves_model_unchanged() {
        let (gw, ctx) = setup().await;
        let before = ctx.snapshot().await;
        gw.fail_next("move_task_to_column", 500, "database unavailable")
            .await;

        let err = MoveTask::new("t1", Cell::at("c2", "r1"))
            .execute(&ctx)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(ctx.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_move_to_unknown_column() {
        let (gw, ctx) = setup().await;

        let result = MoveTask::new("t1", Cell::at("nope", "r1")).execute(&ctx).await;

        assert!(matches!(result, Err(KanbanError::ColumnNotFound { .. })));
        assert!(gw.calls().await.is_empty());
    }
}
