//! DeleteColumn command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::operation::{operation, Execute};
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Delete a column, handing its tasks over to another column.
///
/// Without an explicit `reassign_to` the tasks go to the leftmost remaining
/// column. The last column cannot be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumn {
    pub id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reassign_to: Option<ColumnId>,
}

operation!(
    DeleteColumn,
    verb = "delete",
    noun = "column",
    description = "Delete a column and reassign its tasks"
);

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            reassign_to: None,
        }
    }

    pub fn reassign_to(mut self, column: impl Into<ColumnId>) -> Self {
        self.reassign_to = Some(column.into());
        self
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for DeleteColumn {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let reassign_to = {
            let model = ctx.model().await;
            model.require_column(&self.id)?;
            if model.columns().len() <= 1 {
                return Err(KanbanError::LastColumn {
                    id: self.id.to_string(),
                });
            }
            let reassign_to = match &self.reassign_to {
                Some(id) => id.clone(),
                None => model
                    .columns()
                    .iter()
                    .find(|c| c.id != self.id)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| KanbanError::LastColumn {
                        id: self.id.to_string(),
                    })?,
            };
            if reassign_to == self.id {
                return Err(KanbanError::SelfReassign {
                    id: self.id.to_string(),
                });
            }
            model.require_column(&reassign_to)?;
            reassign_to
        };

        ctx.gateway().delete_column(&self.id, &reassign_to).await?;

        let moved = ctx
            .commit(&[Collection::Columns, Collection::Tasks], |m| {
                m.remove_column(&self.id, &reassign_to)
            })
            .await?
            .unwrap_or_default();
        info!(column = %self.id, %reassign_to, tasks = moved.len(), "column deleted");

        ctx.reconcile(Collection::Columns).await;
        ctx.reconcile(Collection::Tasks).await;
        Ok(json!({
            "deleted": true,
            "id": self.id,
            "reassignedTo": reassign_to,
            "tasks": moved,
        }))
    }
}
