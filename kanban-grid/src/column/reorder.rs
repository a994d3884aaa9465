//! ReorderColumn command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::gateway::Applied;
use crate::operation::{operation, Execute};
use crate::reorder::plan_reorder;
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Move a column to the index of another column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderColumn {
    pub id: ColumnId,
    pub target: ColumnId,
}

operation!(
    ReorderColumn,
    verb = "reorder",
    noun = "column",
    description = "Move a column to the position of another column"
);

impl ReorderColumn {
    pub fn new(id: impl Into<ColumnId>, target: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for ReorderColumn {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let order = {
            let model = ctx.model().await;
            model.require_column(&self.id)?;
            model.require_column(&self.target)?;
            model.column_order()
        };
        let plan = plan_reorder(&order, &self.id, &self.target).unwrap_or_default();

        for (index, (id, position)) in plan.iter().enumerate() {
            if let Err(error) = ctx
                .gateway()
                .reorder_column_position(id, *position)
                .await
                .applied()
            {
                if index > 0 {
                    ctx.reconcile(Collection::Columns).await;
                }
                return Err(error);
            }
        }

        if !plan.is_empty() {
            ctx.commit(&[Collection::Columns], |m| {
                for (id, position) in &plan {
                    m.set_column_position(id, *position)?;
                }
                Ok(())
            })
            .await?;
            info!(column = %self.id, target = %self.target, updates = plan.len(), "column reordered");
            ctx.reconcile(Collection::Columns).await;
        }

        Ok(json!({
            "id": self.id,
            "changes": plan
                .iter()
                .map(|(id, position)| json!({ "id": id, "position": position }))
                .collect::<Vec<_>>(),
        }))
    }
}
