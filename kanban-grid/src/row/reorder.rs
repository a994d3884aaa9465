//! ReorderRow command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::gateway::Applied;
use crate::operation::{operation, Execute};
use crate::reorder::plan_reorder;
use crate::types::RowId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Move a row (swimlane) to the index of another row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRow {
    pub id: RowId,
    pub target: RowId,
}

operation!(
    ReorderRow,
    verb = "reorder",
    noun = "row",
    description = "Move a row to the position of another row"
);

impl ReorderRow {
    pub fn new(id: impl Into<RowId>, target: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for ReorderRow {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let order = {
            let model = ctx.model().await;
            model.require_row(&self.id)?;
            model.require_row(&self.target)?;
            model.row_order()
        };
        let plan = plan_reorder(&order, &self.id, &self.target).unwrap_or_default();

        let mut persisted = 0;
        for (id, position) in &plan {
            if let Err(error) = ctx
                .gateway()
                .reorder_row_position(id, *position)
                .await
                .applied()
            {
                if persisted > 0 {
                    ctx.reconcile(Collection::Rows).await;
                }
                return Err(error);
            }
            persisted += 1;
        }

        if persisted > 0 {
            ctx.commit(&[Collection::Rows], |m| {
                plan.iter()
                    .try_for_each(|(id, position)| m.set_row_position(id, *position))
            })
            .await?;
            info!(row = %self.id, target = %self.target, updates = persisted, "row reordered");
            ctx.reconcile(Collection::Rows).await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::setup;
    use crate::gateway::GatewayCall;

    #[tokio::test]
    async fn test_swap_rows() {
        let (gw, ctx) = setup().await;

        ReorderRow::new("r1", "r2").execute(&ctx).await.unwrap();

        assert_eq!(
            gw.mutations().await,
            vec![
                GatewayCall::ReorderRowPosition {
                    row: RowId::from("r2"),
                    position: 0,
                },
                GatewayCall::ReorderRowPosition {
                    row: RowId::from("r1"),
                    position: 1,
                },
            ]
        );
        assert_eq!(ctx.model().await.rows()[0].id.as_str(), "r2");
    }

    #[tokio::test]
    async fn test_failed_update_keeps_model() {
        let (gw, ctx) = setup().await;
        let before = ctx.snapshot().await;
        gw.fail_next("reorder_row_position", 500, "boom").await;

        assert!(ReorderRow::new("r2", "r1").execute(&ctx).await.is_err());

        assert_eq!(ctx.snapshot().await, before);
        assert_eq!(gw.calls().await.len(), 1);
    }
}
