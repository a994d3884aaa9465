//! DeleteRow command

use crate::context::{BoardContext, Collection};
use crate::error::{KanbanError, Result};
use crate::operation::{operation, Execute};
use crate::types::RowId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Delete a row. Its tasks stay in their columns with no row.
///
/// The last row cannot be deleted; that is refused before the service is
/// contacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRow {
    pub id: RowId,
}

operation!(
    DeleteRow,
    verb = "delete",
    noun = "row",
    description = "Delete a row and detach its tasks"
);

impl DeleteRow {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for DeleteRow {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let occupancy = {
            let model = ctx.model().await;
            model.require_row(&self.id)?;
            if model.rows().len() <= 1 {
                return Err(KanbanError::LastRow {
                    id: self.id.to_string(),
                });
            }
            model.row_occupancy(&self.id).unwrap_or(0)
        };

        let cascade = occupancy > 0;
        ctx.gateway().delete_row(&self.id, cascade).await?;

        let detached = ctx
            .commit(&[Collection::Rows, Collection::Tasks], |m| m.remove_row(&self.id))
            .await?
            .unwrap_or_default();
        info!(row = %self.id, cascade, tasks = detached.len(), "row deleted");

        ctx.reconcile(Collection::Rows).await;
        ctx.reconcile(Collection::Tasks).await;
        Ok(json!({
            "deleted": true,
            "id": self.id,
            "cascade": cascade,
            "detached": detached,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::setup;
    use crate::gateway::GatewayCall;
    use crate::task::MoveTask;
    use crate::types::{Cell, ColumnId};

    #[tokio::test]
    async fn test_delete_occupied_row_cascades() {
        let (gw, ctx) = setup().await;

        let result = DeleteRow::new("r1").execute(&ctx).await.unwrap();

        assert_eq!(result["cascade"], true);
        assert_eq!(result["detached"].as_array().unwrap().len(), 3);
        assert_eq!(
            gw.mutations().await,
            vec![GatewayCall::DeleteRow {
                row: RowId::from("r1"),
                cascade: true,
            }]
        );

        let model = ctx.model().await;
        assert_eq!(model.rows().len(), 1);
        assert!(model
            .tasks()
            .iter()
            .filter(|t| t.column_id == ColumnId::from("c1"))
            .all(|t| t.row_id.is_none()));
        model.validate().unwrap();
    }

    #[tokio::test]
    async fn test_last_row_is_refused_without_calls() {
        let (gw, ctx) = setup().await;
        DeleteRow::new("r1").execute(&ctx).await.unwrap();
        gw.clear_calls().await;

        let result = DeleteRow::new("r2").execute(&ctx).await;

        assert!(matches!(result, Err(KanbanError::LastRow { .. })));
        assert!(gw.calls().await.is_empty());
        assert_eq!(ctx.model().await.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_row_deleted_without_cascade() {
        let (gw, ctx) = setup().await;
        // t4 is the only task in r2
        MoveTask::new("t4", Cell::at("c2", "r1"))
            .execute(&ctx)
            .await
            .unwrap();
        gw.clear_calls().await;

        DeleteRow::new("r2").execute(&ctx).await.unwrap();

        assert_eq!(
            gw.mutations().await,
            vec![GatewayCall::DeleteRow {
                row: RowId::from("r2"),
                cascade: false,
            }]
        );
    }
}
