//! Persistence gateway: the durable side of the board.
//!
//! The core never assumes a mutation happened until the gateway call for it
//! resolves, and it resettles the model from the `fetch_*` calls after every
//! structural change.

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::{GatewayCall, GatewayUser, InMemoryGateway};

use crate::error::Result;
use crate::types::{Column, ColumnId, Row, RowId, Task, TaskId, UserId, UserWipStatus};
use async_trait::async_trait;
use tracing::warn;

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn move_task_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task>;

    /// `None` detaches the task from any row
    async fn move_task_to_row(&self, task_id: &TaskId, row_id: Option<&RowId>) -> Result<Task>;

    async fn reorder_task_position(&self, task_id: &TaskId, position: u32) -> Result<Task>;

    async fn reorder_column_position(&self, column_id: &ColumnId, position: u32) -> Result<Column>;

    async fn reorder_row_position(&self, row_id: &RowId, position: u32) -> Result<Row>;

    async fn check_user_wip_status(&self, user_id: &UserId) -> Result<UserWipStatus>;

    /// Only call after a non-exceeding [`check_user_wip_status`](Self::check_user_wip_status)
    async fn assign_user_to_task(&self, task_id: &TaskId, user_id: &UserId) -> Result<Task>;

    /// `cascade` must be true whenever the row still holds tasks
    async fn delete_row(&self, row_id: &RowId, cascade: bool) -> Result<()>;

    async fn delete_column(&self, column_id: &ColumnId, reassign_to: &ColumnId) -> Result<()>;

    async fn fetch_columns(&self) -> Result<Vec<Column>>;

    async fn fetch_rows(&self) -> Result<Vec<Row>>;

    async fn fetch_tasks(&self) -> Result<Vec<Task>>;
}

/// Result of a mutating call whose returned entity the caller does not need.
///
/// A success status with an unreadable body still means the service applied
/// the change; the caller refetches afterwards, so it counts as done.
pub(crate) trait Applied {
    fn applied(self) -> Result<()>;
}

impl<T> Applied for Result<T> {
    fn applied(self) -> Result<()> {
        match self {
            Ok(_) => Ok(()),
            Err(error) if error.is_committed() => {
                warn!(%error, "change accepted but its response was unreadable");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}
