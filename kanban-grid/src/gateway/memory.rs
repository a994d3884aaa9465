//! In-process gateway backed by a [`BoardModel`].
//!
//! Behaves like the REST service (dense positions, cascading deletes,
//! per-user WIP limits) and records every call it receives. A rejection can
//! be queued for the next call of a given method.

use super::PersistenceGateway;
use crate::error::{KanbanError, Result};
use crate::model::BoardModel;
use crate::types::{Cell, Column, ColumnId, Row, RowId, Task, TaskId, UserId, UserWipStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

const HTTP_BAD_REQUEST: u16 = 400;
const HTTP_CONFLICT: u16 = 409;

/// A call as the gateway received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    MoveTaskToColumn { task: TaskId, column: ColumnId },
    MoveTaskToRow { task: TaskId, row: Option<RowId> },
    ReorderTaskPosition { task: TaskId, position: u32 },
    ReorderColumnPosition { column: ColumnId, position: u32 },
    ReorderRowPosition { row: RowId, position: u32 },
    CheckUserWipStatus { user: UserId },
    AssignUserToTask { task: TaskId, user: UserId },
    DeleteRow { row: RowId, cascade: bool },
    DeleteColumn { column: ColumnId, reassign_to: ColumnId },
    FetchColumns,
    FetchRows,
    FetchTasks,
}

impl GatewayCall {
    /// Method name, as used by [`InMemoryGateway::fail_next`]
    pub fn method(&self) -> &'static str {
        match self {
            Self::MoveTaskToColumn { .. } => "move_task_to_column",
            Self::MoveTaskToRow { .. } => "move_task_to_row",
            Self::ReorderTaskPosition { .. } => "reorder_task_position",
            Self::ReorderColumnPosition { .. } => "reorder_column_position",
            Self::ReorderRowPosition { .. } => "reorder_row_position",
            Self::CheckUserWipStatus { .. } => "check_user_wip_status",
            Self::AssignUserToTask { .. } => "assign_user_to_task",
            Self::DeleteRow { .. } => "delete_row",
            Self::DeleteColumn { .. } => "delete_column",
            Self::FetchColumns => "fetch_columns",
            Self::FetchRows => "fetch_rows",
            Self::FetchTasks => "fetch_tasks",
        }
    }

    /// Reads that change nothing on the service
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::FetchColumns | Self::FetchRows | Self::FetchTasks | Self::CheckUserWipStatus { .. }
        )
    }
}

/// A user known to the gateway, with a personal WIP limit (`0` = unlimited)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayUser {
    pub id: UserId,
    pub name: String,
    pub wip_limit: u32,
}

#[derive(Debug, Default)]
struct MemoryState {
    board: BoardModel,
    users: HashMap<UserId, GatewayUser>,
    calls: Vec<GatewayCall>,
    failures: HashMap<&'static str, (u16, String)>,
}

impl MemoryState {
    /// Record the call and pop any queued failure for its method
    fn enter(&mut self, call: GatewayCall) -> Result<()> {
        let method = call.method();
        debug!(?call, "gateway call");
        self.calls.push(call);
        match self.failures.remove(method) {
            Some((status, message)) => Err(KanbanError::rejected(status, message)),
            None => Ok(()),
        }
    }

    fn user(&self, id: &UserId) -> Result<&GatewayUser> {
        self.users
            .get(id)
            .ok_or_else(|| KanbanError::UserNotFound { id: id.to_string() })
    }

    fn wip_status(&self, id: &UserId) -> Result<UserWipStatus> {
        let user = self.user(id)?;
        let assigned = self
            .board
            .tasks()
            .iter()
            .filter(|t| t.is_assigned(id))
            .count();
        Ok(UserWipStatus {
            will_exceed_limit: user.wip_limit > 0 && assigned + 1 > user.wip_limit as usize,
            user_name: user.name.clone(),
            wip_limit: user.wip_limit,
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

impl InMemoryGateway {
    pub fn new(board: BoardModel) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                board,
                ..MemoryState::default()
            }),
        }
    }

    /// Register a user with a personal WIP limit
    pub fn with_user(mut self, id: impl Into<UserId>, name: impl Into<String>, wip_limit: u32) -> Self {
        let user = GatewayUser {
            id: id.into(),
            name: name.into(),
            wip_limit,
        };
        self.state.get_mut().users.insert(user.id.clone(), user);
        self
    }

    /// Make the next call of `method` fail with the given status and message
    pub async fn fail_next(&self, method: &'static str, status: u16, message: impl Into<String>) {
        self.state
            .lock()
            .await
            .failures
            .insert(method, (status, message.into()));
    }

    /// Every call received so far, oldest first
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Calls that would change the service's state
    pub async fn mutations(&self) -> Vec<GatewayCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| !c.is_read())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Copy of the authoritative board
    pub async fn snapshot(&self) -> BoardModel {
        self.state.lock().await.board.clone()
    }

    /// Change the authoritative board behind the client's back
    pub async fn update_board(&self, update: impl FnOnce(&mut BoardModel)) {
        update(&mut self.state.lock().await.board);
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn move_task_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::MoveTaskToColumn {
            task: task_id.clone(),
            column: column_id.clone(),
        })?;
        state.board.require_column(column_id)?;
        let row = state.board.require_task(task_id)?.row_id.clone();
        let task = state.board.move_task(task_id, &Cell::new(column_id.clone(), row))?;
        Ok(task.clone())
    }

    async fn move_task_to_row(&self, task_id: &TaskId, row_id: Option<&RowId>) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::MoveTaskToRow {
            task: task_id.clone(),
            row: row_id.cloned(),
        })?;
        if let Some(row_id) = row_id {
            state.board.require_row(row_id)?;
        }
        let column = state.board.require_task(task_id)?.column_id.clone();
        let task = state
            .board
            .move_task(task_id, &Cell::new(column, row_id.cloned()))?;
        Ok(task.clone())
    }

    async fn reorder_task_position(&self, task_id: &TaskId, position: u32) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::ReorderTaskPosition {
            task: task_id.clone(),
            position,
        })?;
        state.board.set_task_position(task_id, position)?;
        Ok(state.board.require_task(task_id)?.clone())
    }

    async fn reorder_column_position(&self, column_id: &ColumnId, position: u32) -> Result<Column> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::ReorderColumnPosition {
            column: column_id.clone(),
            position,
        })?;
        state.board.set_column_position(column_id, position)?;
        Ok(state.board.require_column(column_id)?.clone())
    }

    async fn reorder_row_position(&self, row_id: &RowId, position: u32) -> Result<Row> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::ReorderRowPosition {
            row: row_id.clone(),
            position,
        })?;
        state.board.set_row_position(row_id, position)?;
        Ok(state.board.require_row(row_id)?.clone())
    }

    async fn check_user_wip_status(&self, user_id: &UserId) -> Result<UserWipStatus> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::CheckUserWipStatus {
            user: user_id.clone(),
        })?;
        state.wip_status(user_id)
    }

    async fn assign_user_to_task(&self, task_id: &TaskId, user_id: &UserId) -> Result<Task> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::AssignUserToTask {
            task: task_id.clone(),
            user: user_id.clone(),
        })?;
        let already = state.board.require_task(task_id)?.is_assigned(user_id);
        let status = state.wip_status(user_id)?;
        if !already && status.will_exceed_limit {
            return Err(KanbanError::rejected(
                HTTP_CONFLICT,
                format!(
                    "{} has reached their WIP limit of {}",
                    status.user_name, status.wip_limit
                ),
            ));
        }
        Ok(state.board.assign_user(task_id, user_id)?.clone())
    }

    async fn delete_row(&self, row_id: &RowId, cascade: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::DeleteRow {
            row: row_id.clone(),
            cascade,
        })?;
        let occupied = state
            .board
            .row_occupancy(row_id)
            .ok_or_else(|| KanbanError::RowNotFound { id: row_id.to_string() })?;
        if state.board.rows().len() <= 1 {
            return Err(KanbanError::rejected(HTTP_BAD_REQUEST, "cannot delete the last row"));
        }
        if occupied > 0 && !cascade {
            return Err(KanbanError::rejected(
                HTTP_CONFLICT,
                format!("row {row_id} still holds {occupied} tasks"),
            ));
        }
        state.board.remove_row(row_id)?;
        Ok(())
    }

    async fn delete_column(&self, column_id: &ColumnId, reassign_to: &ColumnId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::DeleteColumn {
            column: column_id.clone(),
            reassign_to: reassign_to.clone(),
        })?;
        if column_id == reassign_to {
            return Err(KanbanError::rejected(
                HTTP_BAD_REQUEST,
                "cannot reassign tasks to the deleted column",
            ));
        }
        state.board.remove_column(column_id, reassign_to)?;
        Ok(())
    }

    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::FetchColumns)?;
        Ok(state.board.columns().to_vec())
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::FetchRows)?;
        Ok(state.board.rows().to_vec())
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let mut state = self.state.lock().await;
        state.enter(GatewayCall::FetchTasks)?;
        Ok(state.board.tasks().to_vec())
    }
}
