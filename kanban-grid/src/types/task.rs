//! Task types: Task and the per-user WIP status

use super::cell::Cell;
use super::ids::{ColumnId, RowId, TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A task/card on the kanban board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub column_id: ColumnId,
    #[serde(default)]
    pub row_id: Option<RowId>,
    /// Order within the task's cell, dense and 0-based
    pub position: u32,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Assigned users, in assignment order
    #[serde(default)]
    pub user_ids: Vec<UserId>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        column_id: impl Into<ColumnId>,
        row_id: Option<RowId>,
        position: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_id: column_id.into(),
            row_id,
            position,
            labels: BTreeSet::new(),
            user_ids: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<UserId>) -> Self {
        self.user_ids.push(user.into());
        self
    }

    /// The grid cell this task currently occupies
    pub fn cell(&self) -> Cell {
        Cell::new(self.column_id.clone(), self.row_id.clone())
    }

    pub fn is_in(&self, cell: &Cell) -> bool {
        self.column_id == cell.column_id && self.row_id == cell.row_id
    }

    pub fn is_assigned(&self, user: &UserId) -> bool {
        self.user_ids.contains(user)
    }
}

/// Answer of the pre-flight user WIP check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserWipStatus {
    pub will_exceed_limit: bool,
    pub user_name: String,
    pub wip_limit: u32,
}
