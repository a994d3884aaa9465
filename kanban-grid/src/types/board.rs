//! Board-level types: Column and Row

use super::ids::{ColumnId, RowId};
use super::task::Task;
use serde::{Deserialize, Serialize};

/// Anything that carries a WIP limit and holds a subset of the board's tasks.
///
/// A limit of `0` means unlimited.
pub trait WipContainer {
    fn container_id(&self) -> &str;
    fn wip_limit(&self) -> u32;
    fn holds(&self, task: &Task) -> bool;
}

/// A column defines a workflow stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub position: u32,
    #[serde(default)]
    pub wip_limit: u32,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            wip_limit: 0,
        }
    }

    pub fn with_wip_limit(mut self, wip_limit: u32) -> Self {
        self.wip_limit = wip_limit;
        self
    }
}

impl WipContainer for Column {
    fn container_id(&self) -> &str {
        self.id.as_str()
    }

    fn wip_limit(&self) -> u32 {
        self.wip_limit
    }

    fn holds(&self, task: &Task) -> bool {
        task.column_id == self.id
    }
}

/// A row (swimlane) provides horizontal grouping orthogonal to columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    pub name: String,
    pub position: u32,
    #[serde(default)]
    pub wip_limit: u32,
}

impl Row {
    pub fn new(id: impl Into<RowId>, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            wip_limit: 0,
        }
    }

    pub fn with_wip_limit(mut self, wip_limit: u32) -> Self {
        self.wip_limit = wip_limit;
        self
    }
}

impl WipContainer for Row {
    fn container_id(&self) -> &str {
        self.id.as_str()
    }

    fn wip_limit(&self) -> u32 {
        self.wip_limit
    }

    fn holds(&self, task: &Task) -> bool {
        task.row_id.as_ref() == Some(&self.id)
    }
}
