//! Grid addressing: a cell is one column crossed with an optional row.

use super::ids::{ColumnId, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of the board grid.
///
/// Tasks without a row (their row was deleted) live in the column's
/// row-less cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub column_id: ColumnId,
    #[serde(default)]
    pub row_id: Option<RowId>,
}

impl Cell {
    pub fn new(column_id: impl Into<ColumnId>, row_id: Option<RowId>) -> Self {
        Self {
            column_id: column_id.into(),
            row_id,
        }
    }

    /// Cell in the given column and row
    pub fn at(column_id: impl Into<ColumnId>, row_id: impl Into<RowId>) -> Self {
        Self::new(column_id, Some(row_id.into()))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.row_id {
            Some(row) => write!(f, "{}/{}", self.column_id, row),
            None => write!(f, "{}/-", self.column_id),
        }
    }
}
