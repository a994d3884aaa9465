//! Board grid model: the in-memory columns, rows and tasks.
//!
//! The model only holds data and keeps the grid invariants (dense positions
//! per cell, dense column and row order). Deciding *whether* a change should
//! happen is up to the operations in [`crate::task`], [`crate::column`] and
//! [`crate::row`].

use crate::error::{KanbanError, Result};
use crate::reorder::plan_compaction;
use crate::types::{Cell, Column, ColumnId, Row, RowId, Task, TaskId, UserId};
use crate::wip::{self, WipBadge};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
    tasks: Vec<Task>,
}

impl BoardModel {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>, tasks: Vec<Task>) -> Self {
        let mut model = Self::default();
        model.replace_columns(columns);
        model.replace_rows(rows);
        model.replace_tasks(tasks);
        model
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Columns in left-to-right order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in top-to-bottom order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Look up a task or fail with `TaskNotFound`
    pub fn require_task(&self, id: &TaskId) -> Result<&Task> {
        self.task(id)
            .ok_or_else(|| KanbanError::TaskNotFound { id: id.to_string() })
    }

    pub fn require_column(&self, id: &ColumnId) -> Result<&Column> {
        self.column(id)
            .ok_or_else(|| KanbanError::ColumnNotFound { id: id.to_string() })
    }

    pub fn require_row(&self, id: &RowId) -> Result<&Row> {
        self.row(id)
            .ok_or_else(|| KanbanError::RowNotFound { id: id.to_string() })
    }

    /// Tasks of one cell, ordered by position
    pub fn cell_tasks(&self, cell: &Cell) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.is_in(cell)).collect();
        tasks.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    /// `(id, position)` pairs for one cell, ordered by position
    pub fn cell_order(&self, cell: &Cell) -> Vec<(TaskId, u32)> {
        self.cell_tasks(cell)
            .into_iter()
            .map(|t| (t.id.clone(), t.position))
            .collect()
    }

    pub fn column_order(&self) -> Vec<(ColumnId, u32)> {
        self.columns
            .iter()
            .map(|c| (c.id.clone(), c.position))
            .collect()
    }

    pub fn row_order(&self) -> Vec<(RowId, u32)> {
        self.rows.iter().map(|r| (r.id.clone(), r.position)).collect()
    }

    // =========================================================================
    // WIP view models
    // =========================================================================

    pub fn column_occupancy(&self, id: &ColumnId) -> Option<usize> {
        self.column(id).map(|c| wip::occupancy(c, &self.tasks))
    }

    pub fn row_occupancy(&self, id: &RowId) -> Option<usize> {
        self.row(id).map(|r| wip::occupancy(r, &self.tasks))
    }

    pub fn is_column_over_limit(&self, id: &ColumnId) -> bool {
        self.column(id)
            .is_some_and(|c| wip::is_over_limit(c, &self.tasks))
    }

    pub fn is_row_over_limit(&self, id: &RowId) -> bool {
        self.row(id).is_some_and(|r| wip::is_over_limit(r, &self.tasks))
    }

    pub fn column_badges(&self) -> Vec<WipBadge> {
        self.columns
            .iter()
            .map(|c| WipBadge::evaluate(c, &self.tasks))
            .collect()
    }

    pub fn row_badges(&self) -> Vec<WipBadge> {
        self.rows
            .iter()
            .map(|r| WipBadge::evaluate(r, &self.tasks))
            .collect()
    }

    // =========================================================================
    // Snapshot replacement
    // =========================================================================

    pub fn replace_columns(&mut self, mut columns: Vec<Column>) {
        columns.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        self.columns = columns;
    }

    pub fn replace_rows(&mut self, mut rows: Vec<Row>) {
        rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        self.rows = rows;
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    // =========================================================================
    // Local mutations
    // =========================================================================

    pub fn insert_column(&mut self, column: Column) {
        self.columns.retain(|c| c.id != column.id);
        self.columns.push(column);
        self.sort_columns();
    }

    pub fn insert_row(&mut self, row: Row) {
        self.rows.retain(|r| r.id != row.id);
        self.rows.push(row);
        self.sort_rows();
    }

    /// Insert or replace a task record by id
    pub fn upsert_task(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Move a task to the end of `target`, compacting the cell it left.
    pub fn move_task(&mut self, id: &TaskId, target: &Cell) -> Result<&Task> {
        let source = self.require_task(id)?.cell();
        if &source == target {
            return self.require_task(id);
        }
        let end = self.cell_tasks(target).len() as u32;
        if let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) {
            task.column_id = target.column_id.clone();
            task.row_id = target.row_id.clone();
            task.position = end;
        }
        self.compact_cell(&source);
        self.require_task(id)
    }

    pub fn set_task_position(&mut self, id: &TaskId, position: u32) -> Result<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| KanbanError::TaskNotFound { id: id.to_string() })?;
        task.position = position;
        Ok(())
    }

    pub fn set_column_position(&mut self, id: &ColumnId, position: u32) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| KanbanError::ColumnNotFound { id: id.to_string() })?;
        column.position = position;
        self.sort_columns();
        Ok(())
    }

    pub fn set_row_position(&mut self, id: &RowId, position: u32) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| KanbanError::RowNotFound { id: id.to_string() })?;
        row.position = position;
        self.sort_rows();
        Ok(())
    }

    pub fn assign_user(&mut self, task_id: &TaskId, user: &UserId) -> Result<&Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| KanbanError::TaskNotFound {
                id: task_id.to_string(),
            })?;
        if !task.is_assigned(user) {
            task.user_ids.push(user.clone());
        }
        Ok(&*task)
    }

    /// Detach every task of `id` from the row, then drop the row.
    ///
    /// Detached tasks are appended to the row-less cell of their column.
    /// Returns the ids of the detached tasks.
    pub fn remove_row(&mut self, id: &RowId) -> Result<Vec<TaskId>> {
        self.require_row(id)?;
        let mut detached = Vec::new();
        for cell in self.cells_holding(|t| t.row_id.as_ref() == Some(id)) {
            for (task_id, _) in self.cell_order(&cell) {
                self.move_task(&task_id, &Cell::new(cell.column_id.clone(), None))?;
                detached.push(task_id);
            }
        }
        self.rows.retain(|r| &r.id != id);
        self.compact_rows();
        Ok(detached)
    }

    /// Hand every task of column `id` over to `reassign_to`, keeping rows,
    /// then drop the column. Returns the ids of the reassigned tasks.
    pub fn remove_column(&mut self, id: &ColumnId, reassign_to: &ColumnId) -> Result<Vec<TaskId>> {
        self.require_column(id)?;
        self.require_column(reassign_to)?;
        let mut moved = Vec::new();
        for cell in self.cells_holding(|t| &t.column_id == id) {
            for (task_id, _) in self.cell_order(&cell) {
                self.move_task(&task_id, &Cell::new(reassign_to.clone(), cell.row_id.clone()))?;
                moved.push(task_id);
            }
        }
        self.columns.retain(|c| &c.id != id);
        self.compact_columns();
        Ok(moved)
    }

    /// Check referential integrity and dense positions
    pub fn validate(&self) -> Result<()> {
        for task in &self.tasks {
            if self.column(&task.column_id).is_none() {
                return Err(KanbanError::InvalidBoard {
                    message: format!("task {} references missing column {}", task.id, task.column_id),
                });
            }
            if let Some(row_id) = &task.row_id {
                if self.row(row_id).is_none() {
                    return Err(KanbanError::InvalidBoard {
                        message: format!("task {} references missing row {}", task.id, row_id),
                    });
                }
            }
        }

        for cell in self.cells_holding(|_| true) {
            let positions: Vec<u32> = self.cell_tasks(&cell).iter().map(|t| t.position).collect();
            let dense = positions.iter().enumerate().all(|(i, p)| *p == i as u32);
            if !dense {
                return Err(KanbanError::InvalidBoard {
                    message: format!("positions in cell {cell} are not dense: {positions:?}"),
                });
            }
        }
        Ok(())
    }

    fn cells_holding(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Cell> {
        let mut seen = HashSet::new();
        self.tasks
            .iter()
            .filter(|t| predicate(t))
            .map(Task::cell)
            .filter(|cell| seen.insert(cell.clone()))
            .collect()
    }

    fn compact_cell(&mut self, cell: &Cell) {
        for (id, position) in plan_compaction(&self.cell_order(cell)) {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                task.position = position;
            }
        }
    }

    fn compact_columns(&mut self) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.position = index as u32;
        }
    }

    fn compact_rows(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.position = index as u32;
        }
    }

    fn sort_columns(&mut self) {
        self.columns
            .sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    }

    fn sort_rows(&mut self) {
        self.rows
            .sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    }
}
