//! Core types for the board grid

mod board;
mod cell;
mod ids;
mod task;

// Re-export all types
pub use board::{Column, Row, WipContainer};
pub use cell::Cell;
pub use ids::{ColumnId, RowId, TaskId, UserId};
pub use task::{Task, UserWipStatus};
