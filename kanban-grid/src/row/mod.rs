//! Row (swimlane) commands

mod delete;
mod reorder;

pub use delete::DeleteRow;
pub use reorder::ReorderRow;
