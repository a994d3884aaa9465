//! Column commands

mod delete;
mod reorder;

pub use delete::DeleteColumn;
pub use reorder::ReorderColumn;
