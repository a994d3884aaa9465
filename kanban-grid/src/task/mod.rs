//! Task commands

mod assign;
mod mv;
mod reorder;

pub use assign::AssignUser;
pub use mv::MoveTask;
pub use reorder::ReorderTask;
