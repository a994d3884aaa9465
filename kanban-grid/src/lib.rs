//! Kanban grid core: drag-and-drop routing and WIP limits
//!
//! A board is a grid of columns × rows (swimlanes) holding tasks. This crate
//! holds the in-memory grid model and decides what a drag-and-drop gesture
//! means for it: moving a task between cells, reordering tasks, columns and
//! rows, and assigning users under their personal WIP limits. Every change
//! is persisted through a [`PersistenceGateway`] before the model is touched,
//! then reconciled by refetching the affected collections.
//!
//! ## Overview
//!
//! - **Model** - [`BoardModel`] keeps dense 0-based positions per cell
//! - **WIP limits** - [`wip`] computes occupancy and badges; `0` means unlimited
//! - **Drag session** - [`drag`] carries the payload envelope and gesture state
//! - **Routing** - [`DropRouter`] turns drops into operations and notices
//! - **Operations** - one struct per action, run through [`BoardOperationProcessor`]
//!   which records the activity log
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_grid::{BoardConfig, Cell, DragEvent, DragKind, DropRouter, DropTarget, TransferData};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoardConfig::load(None)?;
//! let router = DropRouter::connect(&config)?;
//! router.load().await?;
//!
//! let mut event = DragEvent::new(TransferData::new());
//! router
//!     .handle_drag_start(&mut event, "t1", DragKind::Task, Some("todo".into()), None)
//!     .await?;
//! let outcome = router
//!     .handle_drop(&mut event, DropTarget::Cell(Cell::new("doing", None)))
//!     .await;
//! router.handle_drag_end().await;
//!
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod activity;
mod config;
mod context;
pub mod drag;
mod error;
pub mod gateway;
pub mod logging;
mod model;
mod notice;
mod operation;
mod processor;
pub mod reorder;
mod router;
pub mod types;
pub mod wip;

// Command modules
pub mod column;
pub mod row;
pub mod task;

#[cfg(test)]
mod fixture;

pub use activity::LogEntry;
pub use config::BoardConfig;
pub use context::{BoardContext, Collection};
pub use drag::{DataTransfer, DragEvent, DragKind, DragPayload, DragSession, GestureEnd, TransferData};
pub use error::{ErrorSeverity, KanbanError, Result, Severity};
pub use gateway::{HttpGateway, InMemoryGateway, PersistenceGateway};
pub use model::BoardModel;
pub use notice::{Notice, NoticeQueue};
pub use operation::{Execute, Operation};
pub use processor::BoardOperationProcessor;
pub use router::{dispatch, Action, ActionOutcome, Dispatch, DropRouter, DropTarget};
pub use wip::WipBadge;

// Re-export commonly used types
pub use types::{Cell, Column, ColumnId, Row, RowId, Task, TaskId, UserId, UserWipStatus};
