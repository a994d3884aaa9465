//! Drag-and-drop plumbing: the payload envelope, the event data channel and
//! the per-gesture session state machine.

mod payload;
mod session;
mod transfer;

pub use payload::{DragKind, DragPayload};
pub use session::{DragPhase, DragSession, DraggedItem, GestureEnd};
pub use transfer::{DataTransfer, DragEvent, DropEffect, TransferData};
