//! Per-gesture drag state.
//!
//! `Idle -> Dragging -> Dropped -> Idle`, or `Idle -> Dragging -> Idle` when the
//! gesture is released outside any target. The session is owned by the board
//! context; [`DragSession::end`] always returns it to `Idle`.

use super::payload::{DragKind, DragPayload};
use super::transfer::{DataTransfer, DragEvent, DropEffect};
use crate::error::Result;
use serde::Serialize;
use tracing::{debug, warn};

/// What is currently in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraggedItem {
    pub id: String,
    pub kind: DragKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(DraggedItem),
    /// A drop handler ran; waiting for the closing dragend
    Dropped(DraggedItem),
}

/// How a gesture finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEnd {
    Dropped(DraggedItem),
    Cancelled(DraggedItem),
    /// dragend without a matching dragstart
    Idle,
}

#[derive(Debug, Default)]
pub struct DragSession {
    phase: DragPhase,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// The item being dragged, until the gesture ends
    pub fn current(&self) -> Option<&DraggedItem> {
        match &self.phase {
            DragPhase::Idle => None,
            DragPhase::Dragging(item) | DragPhase::Dropped(item) => Some(item),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Start a gesture: write the envelope and advertise a move
    pub fn begin<D: DataTransfer>(&mut self, event: &mut DragEvent<D>, payload: &DragPayload) -> Result<()> {
        payload.write_to(&mut event.data_transfer)?;
        event.data_transfer.set_effect_allowed(DropEffect::Move);

        if let Some(previous) = self.current() {
            warn!(id = %previous.id, kind = %previous.kind, "drag started before the previous one ended");
        }
        debug!(id = %payload.id, kind = %payload.kind, "drag started");
        self.phase = DragPhase::Dragging(DraggedItem {
            id: payload.id.clone(),
            kind: payload.kind,
        });
        Ok(())
    }

    /// Accept the pointer hovering over a target
    pub fn drag_over<D: DataTransfer>(event: &mut DragEvent<D>) {
        event.prevent_default();
        event.data_transfer.set_drop_effect(DropEffect::Move);
    }

    /// Record that a drop handler ran for the current gesture
    pub fn mark_dropped(&mut self) {
        if let DragPhase::Dragging(item) = std::mem::take(&mut self.phase) {
            self.phase = DragPhase::Dropped(item);
        }
    }

    /// Close the gesture unconditionally
    pub fn end(&mut self) -> GestureEnd {
        let ended = match std::mem::take(&mut self.phase) {
            DragPhase::Idle => GestureEnd::Idle,
            DragPhase::Dragging(item) => GestureEnd::Cancelled(item),
            DragPhase::Dropped(item) => GestureEnd::Dropped(item),
        };
        debug!(?ended, "drag ended");
        ended
    }
}
