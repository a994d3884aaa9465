//! The drag payload envelope.
//!
//! A payload is written as JSON under `application/<kind>` so drop targets
//! can tell what is being dragged from the format names alone. Older clients
//! wrote bare ids under plain keys (`taskId`, `columnId`, ...); those are still
//! accepted on the reading side.

use super::transfer::DataTransfer;
use crate::error::{KanbanError, Result};
use crate::types::{Cell, ColumnId, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Task,
    Column,
    Row,
    User,
}

impl DragKind {
    /// Every kind, in the order a drop target looks for them
    pub const ALL: [DragKind; 4] = [DragKind::Task, DragKind::Column, DragKind::Row, DragKind::User];

    /// Data channel format for the structured envelope
    pub fn format(self) -> &'static str {
        match self {
            Self::Task => "application/task",
            Self::Column => "application/column",
            Self::Row => "application/row",
            Self::User => "application/user",
        }
    }

    /// Plain-string key used before the envelope existed
    pub fn legacy_key(self) -> &'static str {
        match self {
            Self::Task => "taskId",
            Self::Column => "columnId",
            Self::Row => "rowId",
            Self::User => "userId",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Column => "column",
            Self::Row => "row",
            Self::User => "user",
        }
    }
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope describing the dragged item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub id: String,
    pub kind: DragKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row_id: Option<RowId>,
}

impl DragPayload {
    pub fn new(id: impl Into<String>, kind: DragKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source_column_id: None,
            source_row_id: None,
        }
    }

    /// A task dragged out of `source`
    pub fn task(id: impl Into<String>, source: &Cell) -> Self {
        Self::new(id, DragKind::Task).with_source(Some(source.column_id.clone()), source.row_id.clone())
    }

    pub fn column(id: impl Into<String>) -> Self {
        Self::new(id, DragKind::Column)
    }

    pub fn row(id: impl Into<String>) -> Self {
        Self::new(id, DragKind::Row)
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(id, DragKind::User)
    }

    pub fn with_source(mut self, column: Option<ColumnId>, row: Option<RowId>) -> Self {
        self.source_column_id = column;
        self.source_row_id = row;
        self
    }

    /// The cell a task was dragged from, if the envelope recorded it
    pub fn source_cell(&self) -> Option<Cell> {
        self.source_column_id
            .as_ref()
            .map(|column| Cell::new(column.clone(), self.source_row_id.clone()))
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an envelope read from `format`, checking it matches that format
    pub fn decode(format: &str, raw: &str) -> Result<Self> {
        let payload: DragPayload =
            serde_json::from_str(raw).map_err(|e| KanbanError::malformed(format, e.to_string()))?;
        if payload.kind.format() != format {
            return Err(KanbanError::malformed(
                format,
                format!("envelope declares kind '{}'", payload.kind),
            ));
        }
        if payload.id.trim().is_empty() {
            return Err(KanbanError::malformed(format, "empty id"));
        }
        Ok(payload)
    }

    /// Write the envelope under its typed format
    pub fn write_to<D: DataTransfer + ?Sized>(&self, data: &mut D) -> Result<()> {
        data.set_data(self.kind.format(), &self.encode()?);
        Ok(())
    }

    /// Read whatever payload the channel carries.
    ///
    /// Structured envelopes win; a malformed envelope is logged and skipped so
    /// the legacy keys still get a chance. Returns `None` when nothing usable
    /// is present.
    pub fn read_from<D: DataTransfer + ?Sized>(data: &D) -> Option<Self> {
        for kind in DragKind::ALL {
            let Some(raw) = data.get_data(kind.format()) else {
                continue;
            };
            match Self::decode(kind.format(), &raw) {
                Ok(payload) => return Some(payload),
                Err(error) => warn!(%error, "ignoring malformed drag payload"),
            }
        }

        for kind in DragKind::ALL {
            if let Some(id) = data.get_data(kind.legacy_key()) {
                let id = id.trim();
                if !id.is_empty() {
                    debug!(key = kind.legacy_key(), id, "using legacy drag key");
                    return Some(Self::new(id, kind));
                }
            }
        }

        debug!(types = ?data.types(), "drop carried no usable payload");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::TransferData;

    #[test]
    fn test_task_payload_round_trips_through_channel() {
        let payload = DragPayload::task("t1", &Cell::at("c1", "r1"));
        let mut data = TransferData::new();
        payload.write_to(&mut data).unwrap();

        assert_eq!(data.types(), vec!["application/task"]);
        let read = DragPayload::read_from(&data).unwrap();
        assert_eq!(read, payload);
        assert_eq!(read.source_cell(), Some(Cell::at("c1", "r1")));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let payload = DragPayload::task("t1", &Cell::new("c1", None));
        let json: serde_json::Value = serde_json::from_str(&payload.encode().unwrap()).unwrap();
        assert_eq!(json["kind"], "task");
        assert_eq!(json["sourceColumnId"], "c1");
        assert!(json.get("sourceRowId").is_none());
    }

    #[test]
    fn test_malformed_envelope_falls_back_to_legacy_key() {
        let data = TransferData::new()
            .with("application/task", "{not json")
            .with("taskId", "t9");
        let read = DragPayload::read_from(&data).unwrap();
        assert_eq!(read.id, "t9");
        assert_eq!(read.kind, DragKind::Task);
        assert!(read.source_cell().is_none());
    }

    #[test]
    fn test_legacy_column_key() {
        let data = TransferData::new().with("columnId", "c2");
        let read = DragPayload::read_from(&data).unwrap();
        assert_eq!(read.kind, DragKind::Column);
        assert_eq!(read.id, "c2");
    }

    #[test]
    fn test_kind_must_match_format() {
        let raw = DragPayload::column("c1").encode().unwrap();
        let err = DragPayload::decode("application/task", &raw).unwrap_err();
        assert!(matches!(err, KanbanError::MalformedPayload { .. }));
    }

    #[test]
    fn test_empty_channel_yields_nothing() {
        assert!(DragPayload::read_from(&TransferData::new()).is_none());
        let blank = TransferData::new().with("taskId", "  ");
        assert!(DragPayload::read_from(&blank).is_none());
    }
}
