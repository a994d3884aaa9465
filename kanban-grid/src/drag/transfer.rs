//! The drag event data channel.
//!
//! Drop targets only ever see the event, never the dragged object, so
//! everything the drop side needs travels as strings keyed by a format name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Affordance advertised to the user while dragging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropEffect {
    #[default]
    None,
    Copy,
    Move,
    Link,
}

/// String-keyed data carried by a drag gesture
pub trait DataTransfer {
    fn set_data(&mut self, format: &str, data: &str);
    fn get_data(&self, format: &str) -> Option<String>;
    /// Formats present, in the order they were set
    fn types(&self) -> Vec<String>;
    fn set_effect_allowed(&mut self, effect: DropEffect);
    fn set_drop_effect(&mut self, effect: DropEffect);
}

/// In-memory data channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferData {
    items: IndexMap<String, String>,
    effect_allowed: DropEffect,
    drop_effect: DropEffect,
}

impl TransferData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel pre-filled with one entry
    pub fn with(mut self, format: &str, data: &str) -> Self {
        self.set_data(format, data);
        self
    }

    pub fn effect_allowed(&self) -> DropEffect {
        self.effect_allowed
    }

    pub fn drop_effect(&self) -> DropEffect {
        self.drop_effect
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DataTransfer for TransferData {
    fn set_data(&mut self, format: &str, data: &str) {
        self.items.insert(format.to_string(), data.to_string());
    }

    fn get_data(&self, format: &str) -> Option<String> {
        self.items.get(format).cloned()
    }

    fn types(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn set_effect_allowed(&mut self, effect: DropEffect) {
        self.effect_allowed = effect;
    }

    fn set_drop_effect(&mut self, effect: DropEffect) {
        self.drop_effect = effect;
    }
}

/// A drag event as delivered to a handler
#[derive(Debug, Clone, Default)]
pub struct DragEvent<D: DataTransfer = TransferData> {
    pub data_transfer: D,
    default_prevented: bool,
}

impl<D: DataTransfer> DragEvent<D> {
    pub fn new(data_transfer: D) -> Self {
        Self {
            data_transfer,
            default_prevented: false,
        }
    }

    /// Without this on dragover the platform refuses the drop
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
