//! Error types for the kanban grid core

use thiserror::Error;

/// Result type for kanban grid operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// Severity levels for error classification
///
/// Nothing in the board core is fatal: every failure degrades to a
/// dismissable notice, so there is no critical level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// The action was refused but nothing went wrong
    Warning,
    /// The action failed and the model stayed at its last known good state
    Error,
}

/// Classify an error by its impact on the user
pub trait Severity {
    fn severity(&self) -> ErrorSeverity;
}

/// Errors that can occur in kanban grid operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Column not found
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Row not found
    #[error("row not found: {id}")]
    RowNotFound { id: String },

    /// User not found
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// The board must keep at least one row
    #[error("cannot delete row '{id}': a board needs at least one row")]
    LastRow { id: String },

    /// The board must keep at least one column to reassign tasks to
    #[error("cannot delete column '{id}': a board needs at least one column")]
    LastColumn { id: String },

    /// A column cannot hand its tasks over to itself
    #[error("column '{id}' cannot reassign its tasks to itself")]
    SelfReassign { id: String },

    /// Assigning the user would push them over their personal WIP limit
    #[error("{user_name} has reached their WIP limit of {wip_limit}")]
    UserWipLimit { user_name: String, wip_limit: u32 },

    /// Drag payload could not be decoded
    #[error("malformed {format} drag payload: {message}")]
    MalformedPayload { format: String, message: String },

    /// The persistence service refused the request
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The persistence service could not be reached
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The service answered with success but the body could not be read
    #[error("unreadable {status} response from {url}: {message}")]
    UnreadableResponse {
        status: u16,
        url: String,
        message: String,
    },

    /// A model invariant does not hold
    #[error("invalid board: {message}")]
    InvalidBoard { message: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error, as returned by the persistence service
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// True when the service reported success, whatever its body said
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::UnreadableResponse { .. })
    }

    /// True for refusals decided by the core before any network call
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::LastRow { .. }
                | Self::LastColumn { .. }
                | Self::SelfReassign { .. }
                | Self::UserWipLimit { .. }
        )
    }
}

impl From<figment::Error> for KanbanError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}

impl Severity for KanbanError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::LastRow { .. }
            | Self::LastColumn { .. }
            | Self::SelfReassign { .. }
            | Self::UserWipLimit { .. }
            | Self::MalformedPayload { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}
