//! Operations: structs whose fields are the parameters of one board action.
//!
//! Every routed action is an operation implementing [`Execute`]. The
//! [`crate::BoardOperationProcessor`] runs them and records the activity log.

use async_trait::async_trait;
use serde_json::Value;

/// Identity of an operation, used for the activity log
pub trait Operation {
    fn verb(&self) -> &'static str;

    fn noun(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Canonical "verb noun" string, e.g. "move task"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run an operation against a context
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> Result<Value, E>;
}

/// Implement [`Operation`] for a struct from its verb, noun and description
macro_rules! operation {
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $description:literal) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }

            fn noun(&self) -> &'static str {
                $noun
            }

            fn description(&self) -> &'static str {
                $description
            }
        }
    };
}

pub(crate) use operation;
