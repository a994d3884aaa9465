//! WIP limit evaluation.
//!
//! Pure functions over a container and the current task list. Column and row
//! limits are advisory: they drive the "exceeded" styling but never block a
//! move. The per-user limit is enforced by the persistence service and
//! checked before assignment (see [`crate::task::AssignUser`]).

use crate::types::{Task, WipContainer};
use serde::Serialize;
use std::fmt;

/// Shown instead of a ratio when a container has no limit
pub const UNLIMITED: &str = "∞";

/// Number of tasks held by the container
pub fn occupancy<C: WipContainer + ?Sized>(container: &C, tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| container.holds(t)).count()
}

/// True iff the container has a limit and strictly exceeds it.
///
/// Occupancy equal to the limit is still within the limit.
pub fn is_over_limit<C: WipContainer + ?Sized>(container: &C, tasks: &[Task]) -> bool {
    exceeds(container.wip_limit(), occupancy(container, tasks))
}

fn exceeds(wip_limit: u32, occupancy: usize) -> bool {
    wip_limit > 0 && occupancy > wip_limit as usize
}

/// Read-only view model for a column or row header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WipBadge {
    pub container_id: String,
    pub occupancy: usize,
    pub wip_limit: u32,
    pub exceeded: bool,
}

impl WipBadge {
    pub fn evaluate<C: WipContainer + ?Sized>(container: &C, tasks: &[Task]) -> Self {
        let occupancy = occupancy(container, tasks);
        Self {
            container_id: container.container_id().to_string(),
            occupancy,
            wip_limit: container.wip_limit(),
            exceeded: exceeds(container.wip_limit(), occupancy),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.wip_limit == 0
    }

    /// Label text: `∞` when unlimited, `occupancy/limit` otherwise
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WipBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            f.write_str(UNLIMITED)
        } else {
            write!(f, "{}/{}", self.occupancy, self.wip_limit)
        }
    }
}
