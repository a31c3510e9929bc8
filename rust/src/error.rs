//! Fatal errors and non-fatal warnings produced by a computation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline phase boundaries at which a computation can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Build,
    ForwardPass,
    BackwardPass,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Build => write!(f, "graph build"),
            Phase::ForwardPass => write!(f, "forward pass"),
            Phase::BackwardPass => write!(f, "backward pass"),
        }
    }
}

/// Errors that abort a computation. No schedule is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Tasks on or between cycles, sorted by id. Tasks that only hang
    /// downstream of a cycle are left out of the report.
    #[error("Circular dependency detected among tasks: {}", .task_ids.join(", "))]
    CyclicDependency { task_ids: Vec<String> },
    #[error("Link {link_id} references unknown task {task_id}")]
    UnknownTaskReference { link_id: String, task_id: String },
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("Duplicate link id: {0}")]
    DuplicateLinkId(String),
    #[error("Task {0} has predecessors and cannot carry an anchored start")]
    AnchorOnDependentTask(String),
    /// Durations, lags, anchors and deadlines together exceed
    /// [`crate::graph::MAX_SPAN`]; `id` names the task or link that crossed it.
    #[error("Offsets exceed the schedulable range at {id}")]
    OffsetOutOfRange { id: String },
    #[error("Computation cancelled after {after}")]
    Cancelled { after: Phase },
}

/// Conditions reported alongside a schedule that was still produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    /// Lenient mode dropped a link naming a task that does not exist.
    UnknownTaskReference { link_id: String, task_id: String },
    /// Lenient mode dropped a link whose id was already used.
    DuplicateLinkId(String),
    /// Lenient mode ignored an anchor on a task that has predecessors.
    AnchorIgnored(String),
    /// Tasks with negative total float. The dates are left as computed.
    InfeasibleSchedule { task_ids: Vec<String> },
    /// Critical path enumeration stopped at the configured limit.
    CriticalPathsTruncated { limit: usize },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTaskReference { link_id, task_id } => {
                write!(f, "Dropped link {} referencing unknown task {}", link_id, task_id)
            }
            Self::DuplicateLinkId(id) => write!(f, "Dropped duplicate link {}", id),
            Self::AnchorIgnored(id) => {
                write!(f, "Ignored anchored start on task {} with predecessors", id)
            }
            Self::InfeasibleSchedule { task_ids } => write!(
                f,
                "Schedule is infeasible, negative float on: {}",
                task_ids.join(", ")
            ),
            Self::CriticalPathsTruncated { limit } => {
                write!(f, "Critical path enumeration truncated at {} paths", limit)
            }
        }
    }
}
