//! Core data types for the scheduling engine.
//!
//! All dates are integer offsets in working units from the project epoch (0).
//! Conversion to calendar dates happens only at the boundary, see
//! [`crate::calendar`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleWarning};

/// A task to be scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Working units; zero makes the task a milestone.
    pub duration: u32,
    /// Explicit start offset, honoured only on tasks without predecessors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_start: Option<i64>,
    /// Finish-no-later-than offset. Caps the latest finish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            anchor_start: None,
            deadline: None,
        }
    }

    /// Zero-duration task.
    pub fn milestone(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, 0)
    }

    pub fn with_anchor_start(mut self, offset: i64) -> Self {
        self.anchor_start = Some(offset);
        self
    }

    pub fn with_deadline(mut self, offset: i64) -> Self {
        self.deadline = Some(offset);
        self
    }

    pub fn is_milestone(&self) -> bool {
        self.duration == 0
    }
}

/// Precedence relation carried by a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS", alias = "finish_to_start")]
    FinishToStart,
    #[serde(rename = "SS", alias = "start_to_start")]
    StartToStart,
    #[serde(rename = "FF", alias = "finish_to_finish")]
    FinishToFinish,
    #[serde(rename = "SF", alias = "start_to_finish")]
    StartToFinish,
}

impl DependencyType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Whether the predecessor side of the relation is its start (SS, SF).
    pub fn from_start(&self) -> bool {
        matches!(self, Self::StartToStart | Self::StartToFinish)
    }

    /// Whether the successor side of the relation is its finish (FF, SF).
    pub fn to_finish(&self) -> bool {
        matches!(self, Self::FinishToFinish | Self::StartToFinish)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A typed precedence link between two tasks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub predecessor_id: String,
    pub successor_id: String,
    #[serde(default)]
    pub kind: DependencyType,
    /// Signed offset; negative values are leads.
    #[serde(default)]
    pub lag: i64,
}

impl Dependency {
    pub fn new(
        id: impl Into<String>,
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        kind: DependencyType,
        lag: i64,
    ) -> Self {
        Self {
            id: id.into(),
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            kind,
            lag,
        }
    }

    /// Finish-to-start link with no lag.
    pub fn finish_to_start(
        id: impl Into<String>,
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
    ) -> Self {
        Self::new(id, predecessor_id, successor_id, DependencyType::FinishToStart, 0)
    }
}

/// Computed dates and float for one task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    /// `latest_start - earliest_start`; negative means infeasible.
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
}

/// The full output of one computation. Never patched; recompute instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Per-task results keyed by task id.
    pub results: BTreeMap<String, ScheduleResult>,
    pub project_duration: i64,
    /// Every maximal critical chain, start to terminal.
    pub critical_paths: Vec<Vec<String>>,
    /// Task ids in the order the forward pass visited them.
    pub topological_order: Vec<String>,
    pub warnings: Vec<ScheduleWarning>,
}

impl Schedule {
    pub fn result(&self, task_id: &str) -> Option<&ScheduleResult> {
        self.results.get(task_id)
    }

    /// Ids of critical tasks in id order.
    pub fn critical_tasks(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_critical)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// False when any task carries negative total float.
    pub fn is_feasible(&self) -> bool {
        self.results.values().all(|r| r.total_float >= 0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Input snapshot as exchanged with the persistence layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub links: Vec<Dependency>,
    #[serde(default)]
    pub config: ScheduleConfig,
}

impl Project {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn compute(&self) -> Result<Schedule, ScheduleError> {
        crate::engine::compute(&self.tasks, &self.links, &self.config)
    }
}
