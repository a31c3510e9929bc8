//! Critical-path scheduling engine.
//!
//! Converts a set of tasks and typed precedence links (finish-to-start,
//! start-to-start, finish-to-finish, start-to-finish, each with a signed lag)
//! into a schedule: earliest and latest dates, total and free float, and every
//! critical path through the network.
//!
//! The computation is a one-way pipeline over an immutable snapshot:
//! 1. [`graph::build`] validates the input, indexes it and orders it
//!    topologically, rejecting cycles
//! 2. [`forward_pass::forward_pass`] computes earliest dates
//! 3. [`backward_pass::backward_pass`] computes latest dates
//! 4. [`critical_path::classify`] derives float and critical paths
//!
//! [`compute`] runs all four. Dates are integer working-unit offsets; the
//! [`calendar`] module maps them to and from calendar dates.

pub mod backward_pass;
pub mod calendar;
mod config;
pub mod critical_path;
mod engine;
mod error;
pub mod forward_pass;
pub mod graph;
mod interner;
pub mod logging;
mod models;
#[cfg(feature = "python")]
mod python;

pub use calendar::{
    anchor_offset, dated_results, deadline_offset, CalendarError, CalendarMapper, DatedResult,
    WorkingCalendar,
};
pub use config::{LinkValidation, ScheduleConfig};
pub use engine::{compute, compute_cancellable};
pub use error::{Phase, ScheduleError, ScheduleWarning};
pub use interner::{TaskIdx, TaskIndex};
pub use models::{Dependency, DependencyType, Project, Schedule, ScheduleResult, Task};
pub use tokio_util::sync::CancellationToken;
