//! The scheduling pipeline: build, forward pass, backward pass, classify.
//!
//! Each computation is a pure function of its inputs. Nothing is retained
//! between calls and a failed or cancelled run produces no partial output.

use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;

use crate::backward_pass::backward_pass;
use crate::config::ScheduleConfig;
use crate::critical_path::classify;
use crate::error::{Phase, ScheduleError, ScheduleWarning};
use crate::forward_pass::forward_pass;
use crate::graph::build;
use crate::log_summary;
use crate::models::{Dependency, Schedule, ScheduleResult, Task};

/// Compute the schedule for `tasks` and `links`.
///
/// # Returns
/// * `Ok(Schedule)` with per-task dates and float, the project duration,
///   every critical path and any warnings (negative float included)
/// * `Err(ScheduleError)` when the network is cyclic or, in strict mode,
///   malformed
pub fn compute(
    tasks: &[Task],
    links: &[Dependency],
    config: &ScheduleConfig,
) -> Result<Schedule, ScheduleError> {
    run(tasks, links, config, None, |_| {})
}

/// Like [`compute`], checking `cancel` after the graph build, the forward
/// pass and the backward pass.
///
/// A cancelled run returns `ScheduleError::Cancelled` naming the last phase
/// that completed.
pub fn compute_cancellable(
    tasks: &[Task],
    links: &[Dependency],
    config: &ScheduleConfig,
    cancel: &CancellationToken,
) -> Result<Schedule, ScheduleError> {
    run(tasks, links, config, Some(cancel), |_| {})
}

/// Report `after` as complete, then stop if the token has been cancelled.
fn checkpoint(
    cancel: Option<&CancellationToken>,
    after: Phase,
    on_phase: &mut impl FnMut(Phase),
) -> Result<(), ScheduleError> {
    on_phase(after);
    match cancel {
        Some(token) if token.is_cancelled() => Err(ScheduleError::Cancelled { after }),
        _ => Ok(()),
    }
}

fn run(
    tasks: &[Task],
    links: &[Dependency],
    config: &ScheduleConfig,
    cancel: Option<&CancellationToken>,
    mut on_phase: impl FnMut(Phase),
) -> Result<Schedule, ScheduleError> {
    let verbosity = config.verbosity;

    let graph = build(tasks, links, config)?;
    checkpoint(cancel, Phase::Build, &mut on_phase)?;

    let forward = forward_pass(&graph, verbosity);
    checkpoint(cancel, Phase::ForwardPass, &mut on_phase)?;

    let backward = backward_pass(&graph, &forward, verbosity);
    checkpoint(cancel, Phase::BackwardPass, &mut on_phase)?;

    let classification = classify(&graph, &forward, &backward, config);

    let mut results = BTreeMap::new();
    for idx in 0..graph.len() {
        let early = forward.dates[idx];
        let late = backward.dates[idx];
        let float = classification.floats[idx];
        results.insert(
            graph.task_id(idx as u32).to_string(),
            ScheduleResult {
                earliest_start: early.earliest_start,
                earliest_finish: early.earliest_finish,
                latest_start: late.latest_start,
                latest_finish: late.latest_finish,
                total_float: float.total_float,
                free_float: float.free_float,
                is_critical: float.is_critical,
            },
        );
    }

    let critical_paths: Vec<Vec<String>> = classification
        .critical_paths
        .paths
        .iter()
        .map(|path| path.iter().map(|&t| graph.task_id(t).to_string()).collect())
        .collect();

    let mut warnings = graph.warnings.clone();
    if !classification.infeasible.is_empty() {
        let task_ids: Vec<String> = classification
            .infeasible
            .iter()
            .map(|&t| graph.task_id(t).to_string())
            .collect();
        log_summary!(verbosity, "Negative float on: {}", task_ids.join(", "));
        warnings.push(ScheduleWarning::InfeasibleSchedule { task_ids });
    }
    if classification.critical_paths.truncated {
        warnings.push(ScheduleWarning::CriticalPathsTruncated {
            limit: config.max_critical_paths,
        });
    }

    Ok(Schedule {
        results,
        project_duration: backward.project_finish,
        critical_paths,
        topological_order: graph
            .topo_order
            .iter()
            .map(|&t| graph.task_id(t).to_string())
            .collect(),
        warnings,
    })
}
