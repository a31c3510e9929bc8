//! Backward pass: latest start and finish per task.

use crate::forward_pass::ForwardPassResult;
use crate::graph::{DependencyGraph, Edge};
use crate::{log_constraints, log_debug, log_summary};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LateDates {
    pub latest_start: i64,
    pub latest_finish: i64,
}

#[derive(Clone, Debug, Default)]
pub struct BackwardPassResult {
    /// Indexed by task.
    pub dates: Vec<LateDates>,
    /// Latest earliest finish over terminal tasks; they all finish here.
    pub project_finish: i64,
}

/// Upper bound a link places on its predecessor's latest finish.
///
/// Mirrors [`crate::forward_pass::start_bound`]:
/// FS: `succ.LS - lag`, SS: `succ.LS - lag + duration`,
/// FF: `succ.LF - lag`, SF: `succ.LF - lag + duration`.
pub fn finish_bound(edge: &Edge, succ: LateDates, pred_duration: i64) -> i64 {
    let anchor = if edge.kind.to_finish() {
        succ.latest_finish
    } else {
        succ.latest_start
    };
    let bound = anchor - edge.lag;
    if edge.kind.from_start() {
        bound + pred_duration
    } else {
        bound
    }
}

/// Compute latest dates in reverse topological order.
///
/// Terminal tasks finish at the project finish, every other task at the
/// tightest bound from its outgoing links. A task's own deadline caps either
/// one. Deadlines can push a
/// latest date before the earliest one; that is reported later as negative
/// float rather than corrected here.
pub fn backward_pass(
    graph: &DependencyGraph,
    forward: &ForwardPassResult,
    verbosity: u8,
) -> BackwardPassResult {
    let project_finish = forward.terminal_finish(graph);
    log_summary!(verbosity, "Project finish at offset {}", project_finish);

    let mut dates = vec![LateDates::default(); graph.len()];

    for &task in graph.topo_order.iter().rev() {
        let idx = task as usize;
        let node = graph.nodes[idx];

        let mut tightest: Option<i64> = None;
        for &link in &graph.successors[idx] {
            let edge = graph.edge(link);
            let bound = finish_bound(edge, dates[edge.succ as usize], node.duration);
            log_debug!(
                verbosity,
                "  {} -{}({:+})-> {}: LF <= {}",
                graph.task_id(task),
                edge.kind,
                edge.lag,
                graph.task_id(edge.succ),
                bound
            );
            tightest = Some(tightest.map_or(bound, |lf| lf.min(bound)));
        }
        let mut latest_finish = tightest.unwrap_or(project_finish);
        if let Some(deadline) = node.deadline {
            latest_finish = latest_finish.min(deadline);
        }

        dates[idx] = LateDates {
            latest_start: latest_finish - node.duration,
            latest_finish,
        };
        log_constraints!(
            verbosity,
            "Backward {}: LS={} LF={}",
            graph.task_id(task),
            dates[idx].latest_start,
            latest_finish
        );
    }

    BackwardPassResult {
        dates,
        project_finish,
    }
}
