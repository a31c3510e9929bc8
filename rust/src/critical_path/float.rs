//! Total and free float per task.

use crate::backward_pass::BackwardPassResult;
use crate::forward_pass::{EarlyDates, ForwardPassResult};
use crate::graph::{DependencyGraph, Edge};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskFloat {
    /// `LS - ES`. Negative when a deadline cannot be met.
    pub total_float: i64,
    /// Slack before the tightest outgoing link is violated.
    pub free_float: i64,
    pub is_critical: bool,
}

/// How far the predecessor can slip before this link binds its successor.
///
/// Zero exactly when the link is driving.
pub fn link_slack(edge: &Edge, pred: EarlyDates, succ: EarlyDates) -> i64 {
    let source = if edge.kind.from_start() {
        pred.earliest_start
    } else {
        pred.earliest_finish
    };
    let target = if edge.kind.to_finish() {
        succ.earliest_finish
    } else {
        succ.earliest_start
    };
    target - (source + edge.lag)
}

/// Float for every task, indexed by task.
///
/// Tasks without successors take their total float as free float.
pub fn compute_floats(
    graph: &DependencyGraph,
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
    epsilon: i64,
) -> Vec<TaskFloat> {
    (0..graph.len())
        .map(|idx| {
            let total_float = backward.dates[idx].latest_start - forward.dates[idx].earliest_start;
            let free_float = graph.successors[idx]
                .iter()
                .map(|&link| {
                    let edge = graph.edge(link);
                    link_slack(
                        edge,
                        forward.dates[idx],
                        forward.dates[edge.succ as usize],
                    )
                })
                .min()
                .unwrap_or(total_float);
            TaskFloat {
                total_float,
                free_float,
                is_critical: total_float <= epsilon,
            }
        })
        .collect()
}
