//! Float computation and critical path classification.
//!
//! Consumes the forward and backward pass results without modifying them and
//! derives, per task, total and free float and criticality, plus the set of
//! maximal critical chains through the network.

mod float;
mod paths;

pub use float::{compute_floats, link_slack, TaskFloat};
pub use paths::{critical_paths, CriticalPaths};

use crate::backward_pass::BackwardPassResult;
use crate::config::ScheduleConfig;
use crate::forward_pass::ForwardPassResult;
use crate::graph::DependencyGraph;
use crate::interner::TaskIdx;
use crate::log_summary;

/// Output of the classifier, indexed like the graph.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    pub floats: Vec<TaskFloat>,
    pub critical_paths: CriticalPaths,
    /// Tasks with negative total float, in id order.
    pub infeasible: Vec<TaskIdx>,
}

pub fn classify(
    graph: &DependencyGraph,
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
    config: &ScheduleConfig,
) -> Classification {
    let floats = compute_floats(graph, forward, backward, config.float_epsilon);
    let critical_paths = critical_paths(
        graph,
        &forward.driving,
        &floats,
        config.max_critical_paths,
    );

    let infeasible: Vec<TaskIdx> = floats
        .iter()
        .enumerate()
        .filter(|(_, f)| f.total_float < 0)
        .map(|(i, _)| i as TaskIdx)
        .collect();

    log_summary!(
        config.verbosity,
        "Classified {} tasks: {} critical, {} critical paths, {} with negative float",
        floats.len(),
        floats.iter().filter(|f| f.is_critical).count(),
        critical_paths.paths.len(),
        infeasible.len()
    );

    Classification {
        floats,
        critical_paths,
        infeasible,
    }
}
