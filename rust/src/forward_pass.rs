//! Forward pass: earliest start and finish per task.

use crate::graph::{DependencyGraph, Edge};
use crate::interner::TaskIdx;
use crate::{log_constraints, log_debug};

/// Offset every unanchored root task starts at. Dependent tasks never start
/// before it either.
pub const PROJECT_EPOCH: i64 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EarlyDates {
    pub earliest_start: i64,
    pub earliest_finish: i64,
}

#[derive(Clone, Debug, Default)]
pub struct ForwardPassResult {
    /// Indexed by task.
    pub dates: Vec<EarlyDates>,
    /// Indexed by link: true when the link's bound equals the successor's ES.
    pub driving: Vec<bool>,
}

impl ForwardPassResult {
    /// Latest earliest finish over the terminal tasks (those without
    /// successors), or the epoch for an empty graph.
    pub fn terminal_finish(&self, graph: &DependencyGraph) -> i64 {
        self.dates
            .iter()
            .enumerate()
            .filter(|&(idx, _)| graph.is_terminal(idx as TaskIdx))
            .map(|(_, d)| d.earliest_finish)
            .max()
            .unwrap_or(PROJECT_EPOCH)
    }
}

/// Lower bound a link places on its successor's earliest start.
///
/// FS: `pred.EF + lag`, SS: `pred.ES + lag`,
/// FF: `pred.EF + lag - duration`, SF: `pred.ES + lag - duration`.
pub fn start_bound(edge: &Edge, pred: EarlyDates, succ_duration: i64) -> i64 {
    let anchor = if edge.kind.from_start() {
        pred.earliest_start
    } else {
        pred.earliest_finish
    };
    let bound = anchor + edge.lag;
    if edge.kind.to_finish() {
        bound - succ_duration
    } else {
        bound
    }
}

/// Compute earliest dates in topological order.
///
/// Root tasks start at their anchor (or the epoch). Every other task starts at
/// the largest bound over its incoming links, never before the epoch.
pub fn forward_pass(graph: &DependencyGraph, verbosity: u8) -> ForwardPassResult {
    let mut dates = vec![EarlyDates::default(); graph.len()];
    let mut driving = vec![false; graph.edges.len()];

    for &task in &graph.topo_order {
        let idx = task as usize;
        let node = graph.nodes[idx];
        let preds = &graph.predecessors[idx];

        let earliest_start = if preds.is_empty() {
            node.anchor_start.unwrap_or(PROJECT_EPOCH)
        } else {
            let mut es = PROJECT_EPOCH;
            for &link in preds {
                let edge = graph.edge(link);
                let bound = start_bound(edge, dates[edge.pred as usize], node.duration);
                log_debug!(
                    verbosity,
                    "  {} -{}({:+})-> {}: ES >= {}",
                    graph.task_id(edge.pred),
                    edge.kind,
                    edge.lag,
                    graph.task_id(task),
                    bound
                );
                es = es.max(bound);
            }
            for &link in preds {
                let edge = graph.edge(link);
                if start_bound(edge, dates[edge.pred as usize], node.duration) == es {
                    driving[link as usize] = true;
                }
            }
            es
        };

        dates[idx] = EarlyDates {
            earliest_start,
            earliest_finish: earliest_start + node.duration,
        };
        log_constraints!(
            verbosity,
            "Forward {}: ES={} EF={}",
            graph.task_id(task),
            earliest_start,
            dates[idx].earliest_finish
        );
    }

    ForwardPassResult { dates, driving }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::graph::build;
    use crate::models::{Dependency, DependencyType, Task};

    fn run(tasks: &[Task], links: &[Dependency]) -> (DependencyGraph, ForwardPassResult) {
        let graph = build(tasks, links, &ScheduleConfig::default()).unwrap();
        let result = forward_pass(&graph, 0);
        (graph, result)
    }

    fn dates_of(graph: &DependencyGraph, result: &ForwardPassResult, id: &str) -> (i64, i64) {
        let d = result.dates[graph.index.get(id).unwrap() as usize];
        (d.earliest_start, d.earliest_finish)
    }

    fn link(pred: &str, succ: &str, kind: DependencyType, lag: i64) -> Dependency {
        Dependency::new(format!("{}-{}", pred, succ), pred, succ, kind, lag)
    }

    #[test]
    fn test_finish_to_start_chain() {
        let tasks = vec![Task::new("a", "A", 2), Task::new("b", "B", 3), Task::new("c", "C", 4)];
        let links = vec![
            link("a", "b", DependencyType::FinishToStart, 0),
            link("b", "c", DependencyType::FinishToStart, 0),
        ];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "a"), (0, 2));
        assert_eq!(dates_of(&graph, &result, "b"), (2, 5));
        assert_eq!(dates_of(&graph, &result, "c"), (5, 9));
        assert_eq!(result.terminal_finish(&graph), 9);
        assert!(result.driving.iter().all(|&d| d));
    }

    #[test]
    fn test_start_to_start_with_lag() {
        let tasks = vec![Task::new("a", "A", 10), Task::new("b", "B", 3)];
        let links = vec![link("a", "b", DependencyType::StartToStart, 2)];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "b"), (2, 5));
    }

    #[test]
    fn test_terminal_finish_ignores_interior_tasks() {
        // a runs past b, but b is the only terminal task
        let tasks = vec![Task::new("a", "A", 10), Task::new("b", "B", 1)];
        let links = vec![link("a", "b", DependencyType::StartToStart, 0)];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "a"), (0, 10));
        assert_eq!(dates_of(&graph, &result, "b"), (0, 1));
        assert_eq!(result.terminal_finish(&graph), 1);
    }

    #[test]
    fn test_finish_to_finish() {
        // b must finish no earlier than a finishes + 1
        let tasks = vec![Task::new("a", "A", 6), Task::new("b", "B", 2)];
        let links = vec![link("a", "b", DependencyType::FinishToFinish, 1)];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "b"), (5, 7));
    }

    #[test]
    fn test_start_to_finish() {
        let tasks = vec![Task::new("a", "A", 4).with_anchor_start(10), Task::new("b", "B", 3)];
        let links = vec![link("a", "b", DependencyType::StartToFinish, 0)];
        let (graph, result) = run(&tasks, &links);

        // EF_b >= ES_a = 10 -> ES_b = 7
        assert_eq!(dates_of(&graph, &result, "b"), (7, 10));
    }

    #[test]
    fn test_lead_clamped_at_epoch() {
        let tasks = vec![Task::new("a", "A", 5), Task::new("b", "B", 1)];
        let links = vec![link("a", "b", DependencyType::FinishToStart, -2)];
        let (graph, result) = run(&tasks, &links);
        assert_eq!(dates_of(&graph, &result, "b"), (3, 4));

        let tasks = vec![Task::new("a", "A", 1), Task::new("b", "B", 1)];
        let (graph, result) = run(&tasks, &links);
        assert_eq!(dates_of(&graph, &result, "b"), (0, 1));
        // the epoch, not the link, fixed b's start
        assert!(!result.driving[0]);
    }

    #[test]
    fn test_anchored_root_and_milestone() {
        let tasks = vec![
            Task::new("a", "A", 3).with_anchor_start(4),
            Task::milestone("m", "Done"),
        ];
        let links = vec![link("a", "m", DependencyType::FinishToStart, 0)];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "a"), (4, 7));
        assert_eq!(dates_of(&graph, &result, "m"), (7, 7));
    }

    #[test]
    fn test_driving_links_marks_every_tie() {
        let tasks = vec![
            Task::new("a", "A", 3),
            Task::new("b", "B", 3),
            Task::new("c", "C", 1),
            Task::new("d", "D", 1),
        ];
        let links = vec![
            link("a", "d", DependencyType::FinishToStart, 0),
            link("b", "d", DependencyType::FinishToStart, 0),
            link("c", "d", DependencyType::FinishToStart, 0),
        ];
        let (graph, result) = run(&tasks, &links);

        assert_eq!(dates_of(&graph, &result, "d"), (3, 4));
        assert_eq!(result.driving, vec![true, true, false]);
    }
}
