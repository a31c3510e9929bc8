//! Dependency graph construction, validation and topological ordering.

use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleWarning};
use crate::interner::{TaskIdx, TaskIndex};
use crate::models::{Dependency, DependencyType, Task};
use crate::{log_constraints, log_summary};

/// Index of a link in [`DependencyGraph::edges`].
pub type LinkIdx = u32;

/// Upper bound on the summed magnitudes of every duration, lag, anchor and
/// deadline in one network. Dates and floats derived from inputs within it
/// stay far from `i64` overflow.
pub const MAX_SPAN: i64 = i64::MAX / 8;

/// Per-task data the passes need, copied out of the borrowed input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Node {
    pub duration: i64,
    pub anchor_start: Option<i64>,
    pub deadline: Option<i64>,
}

/// A validated link between two indexed tasks.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id: String,
    pub pred: TaskIdx,
    pub succ: TaskIdx,
    pub kind: DependencyType,
    pub lag: i64,
}

/// Immutable, acyclic snapshot of the task network.
///
/// Adjacency is index based in both directions: `predecessors[t]` and
/// `successors[t]` hold indices into `edges`, sorted by the task on the other
/// end so traversals are reproducible.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    pub index: TaskIndex,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub predecessors: Vec<Vec<LinkIdx>>,
    pub successors: Vec<Vec<LinkIdx>>,
    /// Every task once, predecessors before successors, ties by task id.
    pub topo_order: Vec<TaskIdx>,
    /// Problems tolerated in lenient mode.
    pub warnings: Vec<ScheduleWarning>,
}

impl DependencyGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn edge(&self, link: LinkIdx) -> &Edge {
        &self.edges[link as usize]
    }

    #[inline]
    pub fn duration(&self, task: TaskIdx) -> i64 {
        self.nodes[task as usize].duration
    }

    pub fn is_terminal(&self, task: TaskIdx) -> bool {
        self.successors[task as usize].is_empty()
    }

    pub fn task_id(&self, task: TaskIdx) -> &str {
        self.index.resolve(task)
    }
}

/// Validate `tasks` and `links` and build the dependency graph.
///
/// # Errors
/// * `DuplicateTaskId` whenever two tasks share an id
/// * `UnknownTaskReference`, `DuplicateLinkId`, `AnchorOnDependentTask` in
///   strict mode (lenient mode turns these into warnings)
/// * `OffsetOutOfRange` when offsets together exceed [`MAX_SPAN`]
/// * `CyclicDependency` with the tasks left over by Kahn's algorithm
pub fn build(
    tasks: &[Task],
    links: &[Dependency],
    config: &ScheduleConfig,
) -> Result<DependencyGraph, ScheduleError> {
    let verbosity = config.verbosity;
    let index = TaskIndex::from_ids(tasks.iter().map(|t| t.id.as_str()))
        .map_err(ScheduleError::DuplicateTaskId)?;
    let n = index.len();

    let mut nodes = vec![Node::default(); n];
    for task in tasks {
        let Some(idx) = index.get(&task.id) else {
            continue;
        };
        nodes[idx as usize] = Node {
            duration: i64::from(task.duration),
            anchor_start: task.anchor_start,
            deadline: task.deadline,
        };
    }

    let mut warnings = Vec::new();
    let mut edges: Vec<Edge> = Vec::with_capacity(links.len());
    let mut seen_links: FxHashSet<&str> =
        FxHashSet::with_capacity_and_hasher(links.len(), Default::default());

    for link in links {
        if !seen_links.insert(link.id.as_str()) {
            if config.is_strict() {
                return Err(ScheduleError::DuplicateLinkId(link.id.clone()));
            }
            log_constraints!(verbosity, "Dropping duplicate link {}", link.id);
            warnings.push(ScheduleWarning::DuplicateLinkId(link.id.clone()));
            continue;
        }

        let (pred, succ) = match (index.get(&link.predecessor_id), index.get(&link.successor_id)) {
            (Some(pred), Some(succ)) => (pred, succ),
            (pred, _) => {
                let task_id = if pred.is_none() {
                    link.predecessor_id.clone()
                } else {
                    link.successor_id.clone()
                };
                if config.is_strict() {
                    return Err(ScheduleError::UnknownTaskReference {
                        link_id: link.id.clone(),
                        task_id,
                    });
                }
                log_constraints!(
                    verbosity,
                    "Dropping link {} referencing unknown task {}",
                    link.id,
                    task_id
                );
                warnings.push(ScheduleWarning::UnknownTaskReference {
                    link_id: link.id.clone(),
                    task_id,
                });
                continue;
            }
        };

        edges.push(Edge {
            id: link.id.clone(),
            pred,
            succ,
            kind: link.kind,
            lag: link.lag,
        });
    }

    let mut predecessors: Vec<Vec<LinkIdx>> = vec![Vec::new(); n];
    let mut successors: Vec<Vec<LinkIdx>> = vec![Vec::new(); n];
    for (i, edge) in edges.iter().enumerate() {
        predecessors[edge.succ as usize].push(i as LinkIdx);
        successors[edge.pred as usize].push(i as LinkIdx);
    }
    for list in &mut predecessors {
        list.sort_by_key(|&l| (edges[l as usize].pred, l));
    }
    for list in &mut successors {
        list.sort_by_key(|&l| (edges[l as usize].succ, l));
    }

    for (idx, node) in nodes.iter_mut().enumerate() {
        if node.anchor_start.is_none() || predecessors[idx].is_empty() {
            continue;
        }
        let task_id = index.resolve(idx as TaskIdx).to_string();
        if config.is_strict() {
            return Err(ScheduleError::AnchorOnDependentTask(task_id));
        }
        log_constraints!(verbosity, "Ignoring anchored start on dependent task {}", task_id);
        node.anchor_start = None;
        warnings.push(ScheduleWarning::AnchorIgnored(task_id));
    }

    check_span(&index, &nodes, &edges)?;

    let topo_order = topological_sort(n, &edges, &successors).map_err(|residual| {
        ScheduleError::CyclicDependency {
            task_ids: residual
                .into_iter()
                .map(|idx| index.resolve(idx).to_string())
                .collect(),
        }
    })?;

    log_summary!(
        verbosity,
        "Built dependency graph: {} tasks, {} links, {} warnings",
        n,
        edges.len(),
        warnings.len()
    );

    Ok(DependencyGraph {
        index,
        nodes,
        edges,
        predecessors,
        successors,
        topo_order,
        warnings,
    })
}

/// Sum the magnitude of every offset the passes add up, failing on the first
/// task or link that takes the total past [`MAX_SPAN`].
fn check_span(index: &TaskIndex, nodes: &[Node], edges: &[Edge]) -> Result<(), ScheduleError> {
    let mut span: i64 = 0;
    let mut add = |magnitude: u64, id: &str| -> Result<(), ScheduleError> {
        span = i64::try_from(magnitude)
            .ok()
            .and_then(|m| span.checked_add(m))
            .filter(|&total| total <= MAX_SPAN)
            .ok_or_else(|| ScheduleError::OffsetOutOfRange { id: id.to_string() })?;
        Ok(())
    };

    for (idx, node) in nodes.iter().enumerate() {
        let id = index.resolve(idx as TaskIdx);
        add(node.duration.unsigned_abs(), id)?;
        if let Some(anchor) = node.anchor_start {
            add(anchor.unsigned_abs(), id)?;
        }
        if let Some(deadline) = node.deadline {
            add(deadline.unsigned_abs(), id)?;
        }
    }
    for edge in edges {
        add(edge.lag.unsigned_abs(), &edge.id)?;
    }
    Ok(())
}

/// Kahn's algorithm with a min-heap so independent tasks come out in index
/// (and therefore id) order.
///
/// On failure returns the tasks that never reached zero in-degree, minus
/// those that only hang downstream of a cycle, in index order.
fn topological_sort(
    n: usize,
    edges: &[Edge],
    successors: &[Vec<LinkIdx>],
) -> Result<Vec<TaskIdx>, Vec<TaskIdx>> {
    let mut in_degree = vec![0usize; n];
    for edge in edges {
        in_degree[edge.succ as usize] += 1;
    }

    let mut ready: BinaryHeap<Reverse<TaskIdx>> = (0..n as TaskIdx)
        .filter(|&t| in_degree[t as usize] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(task)) = ready.pop() {
        order.push(task);
        for &link in &successors[task as usize] {
            let succ = edges[link as usize].succ as usize;
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.push(Reverse(succ as TaskIdx));
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    let mut in_residual = vec![false; n];
    for (t, &degree) in in_degree.iter().enumerate() {
        in_residual[t] = degree > 0;
    }
    Err(prune_downstream(edges, successors, in_residual))
}

/// Strip residual tasks whose successors all lie outside the residual, until
/// only tasks on (or between) cycles remain.
fn prune_downstream(
    edges: &[Edge],
    successors: &[Vec<LinkIdx>],
    mut in_residual: Vec<bool>,
) -> Vec<TaskIdx> {
    let out_degree = |t: usize, in_residual: &[bool]| {
        successors[t]
            .iter()
            .filter(|&&l| in_residual[edges[l as usize].succ as usize])
            .count()
    };

    let mut changed = true;
    while changed {
        changed = false;
        for t in 0..in_residual.len() {
            if in_residual[t] && out_degree(t, &in_residual[..]) == 0 {
                in_residual[t] = false;
                changed = true;
            }
        }
    }

    (0..in_residual.len())
        .filter(|&t| in_residual[t])
        .map(|t| t as TaskIdx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tasks(ids: &[(&str, u32)]) -> Vec<Task> {
        ids.iter()
            .map(|&(id, duration)| Task::new(id, id.to_uppercase(), duration))
            .collect()
    }

    fn fs(id: &str, pred: &str, succ: &str) -> Dependency {
        Dependency::finish_to_start(id, pred, succ)
    }

    fn order_ids(graph: &DependencyGraph) -> Vec<&str> {
        graph.topo_order.iter().map(|&t| graph.task_id(t)).collect()
    }

    #[test]
    fn test_chain_order_and_adjacency() {
        let tasks = make_tasks(&[("c", 4), ("a", 2), ("b", 3)]);
        let links = vec![fs("l2", "b", "c"), fs("l1", "a", "b")];
        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();

        assert_eq!(order_ids(&graph), vec!["a", "b", "c"]);
        let b = graph.index.get("b").unwrap();
        assert_eq!(graph.predecessors[b as usize].len(), 1);
        assert_eq!(graph.successors[b as usize].len(), 1);
        assert_eq!(graph.edge(graph.successors[b as usize][0]).id, "l2");
        assert_eq!(graph.duration(b), 3);
        assert!(graph.is_terminal(graph.index.get("c").unwrap()));
        assert!(graph.warnings.is_empty());
    }

    #[test]
    fn test_independent_tasks_ordered_by_id() {
        let tasks = make_tasks(&[("zeta", 1), ("alpha", 1), ("mid", 1), ("beta", 1)]);
        let links = vec![fs("l1", "zeta", "mid")];
        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();

        assert_eq!(order_ids(&graph), vec!["alpha", "beta", "zeta", "mid"]);
    }

    #[test]
    fn test_unknown_reference_lenient_drops_link() {
        let tasks = make_tasks(&[("a", 1), ("b", 1)]);
        let links = vec![fs("l1", "a", "b"), fs("l2", "a", "ghost")];
        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(
            graph.warnings,
            vec![ScheduleWarning::UnknownTaskReference {
                link_id: "l2".to_string(),
                task_id: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_reference_strict_fails() {
        let tasks = make_tasks(&[("a", 1)]);
        let links = vec![fs("l1", "ghost", "a")];
        let err = build(&tasks, &links, &ScheduleConfig::strict()).unwrap_err();

        assert_eq!(
            err,
            ScheduleError::UnknownTaskReference {
                link_id: "l1".to_string(),
                task_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_task_id_always_fatal() {
        let tasks = make_tasks(&[("a", 1), ("a", 2)]);
        let err = build(&tasks, &[], &ScheduleConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::DuplicateTaskId("a".to_string()));
    }

    #[test]
    fn test_duplicate_link_id() {
        let tasks = make_tasks(&[("a", 1), ("b", 1), ("c", 1)]);
        let links = vec![fs("l1", "a", "b"), fs("l1", "b", "c")];

        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.warnings, vec![ScheduleWarning::DuplicateLinkId("l1".to_string())]);

        let err = build(&tasks, &links, &ScheduleConfig::strict()).unwrap_err();
        assert_eq!(err, ScheduleError::DuplicateLinkId("l1".to_string()));
    }

    #[test]
    fn test_anchor_on_dependent_task() {
        let mut tasks = make_tasks(&[("a", 1)]);
        tasks.push(Task::new("b", "B", 1).with_anchor_start(5));
        let links = vec![fs("l1", "a", "b")];

        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();
        let b = graph.index.get("b").unwrap();
        assert_eq!(graph.nodes[b as usize].anchor_start, None);
        assert_eq!(graph.warnings, vec![ScheduleWarning::AnchorIgnored("b".to_string())]);

        let err = build(&tasks, &links, &ScheduleConfig::strict()).unwrap_err();
        assert_eq!(err, ScheduleError::AnchorOnDependentTask("b".to_string()));
    }

    #[test]
    fn test_cycle_reports_only_cycle_members() {
        // a -> b -> c -> a, with d hanging off c and e feeding a
        let tasks = make_tasks(&[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1)]);
        let links = vec![
            fs("l1", "a", "b"),
            fs("l2", "b", "c"),
            fs("l3", "c", "a"),
            fs("l4", "c", "d"),
            fs("l5", "e", "a"),
        ];
        let err = build(&tasks, &links, &ScheduleConfig::default()).unwrap_err();

        assert_eq!(
            err,
            ScheduleError::CyclicDependency {
                task_ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            }
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let tasks = make_tasks(&[("a", 1), ("b", 1)]);
        let links = vec![fs("l1", "a", "a"), fs("l2", "a", "b")];
        let err = build(&tasks, &links, &ScheduleConfig::default()).unwrap_err();

        assert_eq!(
            err,
            ScheduleError::CyclicDependency {
                task_ids: vec!["a".to_string()],
            }
        );
    }

    #[test]
    fn test_offsets_past_span_rejected() {
        let tasks = make_tasks(&[("a", 1), ("b", 1)]);
        let links = vec![Dependency::new("l1", "a", "b", DependencyType::FinishToStart, i64::MAX)];
        let err = build(&tasks, &links, &ScheduleConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::OffsetOutOfRange { id: "l1".to_string() });

        let tasks = vec![Task::new("a", "A", 1).with_deadline(i64::MIN)];
        let err = build(&tasks, &[], &ScheduleConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::OffsetOutOfRange { id: "a".to_string() });

        // each value fits, their sum does not
        let tasks = vec![
            Task::new("a", "A", 1).with_anchor_start(MAX_SPAN / 2 + 1),
            Task::new("b", "B", 1).with_anchor_start(-(MAX_SPAN / 2 + 1)),
        ];
        let err = build(&tasks, &[], &ScheduleConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::OffsetOutOfRange { id: "b".to_string() });
    }

    #[test]
    fn test_large_offsets_within_span_accepted() {
        let tasks = make_tasks(&[("a", 1), ("b", 1)]);
        let links = vec![Dependency::new("l1", "a", "b", DependencyType::FinishToStart, MAX_SPAN - 2)];
        let graph = build(&tasks, &links, &ScheduleConfig::default()).unwrap();
        assert_eq!(graph.edges[0].lag, MAX_SPAN - 2);
    }

    #[test]
    fn test_empty_input() {
        let graph = build(&[], &[], &ScheduleConfig::default()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.topo_order.is_empty());
    }
}
