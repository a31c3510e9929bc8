//! Critical path extraction.

use crate::graph::{DependencyGraph, LinkIdx};
use crate::interner::TaskIdx;

use super::float::TaskFloat;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CriticalPaths {
    /// Maximal chains, each from a chain head to a task with no critical
    /// driving successor.
    pub paths: Vec<Vec<TaskIdx>>,
    /// Enumeration stopped at the limit with chains left unreported.
    pub truncated: bool,
}

/// Enumerate every maximal chain of critical tasks joined by driving links.
///
/// Heads are critical tasks with no critical driving predecessor, taken in id
/// order; successors are followed in id order, so the output is stable for a
/// given input. Parallel links between the same two tasks yield one chain.
///
/// A network of critical branches that split and rejoin can hold exponentially
/// many chains. `limit` bounds the work: enumeration stops once `limit` chains
/// are collected and another is found, setting `truncated`.
pub fn critical_paths(
    graph: &DependencyGraph,
    driving: &[bool],
    floats: &[TaskFloat],
    limit: usize,
) -> CriticalPaths {
    let n = graph.len();
    let on_chain = |link: LinkIdx| {
        let edge = graph.edge(link);
        driving[link as usize]
            && floats[edge.pred as usize].is_critical
            && floats[edge.succ as usize].is_critical
    };

    let mut has_chain_pred = vec![false; n];
    let mut has_chain_succ = vec![false; n];
    for (link, edge) in graph.edges.iter().enumerate() {
        if on_chain(link as LinkIdx) {
            has_chain_pred[edge.succ as usize] = true;
            has_chain_succ[edge.pred as usize] = true;
        }
    }

    let mut result = CriticalPaths::default();

    for head in 0..n {
        if !floats[head].is_critical || has_chain_pred[head] {
            continue;
        }

        // Iterative DFS: `cursors[d]` is the next successor slot to try at
        // depth d and the last task stepped to from there.
        let mut path: Vec<TaskIdx> = vec![head as TaskIdx];
        let mut cursors: Vec<(usize, Option<TaskIdx>)> = vec![(0, None)];

        while let Some(&task) = path.last() {
            let depth = path.len() - 1;
            let succs = &graph.successors[task as usize];
            let (start, last) = cursors[depth];

            let next = succs[start..].iter().enumerate().find(|&(_, &link)| {
                on_chain(link) && Some(graph.edge(link).succ) != last
            });

            match next {
                Some((offset, &link)) => {
                    let succ = graph.edge(link).succ;
                    cursors[depth] = (start + offset + 1, Some(succ));
                    path.push(succ);
                    cursors.push((0, None));
                }
                None => {
                    if !has_chain_succ[task as usize] {
                        if result.paths.len() == limit {
                            result.truncated = true;
                            return result;
                        }
                        result.paths.push(path.clone());
                    }
                    path.pop();
                    cursors.pop();
                }
            }
        }
    }

    result
}
