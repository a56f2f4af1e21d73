//! Dependency cycle detection.
//!
//! Nodes are task IDs (or positional index for tasks without one); edges are
//! dependency references. Detection is a depth-first walk in input order that
//! stops at the first back-edge, so at most one cycle is reported.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Closed loop of node IDs; the first ID is repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(Vec<i64>);

impl Cycle {
    pub fn nodes(&self) -> &[i64] {
        &self.0
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

impl From<Vec<i64>> for Cycle {
    fn from(nodes: Vec<i64>) -> Self {
        Self(nodes)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct DependencyGraph<'a> {
    // first-seen order of node keys
    order: Vec<i64>,
    edges: HashMap<i64, &'a [i64]>,
}

impl<'a> DependencyGraph<'a> {
    fn build(tasks: &'a [Task]) -> Self {
        let mut order = Vec::with_capacity(tasks.len());
        let mut edges = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            let key = task.node_key(i);
            // A repeated key keeps its original position but takes the later edge list.
            if edges.insert(key, task.dependencies.as_slice()).is_none() {
                order.push(key);
            }
        }
        Self { order, edges }
    }

    fn first_cycle(&self) -> Option<Cycle> {
        let mut marks: HashMap<i64, Mark> =
            self.order.iter().map(|&n| (n, Mark::Unvisited)).collect();
        let mut path = Vec::new();

        for &node in &self.order {
            if marks.get(&node) == Some(&Mark::Unvisited) {
                if let Some(cycle) = self.visit(node, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// `path` holds the current DFS stack; every call pops what it pushed
    /// unless it returns a cycle.
    fn visit(&self, node: i64, marks: &mut HashMap<i64, Mark>, path: &mut Vec<i64>) -> Option<Cycle> {
        marks.insert(node, Mark::OnStack);
        path.push(node);

        let neighbors = self.edges.get(&node).copied().unwrap_or_default();
        for &next in neighbors {
            match marks.get(&next).copied() {
                // Reference to an ID outside the batch cannot close a loop.
                None | Some(Mark::Done) => {}
                Some(Mark::Unvisited) => {
                    if let Some(cycle) = self.visit(next, marks, path) {
                        return Some(cycle);
                    }
                }
                Some(Mark::OnStack) => {
                    let start = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut nodes = path[start..].to_vec();
                    nodes.push(next);
                    return Some(Cycle(nodes));
                }
            }
        }

        path.pop();
        marks.insert(node, Mark::Done);
        None
    }
}

/// Return the first dependency cycle among `tasks`, as a list of zero or one cycles.
pub fn detect_cycles(tasks: &[Task]) -> Vec<Cycle> {
    let graph = DependencyGraph::build(tasks);
    let found: Vec<Cycle> = graph.first_cycle().into_iter().collect();
    if let Some(cycle) = found.first() {
        tracing::debug!(%cycle, "dependency cycle found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: i64, deps: &[i64]) -> Task {
        Task::new(format!("task {id}"))
            .with_id(id)
            .with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_no_cycle_in_chain() {
        let tasks = vec![t(1, &[2]), t(2, &[3]), t(3, &[])];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_self_reference_is_two_node_cycle() {
        let tasks = vec![t(1, &[]), t(7, &[7])];
        assert_eq!(detect_cycles(&tasks), vec![Cycle::from(vec![7, 7])]);
    }

    #[test]
    fn test_three_node_cycle() {
        let tasks = vec![t(1, &[2]), t(2, &[3]), t(3, &[1])];
        let cycles = detect_cycles(&tasks);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes(), &[1, 2, 3, 1]);
        assert!([1, 2, 3].iter().all(|&id| cycles[0].contains(id)));
    }

    #[test]
    fn test_cycle_excludes_entry_path() {
        // 1 leads into the 2 <-> 3 loop but is not part of it.
        let tasks = vec![t(1, &[2]), t(2, &[3]), t(3, &[2])];
        assert_eq!(detect_cycles(&tasks), vec![Cycle::from(vec![2, 3, 2])]);
    }

    #[test]
    fn test_stops_at_first_cycle() {
        let tasks = vec![t(1, &[2]), t(2, &[1]), t(3, &[4]), t(4, &[3])];
        let cycles = detect_cycles(&tasks);
        assert_eq!(cycles, vec![Cycle::from(vec![1, 2, 1])]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let tasks = vec![t(1, &[2, 3]), t(2, &[4]), t(3, &[4]), t(4, &[])];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_unknown_dependency_ignored() {
        let tasks = vec![t(1, &[99]), t(2, &[1])];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_tasks_without_ids_use_position() {
        // Positions 0 and 1 reference each other.
        let tasks = vec![
            Task::new("first").with_dependencies([1]),
            Task::new("second").with_dependencies([0]),
        ];
        assert_eq!(detect_cycles(&tasks), vec![Cycle::from(vec![0, 1, 0])]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cycle::from(vec![4, 5, 4]).to_string(), "4 -> 5 -> 4");
    }
}
