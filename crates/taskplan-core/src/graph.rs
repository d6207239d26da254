//! Precondition graph
//!
//! Directed graph with an edge `task -> precondition` for every precondition
//! that refers to a task in the plan. Unknown references are kept aside so
//! the validator can report them separately.

use crate::types::{TaskId, TaskPlan};
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet};

/// Reference from a task to a precondition id that is not in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnknownReference {
    /// Task declaring the precondition
    pub task: TaskId,
    /// Missing id
    pub missing: TaskId,
}

/// Cycle in the precondition graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Member ids, ascending
    pub members: Vec<TaskId>,
    /// One traversal of the cycle starting and ending at the smallest member
    pub path: Vec<TaskId>,
}

/// Dependency graph of a task plan
#[derive(Debug)]
pub struct PreconditionGraph {
    inner: DiGraphMap<TaskId, ()>,
    unknown: Vec<UnknownReference>,
}

impl PreconditionGraph {
    /// Build the graph for a plan
    #[must_use]
    pub fn build(plan: &TaskPlan) -> Self {
        let mut inner = DiGraphMap::new();
        let mut unknown = Vec::new();

        let known: BTreeSet<TaskId> = plan.ids().collect();
        for &id in &known {
            inner.add_node(id);
        }
        for task in &plan.tasks {
            for &dep in task.preconditions.ids() {
                if known.contains(&dep) {
                    inner.add_edge(task.id, dep, ());
                } else {
                    unknown.push(UnknownReference {
                        task: task.id,
                        missing: dep,
                    });
                }
            }
        }

        Self { inner, unknown }
    }

    /// Number of tasks
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of resolved precondition edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Preconditions that do not resolve to a task, in document order
    #[must_use]
    pub fn unknown_references(&self) -> &[UnknownReference] {
        &self.unknown
    }

    /// Whether the graph has no cycles
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        toposort(&self.inner, None).is_ok()
    }

    /// All cycles, one per strongly connected component, ordered by smallest member
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut cycles: Vec<Cycle> = kosaraju_scc(&self.inner)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().is_some_and(|&n| self.inner.contains_edge(n, n))
            })
            .map(|scc| {
                let members: BTreeSet<TaskId> = scc.into_iter().collect();
                let path = self.trace_cycle(&members);
                Cycle {
                    members: members.into_iter().collect(),
                    path,
                }
            })
            .collect();
        cycles.sort_by(|a, b| a.members.cmp(&b.members));
        cycles
    }

    /// Walk a strongly connected component from its smallest member back to itself
    ///
    /// Depth-first with an explicit stack; successors are tried in ascending
    /// order so the path is deterministic.
    fn trace_cycle(&self, members: &BTreeSet<TaskId>) -> Vec<TaskId> {
        let Some(&start) = members.first() else {
            return Vec::new();
        };
        if self.inner.contains_edge(start, start) {
            return vec![start, start];
        }

        let mut path = vec![start];
        let mut visited = BTreeSet::from([start]);
        let mut frontier = vec![self.successors(start, members).into_iter()];

        while let Some(next) = frontier.last_mut().map(Iterator::next) {
            match next {
                Some(node) if node == start => {
                    path.push(start);
                    return path;
                }
                Some(node) => {
                    if visited.insert(node) {
                        path.push(node);
                        frontier.push(self.successors(node, members).into_iter());
                    }
                }
                None => {
                    frontier.pop();
                    path.pop();
                }
            }
        }
        path
    }

    /// Preconditions of `node` inside `members`, ascending
    fn successors(&self, node: TaskId, members: &BTreeSet<TaskId>) -> Vec<TaskId> {
        let mut next: Vec<TaskId> = self
            .inner
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|n| members.contains(n))
            .collect();
        next.sort();
        next
    }

    /// Group tasks into execution waves
    ///
    /// Wave 0 holds tasks without (resolved) preconditions; every other task
    /// sits one wave after its deepest precondition. Tasks inside a wave are
    /// sorted by id and may run in parallel.
    ///
    /// Returns `None` if the graph has a cycle.
    #[must_use]
    pub fn execution_waves(&self) -> Option<Vec<Vec<TaskId>>> {
        // Edges point at preconditions, so a topological order lists
        // dependents first; walk it backwards.
        let order = toposort(&self.inner, None).ok()?;

        let mut depth: BTreeMap<TaskId, usize> = BTreeMap::new();
        for &node in order.iter().rev() {
            let level = self
                .inner
                .neighbors_directed(node, Direction::Outgoing)
                .filter_map(|dep| depth.get(&dep))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(node, level);
        }

        let mut waves: Vec<Vec<TaskId>> = Vec::new();
        for (node, level) in depth {
            if waves.len() <= level {
                waves.resize_with(level + 1, Vec::new);
            }
            waves[level].push(node);
        }
        Some(waves)
    }

    /// Tasks nothing depends on
    #[must_use]
    pub fn exit_tasks(&self) -> Vec<TaskId> {
        let mut exits: Vec<TaskId> = self
            .inner
            .nodes()
            .filter(|n| {
                self.inner
                    .neighbors_directed(*n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();
        exits.sort();
        exits
    }
}
