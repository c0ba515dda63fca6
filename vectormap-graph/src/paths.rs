// ---------------------------------------------------------------------------
// Path finder
// ---------------------------------------------------------------------------
//
// Shortest (fewest-edges) path from every entry node to every high-impact
// target. Each entry runs one BFS; ties resolve by adjacency insertion order,
// so the result is fully determined by the graph.

use std::collections::VecDeque;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{AttackGraph, NodeIndex};
use crate::node::{Node, NodeKind};

/// Which nodes an attacker may start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    /// Every vulnerability and every successful attempt is an entry point.
    /// All hosts are assumed reachable by the attacker; no network topology
    /// is inferred.
    #[default]
    AllReachable,
}

impl EntryPolicy {
    fn admits(self, node: &Node) -> bool {
        match self {
            EntryPolicy::AllReachable => matches!(
                node.kind(),
                NodeKind::Vulnerability | NodeKind::AttackAttempt
            ),
        }
    }
}

/// Ordered node sequence from an entry to a target, at least two nodes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPath {
    nodes: Vec<NodeIndex>,
}

impl AttackPath {
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn entry(&self) -> NodeIndex {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len() - 1
    }
}

pub struct PathFinder<'g> {
    graph: &'g AttackGraph,
    policy: EntryPolicy,
    parallel: bool,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g AttackGraph) -> Self {
        Self {
            graph,
            policy: EntryPolicy::default(),
            parallel: false,
        }
    }

    pub fn policy(mut self, policy: EntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Search entries on the rayon pool. Output order is unchanged.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn entries(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .filter(|(_, n)| self.policy.admits(n))
            .map(|(i, _)| i)
            .collect()
    }

    /// Vulnerabilities rated HIGH or CRITICAL.
    pub fn targets(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .filter(|(_, n)| n.severity().is_some_and(|s| s.is_high_impact()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every shortest entry -> target path, entries then targets in node
    /// insertion order.
    pub fn find_all(&self) -> Vec<AttackPath> {
        let entries = self.entries();
        let targets = self.targets();
        if entries.is_empty() || targets.is_empty() {
            debug!(
                entries = entries.len(),
                targets = targets.len(),
                "nothing to search"
            );
            return Vec::new();
        }

        let per_entry = |&entry: &NodeIndex| self.paths_from(entry, &targets);
        let paths: Vec<AttackPath> = if self.parallel {
            entries.par_iter().flat_map_iter(per_entry).collect()
        } else {
            entries.iter().flat_map(per_entry).collect()
        };

        debug!(
            entries = entries.len(),
            targets = targets.len(),
            paths = paths.len(),
            "path search complete"
        );
        paths
    }

    pub fn shortest_path(&self, from: NodeIndex, to: NodeIndex) -> Option<AttackPath> {
        let parents = self.bfs(from)?;
        trace_back(&parents, from, to)
    }

    fn paths_from(&self, entry: NodeIndex, targets: &[NodeIndex]) -> Vec<AttackPath> {
        let Some(parents) = self.bfs(entry) else {
            return Vec::new();
        };
        targets
            .iter()
            .filter(|&&t| t != entry)
            .filter_map(|&t| trace_back(&parents, entry, t))
            .collect()
    }

    /// BFS parent table from `source`; `None` if the index is foreign.
    fn bfs(&self, source: NodeIndex) -> Option<Vec<Option<NodeIndex>>> {
        self.graph.get(source)?;
        let mut parents: Vec<Option<NodeIndex>> = vec![None; self.graph.node_count()];
        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::new();

        visited[source.index()] = true;
        queue.push_back(source);
        while let Some(current) = queue.pop_front() {
            for edge in self.graph.successors(current) {
                let next = edge.target.index();
                if !visited[next] {
                    visited[next] = true;
                    parents[next] = Some(current);
                    queue.push_back(edge.target);
                }
            }
        }
        Some(parents)
    }
}

fn trace_back(
    parents: &[Option<NodeIndex>],
    source: NodeIndex,
    target: NodeIndex,
) -> Option<AttackPath> {
    if source == target {
        return None;
    }
    let mut nodes = vec![target];
    let mut current = target;
    while let Some(parent) = parents.get(current.index()).copied().flatten() {
        nodes.push(parent);
        if parent == source {
            nodes.reverse();
            return (nodes.len() >= 2).then_some(AttackPath { nodes });
        }
        current = parent;
    }
    None
}
