// ---------------------------------------------------------------------------
// Attack graph storage
// ---------------------------------------------------------------------------
//
// Arena of nodes in insertion order plus one adjacency list per node. Edges
// reference nodes by index, so a finished graph is plain data and can be
// searched from several threads at once.

use std::collections::HashMap;

use crate::node::{Node, NodeId};

/// Position of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Edge weight, always in (0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct EdgeWeight(pub(crate) f64);

impl EdgeWeight {
    pub fn new(weight: f64) -> Option<Self> {
        (weight > 0.0 && weight <= 1.0).then_some(Self(weight))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub weight: EdgeWeight,
}

#[derive(Debug, Clone, Default)]
pub struct AttackGraph {
    nodes: Vec<Node>,
    lookup: HashMap<NodeId, NodeIndex>,
    adjacency: Vec<Vec<Edge>>,
}

impl AttackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or replace the payload of the node with the same id.
    ///
    /// A replaced node keeps its index and its edges.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.lookup.get(&node.id) {
            self.nodes[idx.0] = node;
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.lookup.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add a directed edge. An existing `from -> to` edge has its weight
    /// replaced in place. Returns `false` if either index is not part of
    /// this graph.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, weight: EdgeWeight) -> bool {
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return false;
        }
        let edges = &mut self.adjacency[from.0];
        match edges.iter_mut().find(|e| e.target == to) {
            Some(existing) => existing.weight = weight,
            None => edges.push(Edge { target: to, weight }),
        }
        true
    }

    pub fn find(&self, id: &NodeId) -> Option<NodeIndex> {
        self.lookup.get(id).copied()
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0)
    }

    /// # Panics
    ///
    /// If `idx` was not produced by this graph.
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    pub fn successors(&self, idx: NodeIndex) -> &[Edge] {
        self.adjacency.get(idx.0).map_or(&[][..], Vec::as_slice)
    }

    pub fn edge_weight(&self, from: NodeIndex, to: NodeIndex) -> Option<EdgeWeight> {
        self.successors(from)
            .iter()
            .find(|e| e.target == to)
            .map(|e| e.weight)
    }

    /// All edges as `(from, to, weight)`, grouped by source in node order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, EdgeWeight)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(from, edges)| {
            edges
                .iter()
                .map(move |e| (NodeIndex(from), e.target, e.weight))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
