use crate::graph::{AttackGraph, NodeIndex};
use crate::node::NodeData;

/// Narrative for paths of fewer than two nodes.
pub const SHORT_VECTOR: &str = "Short attack vector";
/// Joins the per-step phrases.
pub const STEP_SEPARATOR: &str = " → ";

/// Describe a path as one phrase per step.
pub fn narrate(graph: &AttackGraph, path: &[NodeIndex]) -> String {
    if path.len() < 2 {
        return SHORT_VECTOR.to_string();
    }
    path.iter()
        .filter_map(|&idx| graph.get(idx))
        .map(|node| match &node.data {
            NodeData::Host(h) => format!("Access to {}", h.ip),
            NodeData::Vulnerability(v) => format!("Exploit {}", v.title),
            NodeData::AttackAttempt(a) => format!("Successful {} attack", a.attack_type),
        })
        .collect::<Vec<_>>()
        .join(STEP_SEPARATOR)
}
