use crate::graph::{AttackGraph, EdgeWeight, NodeIndex};

/// Confidence of a path with no scoreable edge.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Mean weight of the edges along `path`.
///
/// Consecutive pairs with no edge between them are skipped. When no edge is
/// found at all (including paths of fewer than two nodes) the result is
/// [`DEFAULT_CONFIDENCE`]. Always within `[0.0, 1.0]`.
pub fn path_confidence(graph: &AttackGraph, path: &[NodeIndex]) -> f64 {
    let weights: Vec<f64> = path
        .windows(2)
        .filter_map(|pair| graph.edge_weight(pair[0], pair[1]))
        .map(EdgeWeight::get)
        .collect();

    if weights.is_empty() {
        return DEFAULT_CONFIDENCE;
    }
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    mean.clamp(0.0, 1.0)
}
