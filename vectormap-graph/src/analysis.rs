// ---------------------------------------------------------------------------
// Attack vector analysis
// ---------------------------------------------------------------------------
//
// Build graph -> find paths -> score + narrate -> rank. One analyzer call owns
// its graph from start to finish.

use serde::{Deserialize, Serialize};
use tracing::info;
use vectormap_findings::NormalizedFindings;

use crate::builder::{GraphBuilder, RelatednessEdges};
use crate::confidence::path_confidence;
use crate::graph::AttackGraph;
use crate::narrative::narrate;
use crate::node::NodeId;
use crate::paths::{AttackPath, PathFinder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub relatedness: RelatednessEdges,
    /// Run per-entry path searches on the rayon pool.
    pub parallel: bool,
    /// Vectors scoring below this are dropped.
    pub min_confidence: f64,
    /// Keep at most this many vectors after ranking.
    pub max_vectors: Option<usize>,
    /// Attach a renderable view of the graph to the assessment.
    pub include_graph: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            relatedness: RelatednessEdges::Forward,
            parallel: false,
            min_confidence: 0.0,
            max_vectors: None,
            include_graph: false,
        }
    }
}

/// One ranked attack chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackVector {
    /// Label of the entry node.
    pub source: String,
    /// Label of the target node.
    pub target: String,
    pub narrative: String,
    pub confidence: f64,
    /// Node ids in traversal order.
    pub path: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AttackAnalysis {
    pub graph: AttackGraph,
    pub vectors: Vec<AttackVector>,
}

#[derive(Debug, Clone, Default)]
pub struct AttackAnalyzer {
    config: AnalysisConfig,
}

impl AttackAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, findings: &NormalizedFindings) -> AttackAnalysis {
        let graph = GraphBuilder::new(self.config.relatedness).build(findings);
        let paths = PathFinder::new(&graph)
            .parallel(self.config.parallel)
            .find_all();
        let found = paths.len();

        let mut vectors: Vec<AttackVector> = paths
            .iter()
            .map(|path| build_vector(&graph, path))
            .filter(|v| v.confidence >= self.config.min_confidence)
            .collect();

        // sort_by is stable: equal confidences keep discovery order
        vectors.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        if let Some(max) = self.config.max_vectors {
            vectors.truncate(max);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            paths = found,
            vectors = vectors.len(),
            "attack vectors ranked"
        );
        AttackAnalysis { graph, vectors }
    }
}

/// Score and narrate one path.
pub fn build_vector(graph: &AttackGraph, path: &AttackPath) -> AttackVector {
    let nodes = path.nodes();
    AttackVector {
        source: graph.node(path.entry()).label(),
        target: graph.node(path.target()).label(),
        narrative: narrate(graph, nodes),
        confidence: path_confidence(graph, nodes),
        path: nodes.iter().map(|&i| graph.node(i).id.clone()).collect(),
    }
}
