pub mod analysis;
pub mod builder;
pub mod confidence;
pub mod export;
pub mod graph;
pub mod narrative;
pub mod node;
pub mod paths;

pub use analysis::{AnalysisConfig, AttackAnalysis, AttackAnalyzer, AttackVector, build_vector};
pub use builder::{GraphBuilder, RelatednessEdges, are_related};
pub use confidence::{DEFAULT_CONFIDENCE, path_confidence};
pub use export::{GraphView, format_dot, format_graphml, format_json_graph};
pub use graph::{AttackGraph, Edge, EdgeWeight, NodeIndex};
pub use narrative::{SHORT_VECTOR, STEP_SEPARATOR, narrate};
pub use node::{Node, NodeData, NodeId, NodeKind};
pub use paths::{AttackPath, EntryPolicy, PathFinder};
