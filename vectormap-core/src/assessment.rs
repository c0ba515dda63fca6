// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------
//
// Runs one findings snapshot through the whole pipeline: normalization,
// attack-vector analysis, aggregate risk and the report summary.

use serde::Serialize;
use tracing::info;
use vectormap_findings::{FindingsSummary, normalize, overall_risk_score, summarize};
use vectormap_graph::{AnalysisConfig, AttackAnalyzer, AttackVector, GraphView};
use vectormap_types::FindingsSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssessmentStats {
    pub hosts: usize,
    pub vulnerabilities: usize,
    pub successful_attempts: usize,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Unix timestamp (seconds), set by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<u64>,
    pub stats: AssessmentStats,
    pub risk_score: f64,
    pub vectors: Vec<AttackVector>,
    pub summary: FindingsSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphView>,
}

/// Assess one snapshot. Never fails; malformed input degrades to defaults.
pub fn assess(snapshot: &FindingsSnapshot, config: &AnalysisConfig) -> Assessment {
    let findings = normalize(snapshot);
    let successful_attempts = findings.successful_attempts().count();
    info!(
        hosts = findings.hosts.len(),
        vulnerabilities = findings.vulnerabilities.len(),
        attempts = findings.attempts.len(),
        successful_attempts,
        "findings normalized"
    );

    let analysis = AttackAnalyzer::new(config.clone()).analyze(&findings);

    let risk_score = overall_risk_score(&findings.vulnerabilities);
    info!(risk_score, "risk aggregated");

    let summary = summarize(&findings);
    info!(
        recommendations = summary.recommendations.len(),
        critical = summary.top_critical.len(),
        "summary built"
    );

    let stats = AssessmentStats {
        hosts: findings.hosts.len(),
        vulnerabilities: findings.vulnerabilities.len(),
        successful_attempts,
        nodes: analysis.graph.node_count(),
        edges: analysis.graph.edge_count(),
    };
    let graph = config
        .include_graph
        .then(|| GraphView::from_graph(&analysis.graph));

    Assessment {
        target: snapshot.target.clone(),
        generated_at: None,
        stats,
        risk_score,
        vectors: analysis.vectors,
        summary,
        graph,
    }
}
