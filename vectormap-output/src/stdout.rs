use vectormap_core::Assessment;
use vectormap_findings::Priority;
use vectormap_types::Severity;

use crate::traits::{OutputError, OutputFormatter};

/// Replace every control character in untrusted data, line breaks included,
/// so a field can neither emit escapes nor forge report lines.
fn sanitize_terminal(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect()
}

/// Human-readable report.
#[derive(Default)]
pub struct StdoutFormatter {
    /// Print the full node path under each vector.
    show_paths: bool,
}

impl StdoutFormatter {
    pub fn new(show_paths: bool) -> Self {
        Self { show_paths }
    }
}

impl OutputFormatter for StdoutFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        let mut output = String::new();

        output.push_str(&format!(
            "vectormap {} assessment report\n",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(ref target) = assessment.target {
            output.push_str(&format!("Target: {}\n", sanitize_terminal(target)));
        }

        let stats = &assessment.stats;
        output.push_str(&format!(
            "Hosts: {}  Vulnerabilities: {}  Successful attacks: {}\n",
            stats.hosts, stats.vulnerabilities, stats.successful_attempts
        ));
        output.push_str(&format!(
            "Attack graph: {} nodes, {} edges\n",
            stats.nodes, stats.edges
        ));
        output.push_str(&format!(
            "Overall risk score: {:.2} / 10\n",
            assessment.risk_score
        ));

        let summary = &assessment.summary;
        output.push_str("\nSeverity distribution:\n");
        for severity in Severity::ALL {
            let count = summary.distribution.get(&severity).copied().unwrap_or(0);
            output.push_str(&format!(
                "  {:<9} {count}\n",
                severity.to_string().to_uppercase()
            ));
        }

        if assessment.vectors.is_empty() {
            output.push_str("\nNo attack vectors found.\n");
        } else {
            output.push_str(&format!(
                "\nAttack vectors ({}):\n",
                assessment.vectors.len()
            ));
            for (i, vector) in assessment.vectors.iter().enumerate() {
                output.push_str(&format!(
                    "  {:>2}. [{:.2}] {} -> {}\n",
                    i + 1,
                    vector.confidence,
                    sanitize_terminal(&vector.source),
                    sanitize_terminal(&vector.target)
                ));
                output.push_str(&format!(
                    "      {}\n",
                    sanitize_terminal(&vector.narrative)
                ));
                if self.show_paths {
                    let ids: Vec<String> = vector
                        .path
                        .iter()
                        .map(|id| sanitize_terminal(id.as_str()))
                        .collect();
                    output.push_str(&format!("      path: {}\n", ids.join(" > ")));
                }
            }
        }

        if !summary.top_critical.is_empty() {
            output.push_str("\nTop critical vulnerabilities:\n");
            for finding in &summary.top_critical {
                let location = match finding.port {
                    Some(port) => format!("{}:{port}", finding.host),
                    None => finding.host.to_string(),
                };
                let score = finding
                    .cvss_score
                    .map_or_else(|| "-".to_string(), |s| format!("{s:.1}"));
                output.push_str(&format!(
                    "  {} ({score}) on {location}\n",
                    sanitize_terminal(&finding.title)
                ));
            }
        }

        if !summary.recommendations.is_empty() {
            output.push_str("\nRecommendations:\n");
            for rec in &summary.recommendations {
                let priority = match rec.priority {
                    Priority::High => "HIGH",
                    Priority::Medium => "MEDIUM",
                };
                output.push_str(&format!(
                    "  [{priority}] {} ({} hosts, {} high-impact)\n",
                    sanitize_terminal(&rec.vulnerability_type),
                    rec.affected_systems,
                    rec.critical_instances
                ));
                output.push_str(&format!(
                    "      {}\n",
                    sanitize_terminal(&rec.recommendation)
                ));
            }
        }

        if !summary.attack_findings.is_empty() {
            output.push_str("\nSuccessful attacks:\n");
            for finding in &summary.attack_findings {
                output.push_str(&format!(
                    "  {} {} ({})\n",
                    finding.host,
                    sanitize_terminal(&finding.attack_type),
                    finding.severity.to_string().to_uppercase()
                ));
            }
        }

        Ok(output)
    }
}
