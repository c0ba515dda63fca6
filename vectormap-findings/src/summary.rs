// ---------------------------------------------------------------------------
// Findings summary
// ---------------------------------------------------------------------------
//
// Executive-summary figures reported next to the attack vectors: severity
// distribution, the worst findings, grouped remediation advice, and the
// successful exploitation attempts.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use serde::Serialize;
use vectormap_types::Severity;

use crate::normalize::{NormalizedFindings, NormalizedVuln};

/// Maximum number of entries in [`FindingsSummary::top_critical`].
pub const TOP_CRITICAL_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalFinding {
    pub title: String,
    pub cvss_score: Option<f64>,
    pub host: IpAddr,
    pub port: Option<u16>,
}

/// Remediation advice for every finding sharing one title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub vulnerability_type: String,
    pub affected_systems: usize,
    pub critical_instances: usize,
    pub recommendation: String,
    pub priority: Priority,
}

/// A successful exploitation attempt, rated by what it yielded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackFinding {
    pub host: IpAddr,
    pub attack_type: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FindingsSummary {
    pub total_hosts: usize,
    pub total_vulnerabilities: usize,
    pub distribution: BTreeMap<Severity, usize>,
    pub top_critical: Vec<CriticalFinding>,
    pub recommendations: Vec<Recommendation>,
    pub attack_findings: Vec<AttackFinding>,
}

pub fn summarize(findings: &NormalizedFindings) -> FindingsSummary {
    let mut distribution: BTreeMap<Severity, usize> =
        Severity::ALL.iter().map(|s| (*s, 0)).collect();
    for vuln in &findings.vulnerabilities {
        *distribution.entry(vuln.severity).or_default() += 1;
    }

    let top_critical = findings
        .vulnerabilities
        .iter()
        .filter(|v| v.severity == Severity::Critical)
        .take(TOP_CRITICAL_LIMIT)
        .map(|v| CriticalFinding {
            title: v.title.clone(),
            cvss_score: v.cvss_score,
            host: v.host,
            port: v.port,
        })
        .collect();

    let attack_findings = findings
        .successful_attempts()
        .map(|a| AttackFinding {
            host: a.host,
            attack_type: a.attack_type.clone(),
            severity: if a.recovered_credentials() {
                Severity::High
            } else {
                Severity::Medium
            },
        })
        .collect();

    FindingsSummary {
        total_hosts: findings.hosts.len(),
        total_vulnerabilities: findings.vulnerabilities.len(),
        distribution,
        top_critical,
        recommendations: recommendations(&findings.vulnerabilities),
        attack_findings,
    }
}

/// Group findings by title (first-seen order), HIGH priority groups first.
fn recommendations(vulns: &[NormalizedVuln]) -> Vec<Recommendation> {
    let mut groups: Vec<(&str, Vec<&NormalizedVuln>)> = Vec::new();
    for vuln in vulns {
        match groups.iter_mut().find(|(title, _)| *title == vuln.title) {
            Some((_, members)) => members.push(vuln),
            None => groups.push((vuln.title.as_str(), vec![vuln])),
        }
    }

    let mut out: Vec<Recommendation> = groups
        .into_iter()
        .map(|(title, members)| {
            let hosts: BTreeSet<IpAddr> = members.iter().map(|v| v.host).collect();
            let critical_instances = members
                .iter()
                .filter(|v| v.severity.is_high_impact())
                .count();
            Recommendation {
                vulnerability_type: title.to_string(),
                affected_systems: hosts.len(),
                critical_instances,
                recommendation: members[0].recommendation.clone(),
                priority: if critical_instances > 0 {
                    Priority::High
                } else {
                    Priority::Medium
                },
            }
        })
        .collect();

    out.sort_by_key(|r| r.priority);
    out
}
