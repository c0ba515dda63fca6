// ---------------------------------------------------------------------------
// Finding normalizer
// ---------------------------------------------------------------------------
//
// Turns the raw host / vulnerability / attack records into the uniform
// shapes the graph builder consumes. Never fails: anything missing or out of
// range degrades to a documented default.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;
use vectormap_types::{AttackOutcome, FindingsSnapshot, HostRecord, Severity, VulnerabilityRecord};

const UNKNOWN_TITLE: &str = "Unknown vulnerability";
const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedHost {
    pub ip: IpAddr,
    pub hostname: Option<String>,
    pub os_guess: Option<String>,
    pub open_ports: Vec<u16>,
    /// Service name per open port (first one reported wins).
    pub services: BTreeMap<u16, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedVuln {
    pub host: IpAddr,
    pub port: Option<u16>,
    pub title: String,
    pub cve_id: Option<String>,
    pub severity: Severity,
    /// CVSS base score, `None` when missing or unusable.
    pub cvss_score: Option<f64>,
    pub description: String,
    pub recommendation: String,
}

impl NormalizedVuln {
    /// Numeric score on the 0-10 scale (0.0 when unscored).
    pub fn score(&self) -> f64 {
        self.cvss_score.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAttempt {
    pub host: IpAddr,
    pub attack_type: String,
    pub outcome: AttackOutcome,
}

impl NormalizedAttempt {
    pub fn succeeded(&self) -> bool {
        self.outcome.success
    }

    pub fn recovered_credentials(&self) -> bool {
        self.outcome.credentials.is_some()
    }
}

/// Node-ready view of one findings snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedFindings {
    pub hosts: Vec<NormalizedHost>,
    pub vulnerabilities: Vec<NormalizedVuln>,
    pub attempts: Vec<NormalizedAttempt>,
}

impl NormalizedFindings {
    pub fn successful_attempts(&self) -> impl Iterator<Item = &NormalizedAttempt> {
        self.attempts.iter().filter(|a| a.succeeded())
    }
}

/// Normalize a snapshot. Input order is preserved for hosts and
/// vulnerabilities; attempts follow the sorted order of the attack map.
pub fn normalize(snapshot: &FindingsSnapshot) -> NormalizedFindings {
    let hosts = snapshot.hosts.iter().map(normalize_host).collect();
    let vulnerabilities = snapshot.vulnerabilities.iter().map(normalize_vuln).collect();

    let attempts = snapshot
        .attacks
        .iter()
        .flat_map(|(ip, host_attacks)| {
            host_attacks
                .iter()
                .map(move |(attack_type, outcome)| NormalizedAttempt {
                    host: *ip,
                    attack_type: attack_type.clone(),
                    outcome: outcome.clone(),
                })
        })
        .collect();

    NormalizedFindings {
        hosts,
        vulnerabilities,
        attempts,
    }
}

fn normalize_host(host: &HostRecord) -> NormalizedHost {
    let mut open_ports = Vec::new();
    let mut services = BTreeMap::new();

    for port in host.open_ports() {
        if !open_ports.contains(&port.port) {
            open_ports.push(port.port);
        }
        if let Some(name) = port.service_name() {
            services.entry(port.port).or_insert(name);
        }
    }

    NormalizedHost {
        ip: host.ip,
        hostname: host.hostname.clone(),
        os_guess: host.os_guess.clone(),
        open_ports,
        services,
    }
}

fn normalize_vuln(vuln: &VulnerabilityRecord) -> NormalizedVuln {
    let cvss_score = sanitize_score(vuln.metrics.base_score(), vuln.cve_id.as_deref());
    let severity = cvss_score.map_or(Severity::Info, Severity::from_cvss);

    let title = vuln
        .title
        .clone()
        .or_else(|| vuln.cve_id.clone())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let recommendation = vuln
        .recommendation
        .clone()
        .unwrap_or_else(|| default_recommendation(vuln.cve_id.as_deref()));

    NormalizedVuln {
        host: vuln.host_ip,
        port: vuln.port,
        title,
        cve_id: vuln.cve_id.clone(),
        severity,
        cvss_score,
        description: vuln
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        recommendation,
    }
}

/// Drop non-finite or out-of-range CVSS values.
fn sanitize_score(score: Option<f64>, cve_id: Option<&str>) -> Option<f64> {
    let score = score?;
    if !score.is_finite() || !(0.0..=10.0).contains(&score) {
        debug!(score, cve = cve_id.unwrap_or("-"), "ignoring out-of-range CVSS score");
        return None;
    }
    Some(score)
}

/// Remediation text for findings that did not ship their own.
pub fn default_recommendation(cve_id: Option<&str>) -> String {
    format!(
        "Apply security patches for {}. Update affected software to latest version.",
        cve_id.unwrap_or("Unknown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use vectormap_types::{HostAttackResults, PortRecord, PortState, SeverityMetrics};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn vuln_with_score_is_classified() {
        let snapshot = FindingsSnapshot {
            vulnerabilities: vec![VulnerabilityRecord::cve(ip(5), "CVE-X", 9.8).on_port(22)],
            ..Default::default()
        };
        let findings = normalize(&snapshot);
        let vuln = &findings.vulnerabilities[0];
        assert_eq!(vuln.title, "CVE-X");
        assert_eq!(vuln.severity, Severity::Critical);
        assert_eq!(vuln.score(), 9.8);
        assert_eq!(vuln.port, Some(22));
    }

    #[test]
    fn missing_score_defaults_to_info() {
        let snapshot = FindingsSnapshot {
            vulnerabilities: vec![VulnerabilityRecord::new(ip(5))],
            ..Default::default()
        };
        let vuln = &normalize(&snapshot).vulnerabilities[0];
        assert_eq!(vuln.cvss_score, None);
        assert_eq!(vuln.score(), 0.0);
        assert_eq!(vuln.severity, Severity::Info);
        assert_eq!(vuln.title, "Unknown vulnerability");
        assert_eq!(vuln.description, "No description");
        assert_eq!(
            vuln.recommendation,
            "Apply security patches for Unknown. Update affected software to latest version."
        );
    }

    #[test]
    fn out_of_range_scores_degrade_to_info() {
        for bad in [-3.0, 11.5, f64::NAN, f64::INFINITY] {
            let mut record = VulnerabilityRecord::new(ip(5));
            record.metrics = SeverityMetrics::with_base_score(bad);
            let snapshot = FindingsSnapshot {
                vulnerabilities: vec![record],
                ..Default::default()
            };
            let vuln = &normalize(&snapshot).vulnerabilities[0];
            assert_eq!(vuln.severity, Severity::Info, "score {bad}");
            assert_eq!(vuln.cvss_score, None);
        }
    }

    #[test]
    fn explicit_title_wins_over_cve() {
        let mut record = VulnerabilityRecord::cve(ip(5), "CVE-2021-41773", 7.5);
        record.title = Some("Apache path traversal".into());
        record.recommendation = Some("Upgrade to 2.4.51".into());
        let snapshot = FindingsSnapshot {
            vulnerabilities: vec![record],
            ..Default::default()
        };
        let vuln = &normalize(&snapshot).vulnerabilities[0];
        assert_eq!(vuln.title, "Apache path traversal");
        assert_eq!(vuln.cve_id.as_deref(), Some("CVE-2021-41773"));
        assert_eq!(vuln.recommendation, "Upgrade to 2.4.51");
    }

    #[test]
    fn host_keeps_open_ports_and_services() {
        let mut host = HostRecord::new(ip(7));
        host.ports.push(PortRecord::new(22).with_service("SSH"));
        host.ports.push(PortRecord::new(80).with_service("http"));
        let mut closed = PortRecord::new(3306).with_service("mysql");
        closed.state = PortState::Closed;
        host.ports.push(closed);

        let snapshot = FindingsSnapshot {
            hosts: vec![host],
            ..Default::default()
        };
        let host = &normalize(&snapshot).hosts[0];
        assert_eq!(host.open_ports, vec![22, 80]);
        assert_eq!(host.services.get(&22).map(String::as_str), Some("ssh"));
        assert!(!host.services.contains_key(&3306));
    }

    #[test]
    fn attempts_keep_success_flag_in_sorted_order() {
        let mut host_attacks = HostAttackResults::new();
        host_attacks.insert(
            "ssh_bruteforce".into(),
            AttackOutcome::succeeded().with_credentials("root", "root"),
        );
        host_attacks.insert("ftp_bruteforce".into(), AttackOutcome::failed("refused"));
        let mut snapshot = FindingsSnapshot::default();
        snapshot.attacks.insert(ip(9), host_attacks);

        let findings = normalize(&snapshot);
        let types: Vec<&str> = findings
            .attempts
            .iter()
            .map(|a| a.attack_type.as_str())
            .collect();
        assert_eq!(types, vec!["ftp_bruteforce", "ssh_bruteforce"]);
        assert!(!findings.attempts[0].succeeded());
        assert!(findings.attempts[1].succeeded());
        assert!(findings.attempts[1].recovered_credentials());
        assert_eq!(findings.successful_attempts().count(), 1);
    }
}
