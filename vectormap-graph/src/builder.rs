// ---------------------------------------------------------------------------
// Graph builder
// ---------------------------------------------------------------------------
//
// Populates a fresh `AttackGraph` from normalized findings: hosts, then their
// vulnerabilities, then the successful exploitation attempts, then the
// relatedness edges between vulnerabilities.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vectormap_findings::{NormalizedFindings, NormalizedVuln};

use crate::graph::{AttackGraph, EdgeWeight, NodeIndex};
use crate::node::{Node, NodeId};

/// Host -> vulnerability it exposes.
const HOST_TO_VULN: EdgeWeight = EdgeWeight(0.5);
/// Successful attempt -> host it compromised.
const ATTEMPT_TO_HOST: EdgeWeight = EdgeWeight(0.8);
/// Vulnerability -> related vulnerability.
const RELATED_VULN: EdgeWeight = EdgeWeight(0.6);

/// Which way relatedness edges between two vulnerabilities point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatednessEdges {
    /// One edge, from the earlier vulnerability to the later one.
    #[default]
    Forward,
    /// Edges in both directions.
    Bidirectional,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    relatedness: RelatednessEdges,
}

impl GraphBuilder {
    pub fn new(relatedness: RelatednessEdges) -> Self {
        Self { relatedness }
    }

    pub fn build(&self, findings: &NormalizedFindings) -> AttackGraph {
        let mut graph = AttackGraph::new();

        for host in &findings.hosts {
            graph.add_node(Node::host(host.clone()));
        }

        let mut vuln_nodes: Vec<NodeIndex> = Vec::with_capacity(findings.vulnerabilities.len());
        for vuln in &findings.vulnerabilities {
            let idx = graph.add_node(Node::vulnerability(vuln.clone()));
            if !vuln_nodes.contains(&idx) {
                vuln_nodes.push(idx);
            }
            match graph.find(&NodeId::host(vuln.host)) {
                Some(host) => {
                    graph.add_edge(host, idx, HOST_TO_VULN);
                }
                None => debug!(host = %vuln.host, title = %vuln.title, "vulnerability without host node"),
            }
        }

        for attempt in findings.successful_attempts() {
            let idx = graph.add_node(Node::attempt(attempt.clone()));
            match graph.find(&NodeId::host(attempt.host)) {
                Some(host) => {
                    graph.add_edge(idx, host, ATTEMPT_TO_HOST);
                }
                None => debug!(
                    host = %attempt.host,
                    attack_type = %attempt.attack_type,
                    "attack attempt without host node"
                ),
            }
        }

        self.link_related(&mut graph, &vuln_nodes);

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "attack graph built"
        );
        graph
    }

    fn link_related(&self, graph: &mut AttackGraph, vulns: &[NodeIndex]) {
        for (i, &a) in vulns.iter().enumerate() {
            for &b in &vulns[i + 1..] {
                let related = match (
                    graph.node(a).as_vulnerability(),
                    graph.node(b).as_vulnerability(),
                ) {
                    (Some(va), Some(vb)) => are_related(va, vb),
                    _ => false,
                };
                if !related {
                    continue;
                }
                graph.add_edge(a, b, RELATED_VULN);
                if self.relatedness == RelatednessEdges::Bidirectional {
                    graph.add_edge(b, a, RELATED_VULN);
                }
            }
        }
    }
}

/// Two vulnerabilities are related when they sit on the same host, or both
/// carry the same CVE id.
pub fn are_related(a: &NormalizedVuln, b: &NormalizedVuln) -> bool {
    if a.host == b.host {
        return true;
    }
    matches!((&a.cve_id, &b.cve_id), (Some(x), Some(y)) if x == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use std::net::{IpAddr, Ipv4Addr};
    use vectormap_findings::normalize;
    use vectormap_types::{
        AttackOutcome, FindingsSnapshot, HostAttackResults, HostRecord, PortRecord,
        VulnerabilityRecord,
    };

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn weight(graph: &AttackGraph, from: &NodeId, to: &NodeId) -> Option<f64> {
        let from = graph.find(from)?;
        let to = graph.find(to)?;
        graph.edge_weight(from, to).map(EdgeWeight::get)
    }

    fn vuln_id(host: u8, port: Option<u16>, title: &str) -> NodeId {
        let mut record = VulnerabilityRecord::new(ip(host));
        record.port = port;
        record.title = Some(title.into());
        let findings = normalize(&FindingsSnapshot {
            vulnerabilities: vec![record],
            ..Default::default()
        });
        NodeId::vulnerability(&findings.vulnerabilities[0])
    }

    #[test]
    fn ownership_edges() {
        let mut host = HostRecord::new(ip(5));
        host.ports.push(PortRecord::new(22).with_service("ssh"));
        let mut attacks = HostAttackResults::new();
        attacks.insert(
            "ssh_bruteforce".into(),
            AttackOutcome::succeeded().with_credentials("root", "root"),
        );
        let mut snapshot = FindingsSnapshot {
            hosts: vec![host],
            vulnerabilities: vec![VulnerabilityRecord::cve(ip(5), "CVE-X", 9.8).on_port(22)],
            ..Default::default()
        };
        snapshot.attacks.insert(ip(5), attacks);

        let graph = GraphBuilder::default().build(&normalize(&snapshot));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let host = NodeId::host(ip(5));
        let attempt = NodeId::attempt(ip(5), "ssh_bruteforce");
        let vuln = vuln_id(5, Some(22), "CVE-X");
        assert_eq!(weight(&graph, &attempt, &host), Some(0.8));
        assert_eq!(weight(&graph, &host, &vuln), Some(0.5));
        assert_eq!(weight(&graph, &vuln, &host), None);
    }

    #[test]
    fn failed_attempts_are_not_nodes() {
        let mut attacks = HostAttackResults::new();
        attacks.insert("ftp_bruteforce".into(), AttackOutcome::failed("refused"));
        attacks.insert("telnet_default".into(), AttackOutcome::default());
        let mut snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip(5))],
            ..Default::default()
        };
        snapshot.attacks.insert(ip(5), attacks);

        let graph = GraphBuilder::default().build(&normalize(&snapshot));
        assert_eq!(graph.node_count(), 1);
        assert!(
            graph
                .nodes()
                .all(|(_, n)| n.kind() != NodeKind::AttackAttempt)
        );
    }

    #[test]
    fn missing_host_drops_edge_not_node() {
        let snapshot = FindingsSnapshot {
            vulnerabilities: vec![VulnerabilityRecord::cve(ip(9), "CVE-ORPHAN", 8.0)],
            ..Default::default()
        };
        let graph = GraphBuilder::default().build(&normalize(&snapshot));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn attempt_without_host_keeps_node_without_edges() {
        let mut attacks = HostAttackResults::new();
        attacks.insert("ssh_bruteforce".into(), AttackOutcome::succeeded());
        let mut snapshot = FindingsSnapshot::default();
        snapshot.attacks.insert(ip(9), attacks);

        let findings = normalize(&snapshot);
        let graph = GraphBuilder::default().build(&findings);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        let attempt = graph
            .find(&NodeId::attempt(ip(9), "ssh_bruteforce"))
            .expect("attempt node");
        assert_eq!(graph.node(attempt).kind(), NodeKind::AttackAttempt);

        let analysis = crate::analysis::AttackAnalyzer::default().analyze(&findings);
        assert!(analysis.vectors.is_empty());
    }

    #[test]
    fn distinct_cves_sharing_a_title_stay_separate() {
        let mut critical = VulnerabilityRecord::cve(ip(5), "CVE-2024-6387", 9.8).on_port(22);
        critical.title = Some("OpenSSH vulnerability".into());
        let mut medium = VulnerabilityRecord::cve(ip(5), "CVE-2023-51385", 5.0).on_port(22);
        medium.title = Some("OpenSSH vulnerability".into());
        let mut attacks = HostAttackResults::new();
        attacks.insert("ssh_bruteforce".into(), AttackOutcome::succeeded());
        let mut snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip(5))],
            vulnerabilities: vec![critical, medium],
            ..Default::default()
        };
        snapshot.attacks.insert(ip(5), attacks);

        let findings = normalize(&snapshot);
        let graph = GraphBuilder::default().build(&findings);
        let vulns: Vec<_> = graph
            .nodes()
            .filter_map(|(_, n)| n.as_vulnerability())
            .collect();
        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].cvss_score, Some(9.8));

        let vectors = crate::analysis::AttackAnalyzer::default()
            .analyze(&findings)
            .vectors;
        assert!(
            vectors
                .iter()
                .any(|v| v.path.last() == Some(&NodeId::vulnerability(&findings.vulnerabilities[0])))
        );
    }

    #[test]
    fn same_cve_on_two_hosts_is_related() {
        let snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip(1)), HostRecord::new(ip(2))],
            vulnerabilities: vec![
                VulnerabilityRecord::cve(ip(1), "CVE-2024-1", 5.0),
                VulnerabilityRecord::cve(ip(2), "CVE-2024-1", 5.0),
            ],
            ..Default::default()
        };
        let graph = GraphBuilder::default().build(&normalize(&snapshot));
        let a = vuln_id(1, None, "CVE-2024-1");
        let b = vuln_id(2, None, "CVE-2024-1");
        assert_eq!(weight(&graph, &a, &b), Some(0.6));
        assert_eq!(weight(&graph, &b, &a), None);
    }

    #[test]
    fn bidirectional_relatedness() {
        let snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip(1))],
            vulnerabilities: vec![
                VulnerabilityRecord::cve(ip(1), "CVE-A", 5.0),
                VulnerabilityRecord::cve(ip(1), "CVE-B", 6.0),
            ],
            ..Default::default()
        };
        let graph =
            GraphBuilder::new(RelatednessEdges::Bidirectional).build(&normalize(&snapshot));
        let a = vuln_id(1, None, "CVE-A");
        let b = vuln_id(1, None, "CVE-B");
        assert_eq!(weight(&graph, &a, &b), Some(0.6));
        assert_eq!(weight(&graph, &b, &a), Some(0.6));
    }

    #[test]
    fn missing_cve_ids_are_not_related_across_hosts() {
        let findings = normalize(&FindingsSnapshot {
            vulnerabilities: vec![
                VulnerabilityRecord::new(ip(1)),
                VulnerabilityRecord::new(ip(2)),
            ],
            ..Default::default()
        });
        assert!(!are_related(
            &findings.vulnerabilities[0],
            &findings.vulnerabilities[1]
        ));
    }

    #[test]
    fn duplicate_vulnerability_is_one_node() {
        let snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip(1))],
            vulnerabilities: vec![
                VulnerabilityRecord::cve(ip(1), "CVE-A", 5.0),
                VulnerabilityRecord::cve(ip(1), "CVE-A", 8.0),
            ],
            ..Default::default()
        };
        let graph = GraphBuilder::default().build(&normalize(&snapshot));
        assert_eq!(graph.node_count(), 2);
        // no self edge from relatedness
        assert_eq!(graph.edge_count(), 1);
        let vuln = graph.find(&vuln_id(1, None, "CVE-A")).unwrap();
        assert_eq!(graph.node(vuln).as_vulnerability().unwrap().score(), 8.0);
    }
}
