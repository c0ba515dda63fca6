use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use vectormap_findings::{NormalizedAttempt, NormalizedHost, NormalizedVuln};
use vectormap_types::Severity;

/// Stable, content-derived node identifier.
///
/// Keys are plain composites so two builds from the same findings agree:
///
/// - `host:{ip}`
/// - `vuln:{ip}:{port or "-"}:{cve_id, else title}`
/// - `attack:{ip}:{attack_type}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn host(ip: IpAddr) -> Self {
        Self(format!("host:{ip}"))
    }

    pub fn vulnerability(vuln: &NormalizedVuln) -> Self {
        let port = vuln
            .port
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let key = vuln.cve_id.as_deref().unwrap_or(&vuln.title);
        Self(format!("vuln:{}:{port}:{key}", vuln.host))
    }

    pub fn attempt(host: IpAddr, attack_type: &str) -> Self {
        Self(format!("attack:{host}:{attack_type}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Host,
    Vulnerability,
    AttackAttempt,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Host => write!(f, "host"),
            NodeKind::Vulnerability => write!(f, "vulnerability"),
            NodeKind::AttackAttempt => write!(f, "attack_attempt"),
        }
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    Host(NormalizedHost),
    Vulnerability(NormalizedVuln),
    AttackAttempt(NormalizedAttempt),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub data: NodeData,
}

impl Node {
    pub fn host(host: NormalizedHost) -> Self {
        Self {
            id: NodeId::host(host.ip),
            data: NodeData::Host(host),
        }
    }

    pub fn vulnerability(vuln: NormalizedVuln) -> Self {
        Self {
            id: NodeId::vulnerability(&vuln),
            data: NodeData::Vulnerability(vuln),
        }
    }

    pub fn attempt(attempt: NormalizedAttempt) -> Self {
        Self {
            id: NodeId::attempt(attempt.host, &attempt.attack_type),
            data: NodeData::AttackAttempt(attempt),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Host(_) => NodeKind::Host,
            NodeData::Vulnerability(_) => NodeKind::Vulnerability,
            NodeData::AttackAttempt(_) => NodeKind::AttackAttempt,
        }
    }

    /// The host this node belongs to (its own IP for host nodes).
    pub fn host_ip(&self) -> IpAddr {
        match &self.data {
            NodeData::Host(h) => h.ip,
            NodeData::Vulnerability(v) => v.host,
            NodeData::AttackAttempt(a) => a.host,
        }
    }

    pub fn as_vulnerability(&self) -> Option<&NormalizedVuln> {
        match &self.data {
            NodeData::Vulnerability(v) => Some(v),
            _ => None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.as_vulnerability().map(|v| v.severity)
    }

    /// Short human label used for vector endpoints and graph rendering.
    pub fn label(&self) -> String {
        match &self.data {
            NodeData::Host(h) => h.ip.to_string(),
            NodeData::Vulnerability(v) => v.title.clone(),
            NodeData::AttackAttempt(a) => format!("Successful {}", a.attack_type),
        }
    }
}
