use serde::{Deserialize, Serialize};

use crate::attack::AttackResults;
use crate::host::HostRecord;
use crate::vuln::VulnerabilityRecord;

/// Everything the collaborators collected for one assessment run.
///
/// The snapshot is complete before analysis starts; nothing in it is
/// updated while the graph engine runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingsSnapshot {
    /// Target specification the scan was started with (IP, CIDR, hostname).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub hosts: Vec<HostRecord>,
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    #[serde(default)]
    pub attacks: AttackResults,
}

impl FindingsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.vulnerabilities.is_empty() && self.attacks.is_empty()
    }
}
