use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::port::PortRecord;

/// A host discovered by the reconnaissance phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub ip: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_guess: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortRecord>,
}

impl HostRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            hostname: None,
            os_guess: None,
            ports: Vec::new(),
        }
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(|p| p.is_open())
    }
}
