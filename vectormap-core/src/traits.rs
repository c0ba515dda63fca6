use std::net::IpAddr;

use async_trait::async_trait;
use vectormap_types::{AttackOutcome, PortRecord};

/// An exploitation probe run against one open port of one host.
///
/// Implementations own the protocol mechanics (handshakes, credential lists,
/// payloads). The engine only schedules them and records their outcome.
#[async_trait]
pub trait AttackProbe: Send + Sync {
    /// Key the outcome is stored under, e.g. `"ssh_bruteforce"`.
    fn attack_type(&self) -> &str;

    /// Whether this probe should run against `port`.
    fn applies_to(&self, port: &PortRecord) -> bool;

    async fn run(&self, ip: IpAddr, port: u16) -> Result<AttackOutcome, ProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe timed out for host {host}")]
    Timeout { host: String },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
