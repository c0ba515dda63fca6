pub mod attack;
pub mod host;
pub mod port;
pub mod severity;
pub mod snapshot;
pub mod vuln;

pub use attack::{AttackOutcome, AttackResults, Credentials, HostAttackResults};
pub use host::HostRecord;
pub use port::{PortRecord, PortState, Protocol};
pub use severity::Severity;
pub use snapshot::FindingsSnapshot;
pub use vuln::{CvssData, CvssMetric, SeverityMetrics, VulnerabilityRecord};
