pub mod assessment;
pub mod engine;
pub mod traits;

pub use assessment::{Assessment, AssessmentStats, assess};
pub use engine::{ProbeConfig, ProbeEngine};
pub use tokio_util::sync::CancellationToken;
pub use traits::{AttackProbe, ProbeError};
