pub mod normalize;
pub mod risk;
pub mod summary;

pub use normalize::{
    NormalizedAttempt, NormalizedFindings, NormalizedHost, NormalizedVuln, normalize,
};
pub use risk::overall_risk_score;
pub use summary::{
    AttackFinding, CriticalFinding, FindingsSummary, Priority, Recommendation, summarize,
};
