use crate::normalize::NormalizedVuln;

/// Compute the overall posture score (0.0-10.0) for one run.
///
/// Each finding contributes `severity weight * CVSS score`, where an unscored
/// (or zero-scored) finding counts as 1.0. The mean is capped at 10.0.
/// Independent of the attack graph.
pub fn overall_risk_score(vulns: &[NormalizedVuln]) -> f64 {
    if vulns.is_empty() {
        return 0.0;
    }

    let total: f64 = vulns
        .iter()
        .map(|v| {
            let score = v.cvss_score.filter(|s| *s > 0.0).unwrap_or(1.0);
            v.severity.risk_weight() * score
        })
        .sum();

    (total / vulns.len() as f64).clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};
    use vectormap_types::Severity;

    fn vuln(score: Option<f64>) -> NormalizedVuln {
        NormalizedVuln {
            host: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            port: None,
            title: "test".into(),
            cve_id: None,
            severity: score.map_or(Severity::Info, Severity::from_cvss),
            cvss_score: score,
            description: String::new(),
            recommendation: String::new(),
        }
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(overall_risk_score(&[]), 0.0);
    }

    #[test]
    fn single_unscored_finding() {
        // INFO weight 1.0 * default score 1.0
        assert_eq!(overall_risk_score(&[vuln(None)]), 1.0);
        assert_eq!(overall_risk_score(&[vuln(Some(0.0))]), 1.0);
    }

    #[test]
    fn low_findings_stay_below_cap() {
        // LOW weight 2.5 * 2.0 = 5.0, INFO 1.0 * 1.0 = 1.0 -> mean 3.0
        let score = overall_risk_score(&[vuln(Some(2.0)), vuln(None)]);
        assert!((score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn critical_findings_hit_the_cap() {
        assert_eq!(overall_risk_score(&[vuln(Some(9.8))]), 10.0);
    }

    proptest! {
        #[test]
        fn score_is_bounded(scores in proptest::collection::vec(proptest::option::of(0.0f64..=10.0), 1..40)) {
            let vulns: Vec<_> = scores.into_iter().map(vuln).collect();
            let risk = overall_risk_score(&vulns);
            prop_assert!((0.0..=10.0).contains(&risk));
        }
    }
}
