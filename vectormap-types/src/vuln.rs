// ---------------------------------------------------------------------------
// Vulnerability match records
// ---------------------------------------------------------------------------
//
// Shapes follow the NVD 2.0 JSON feed closely enough that a matcher can copy
// the `metrics` object across untouched.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// CVSS data block of a single metric entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvssData {
    #[serde(rename = "baseScore", default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,
    #[serde(
        rename = "vectorString",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vector_string: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvssMetric {
    #[serde(rename = "cvssData", default)]
    pub cvss_data: CvssData,
}

/// Nested severity metrics attached to a vulnerability match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityMetrics {
    #[serde(rename = "cvssMetricV3", default, skip_serializing_if = "Vec::is_empty")]
    pub cvss_v3: Vec<CvssMetric>,
}

impl SeverityMetrics {
    /// Metrics holding a single CVSS v3 base score.
    pub fn with_base_score(score: f64) -> Self {
        Self {
            cvss_v3: vec![CvssMetric {
                cvss_data: CvssData {
                    base_score: Some(score),
                    vector_string: None,
                },
            }],
        }
    }

    /// Base score of the primary CVSS v3 metric, if present.
    pub fn base_score(&self) -> Option<f64> {
        self.cvss_v3.first().and_then(|m| m.cvss_data.base_score)
    }
}

/// A vulnerability matched against a service on a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub host_ip: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub metrics: SeverityMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl VulnerabilityRecord {
    pub fn new(host_ip: IpAddr) -> Self {
        Self {
            host_ip,
            port: None,
            cve_id: None,
            title: None,
            metrics: SeverityMetrics::default(),
            description: None,
            recommendation: None,
        }
    }

    /// Shorthand used heavily in tests and fixtures.
    pub fn cve(host_ip: IpAddr, cve_id: impl Into<String>, score: f64) -> Self {
        Self {
            cve_id: Some(cve_id.into()),
            metrics: SeverityMetrics::with_base_score(score),
            ..Self::new(host_ip)
        }
    }

    pub fn on_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}
