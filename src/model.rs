use std::fmt;

use serde::Deserializer;
use serde_derive::Deserialize;
use serde_json::Value;

/// Severity category assigned by the backend's risk assessment.
/// Anything the backend sends outside the three known levels, including
/// an absent field, maps to Unknown.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl<'de> serde::Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "Low" => RiskLevel::Low,
            "Medium" => RiskLevel::Medium,
            "High" => RiskLevel::High,
            &_ => RiskLevel::Unknown,
        })
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        })
    }
}

/// One parsed analyze-ip response. Every field beyond `ip` is optional;
/// absence is preserved as None and never collapsed to zero or "".
/// A new submission replaces the whole value, fields are never patched
/// in place.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AnalysisResult {
    pub ip: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub abuse_score: Option<f64>,
    #[serde(default)]
    pub recent_reports: Option<f64>,
    #[serde(default)]
    pub vpn_proxy: Option<bool>,
    #[serde(default)]
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_analysis: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    // opaque per-source payloads, passed through verbatim for display
    #[serde(default)]
    pub raw_sources: Option<Value>,
}

pub fn parse_analysis(body: &str) -> Result<AnalysisResult, serde_json::Error> {
    serde_json::from_str(body)
}
