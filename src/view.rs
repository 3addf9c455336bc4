use serde_json::Value;

use crate::controller::RequestState;
use crate::model::RiskLevel;

/// Marker for fields the backend did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Render-ready summary section. Every field is already a display string;
/// the render layer must not re-derive anything from the model.
#[derive(PartialEq, Clone, Debug)]
pub struct SummaryFields {
    pub ip: String,
    pub hostname: String,
    pub isp: String,
    pub country: String,
    pub abuse_score: String,
    pub recent_reports: String,
    pub vpn_proxy: String,
    pub fraud_score: String,
}

#[derive(PartialEq, Clone, Debug)]
pub struct RiskFields {
    pub level: RiskLevel,
    pub color: &'static str,
    pub confidence: Option<String>,
    pub model: Option<String>,
    pub analysis: Option<String>,
    // None when the backend sent no recommendations, so the block is
    // omitted instead of rendered empty
    pub recommendations: Option<Vec<String>>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct RawSourcesFields {
    pub raw: Value,
}

impl RawSourcesFields {
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

/// Four-way severity partition. Exact hues are styling, the partition is
/// contract: keep this match exhaustive so new levels can't slip through
/// unmapped.
pub fn severity_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "#16a34a",
        RiskLevel::Medium => "#f97316",
        RiskLevel::High => "#dc2626",
        RiskLevel::Unknown => "#6b7280",
    }
}

fn opt_text(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// scores are integers in practice, so drop the ".0" they would otherwise
// render with
fn opt_number(v: Option<f64>) -> String {
    match v {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        Some(n) => n.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn project_summary(state: &RequestState) -> Option<SummaryFields> {
    let RequestState::Succeeded(r) = state else {
        return None;
    };
    Some(SummaryFields {
        ip: r.ip.clone(),
        hostname: opt_text(&r.hostname),
        isp: opt_text(&r.isp),
        country: opt_text(&r.country),
        abuse_score: opt_number(r.abuse_score),
        recent_reports: opt_number(r.recent_reports),
        vpn_proxy: if r.vpn_proxy == Some(true) { "Yes".to_string() } else { "No".to_string() },
        fraud_score: opt_number(r.fraud_score),
    })
}

pub fn project_risk(state: &RequestState) -> Option<RiskFields> {
    let RequestState::Succeeded(r) = state else {
        return None;
    };
    Some(RiskFields {
        level: r.risk_level,
        color: severity_color(r.risk_level),
        confidence: r.confidence.map(|c| format!("{:.1}%", c * 100.0)),
        model: r.model_used.clone(),
        analysis: r.risk_analysis.clone(),
        recommendations: if r.recommendations.is_empty() {
            None
        } else {
            Some(r.recommendations.clone())
        },
    })
}

pub fn project_raw_sources(state: &RequestState) -> Option<RawSourcesFields> {
    let RequestState::Succeeded(r) = state else {
        return None;
    };
    r.raw_sources.clone().map(|raw| RawSourcesFields { raw })
}

pub fn project_error(state: &RequestState) -> Option<String> {
    match state {
        RequestState::Failed(e) => Some(e.message.clone()),
        _ => None,
    }
}
