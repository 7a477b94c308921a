//! Risk output types: tiers, timelines, and the scored account record.

use serde::{Deserialize, Serialize};

/// Discretized churn risk.
///
/// Thresholds are fixed constants of the product, not per-call knobs:
/// probability >= 0.50 is High, >= 0.35 is Medium, anything lower is Low.
/// Boundary values resolve to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

pub const HIGH_RISK_THRESHOLD: f64 = 0.50;
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.35;

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::High => "High",
            RiskTier::Medium => "Medium",
            RiskTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected churn window, derived from the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnTimeline {
    /// 0–90 days.
    Imminent,
    /// 3–6 months.
    NearTerm,
    /// 6–12 months.
    LongTerm,
}

impl ChurnTimeline {
    pub fn from_tier(tier: RiskTier) -> Self {
        match tier {
            RiskTier::High => ChurnTimeline::Imminent,
            RiskTier::Medium => ChurnTimeline::NearTerm,
            RiskTier::Low => ChurnTimeline::LongTerm,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChurnTimeline::Imminent => "0–90 days",
            ChurnTimeline::NearTerm => "3–6 months",
            ChurnTimeline::LongTerm => "6–12 months",
        }
    }
}

impl std::fmt::Display for ChurnTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully scored account, immutable once produced.
///
/// Context columns are `Option` because they are only projected into the
/// output when the corresponding column existed in the mapped input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAccount {
    pub account_id: String,
    pub plan_tier: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub seats_current: Option<f64>,
    pub arr_current: Option<f64>,
    /// Model probability in [0, 1].
    pub churn_probability: f64,
    /// round(probability * 100).
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub churn_timeline: ChurnTimeline,
    /// Up to three rule-derived drivers, highest priority first.
    pub top_drivers: Vec<String>,
    /// Up to three recommended actions matching the drivers.
    pub recommended_actions: Vec<String>,
}
