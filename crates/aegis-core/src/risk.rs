//! Composite risk scoring.
//!
//! Each pipeline stage contributes a bounded component; the total is the
//! clamped sum. Components only ever add, so the score is monotonic in the
//! evidence: more findings never lower it.
//!
//! | Component | Maximum |
//! |-----------|---------|
//! | Injection confidence | 40 |
//! | PII findings | 30 |
//! | Policy block | 20 |
//! | Response filtered | 15 |
//! | Degraded detection | 10 |

use serde::{Deserialize, Serialize};

use aegis_pii::PiiMatch;

/// Ceiling for the injection component.
const INJECTION_WEIGHT: f64 = 40.0;
/// Ceiling for the PII component.
const PII_CEILING: u32 = 30;
/// Flat cost of a policy block.
const POLICY_BLOCK_WEIGHT: u8 = 20;
/// Flat cost of a filtered response.
const RESPONSE_FILTER_WEIGHT: u8 = 15;
/// Flat cost of running with a degraded detector.
const DEGRADED_WEIGHT: u8 = 10;

/// Qualitative banding of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskBand::Low,
            30..=69 => RiskBand::Medium,
            _ => RiskBand::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

/// A composite score in `0..=100` with its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u8,
    pub band: RiskBand,
}

impl RiskScore {
    pub fn new(score: u8) -> Self {
        let score = score.min(100);
        Self {
            score,
            band: RiskBand::from_score(score),
        }
    }

    pub fn zero() -> Self {
        Self::new(0)
    }

    /// Raise the score to `min` when it is below; a higher score is kept.
    ///
    /// A confirmed injection must always register at or above the configured
    /// block threshold whatever the weighted components sum to.
    pub fn floor_at(self, min: u8) -> Self {
        if self.score >= min {
            self
        } else {
            Self::new(min)
        }
    }
}

/// Evidence gathered across the pipeline for one request.
#[derive(Debug, Clone, Default)]
pub struct RiskInputs<'a> {
    /// Injection confidence in `0.0..=1.0`.
    pub injection_confidence: f64,
    /// PII spans found in the prompt.
    pub prompt_matches: &'a [PiiMatch],
    /// The policy layer blocked the request.
    pub policy_blocked: bool,
    /// The response guard rewrote the model output.
    pub response_filtered: bool,
    /// Some detector ran degraded.
    pub degraded: bool,
}

/// Compute the composite score.
pub fn assess(inputs: &RiskInputs<'_>) -> RiskScore {
    let mut total: u32 = 0;

    let confidence = inputs.injection_confidence.clamp(0.0, 1.0);
    total += (confidence * INJECTION_WEIGHT).round() as u32;

    let pii: u32 = inputs
        .prompt_matches
        .iter()
        .map(|m| u32::from(m.category.risk_weight()))
        .sum();
    total += pii.min(PII_CEILING);

    if inputs.policy_blocked {
        total += u32::from(POLICY_BLOCK_WEIGHT);
    }
    if inputs.response_filtered {
        total += u32::from(RESPONSE_FILTER_WEIGHT);
    }
    if inputs.degraded {
        total += u32::from(DEGRADED_WEIGHT);
    }

    RiskScore::new(total.min(100) as u8)
}
