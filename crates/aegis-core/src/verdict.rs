//! Verdict types for gateway decisions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_firewall::IntentLabel;
use aegis_pii::PiiSummary;
use aegis_policy::PolicyAction;

use crate::risk::RiskScore;

/// Final disposition of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Forwarded unchanged.
    Allowed,
    /// Forwarded after sanitization of the prompt, the response, or both.
    AllowedSanitized,
    /// Refused; no model output reaches the caller.
    Blocked,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allowed => "allowed",
            Decision::AllowedSanitized => "allowed_sanitized",
            Decision::Blocked => "blocked",
        }
    }
}

/// Why a request was blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockReason {
    /// The prompt firewall confirmed an injection attempt.
    InjectionDetected {
        rule_id: Option<u32>,
        confidence: f64,
    },

    /// No policy rule permits this role/intent pair.
    PolicyDenied { role: String, intent: String },

    /// The composite risk score crossed the block threshold.
    RiskThreshold { score: u8, threshold: u8 },

    /// The model response leaked secrets and risk crossed the threshold.
    ResponseLeak { categories: Vec<String> },

    /// Upstream did not answer within the deadline.
    UpstreamTimeout { timeout_ms: u64 },

    /// Upstream failed after all retries.
    UpstreamUnavailable { detail: String },

    /// Prompt exceeds the intake size cap.
    PromptTooLarge { size: usize, max: usize },

    /// Prompt is empty after normalization.
    EmptyPrompt,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::InjectionDetected { rule_id, confidence } => match rule_id {
                Some(id) => write!(f, "prompt injection (rule {id}, confidence {confidence:.2})"),
                None => write!(f, "prompt injection (confidence {confidence:.2})"),
            },
            BlockReason::PolicyDenied { role, intent } => {
                write!(f, "policy denies intent '{intent}' for role '{role}'")
            }
            BlockReason::RiskThreshold { score, threshold } => {
                write!(f, "risk score {score} at or above threshold {threshold}")
            }
            BlockReason::ResponseLeak { categories } => {
                write!(f, "response leaked secrets: {}", categories.join(", "))
            }
            BlockReason::UpstreamTimeout { timeout_ms } => {
                write!(f, "upstream timed out after {timeout_ms}ms")
            }
            BlockReason::UpstreamUnavailable { detail } => {
                write!(f, "upstream unavailable: {detail}")
            }
            BlockReason::PromptTooLarge { size, max } => {
                write!(f, "prompt of {size} bytes exceeds cap of {max}")
            }
            BlockReason::EmptyPrompt => write!(f, "empty prompt"),
        }
    }
}

/// What the prompt firewall concluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCheck {
    /// `allowed` or `blocked`, from the firewall's point of view alone.
    pub decision: String,
    pub is_injection: bool,
    pub confidence: f64,
    /// The firewall ran without rules and could only fail safe.
    pub degraded: bool,
}

/// The complete security verdict for one request.
///
/// This is what gets audited; [`SecurityVerdict::envelope`] renders the
/// stable wire shape clients see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityVerdict {
    pub request_id: Uuid,
    pub decision: Decision,
    pub block_reason: Option<BlockReason>,
    pub intent: IntentLabel,
    pub risk: RiskScore,
    /// The action the policy layer chose.
    pub policy: PolicyAction,
    pub pii: PiiSummary,
    pub prompt_check: PromptCheck,
    /// The response guard rewrote the model output.
    pub response_filtered: bool,
    /// False when the audit append failed; the verdict still stands but
    /// is not in the ledger.
    pub audited: bool,
    /// Sanitized model output. `None` for blocked requests.
    pub response_text: Option<String>,
}

impl SecurityVerdict {
    pub fn is_blocked(&self) -> bool {
        self.decision == Decision::Blocked
    }

    pub fn is_allowed(&self) -> bool {
        !self.is_blocked()
    }

    /// The response guard's own disposition: `blocked` when a leak caused
    /// the block, `skipped` when an earlier stage blocked before the guard
    /// ran, `filtered` when it rewrote the output, `allowed` otherwise.
    pub fn response_guard_decision(&self) -> &'static str {
        match (&self.block_reason, self.response_filtered) {
            (Some(BlockReason::ResponseLeak { .. }), _) => "blocked",
            (Some(_), _) => "skipped",
            (None, true) => "filtered",
            (None, false) => "allowed",
        }
    }

    /// The stable envelope clients and the ledger see.
    ///
    /// Field layout is a compatibility surface; additions are fine,
    /// renames are not.
    pub fn envelope(&self) -> serde_json::Value {
        serde_json::json!({
            "request_id": self.request_id.to_string(),
            "security": {
                "intent": self.intent.as_str(),
                "risk_score": self.risk.score,
                "risk_band": self.risk.band.as_str(),
                "policy": self.policy.as_str(),
                "decision": self.decision.as_str(),
                "block_reason": self.block_reason.as_ref().map(|r| r.to_string()),
                "pii": {
                    "detected": self.pii.detected,
                    "count": self.pii.count,
                    "types": self.pii.types,
                    "original_length": self.pii.original_length,
                    "sanitized_length": self.pii.sanitized_length,
                },
                "prompt_check": {
                    "decision": self.prompt_check.decision,
                    "is_injection": self.prompt_check.is_injection,
                    "confidence": self.prompt_check.confidence,
                    "degraded": self.prompt_check.degraded,
                },
                "response_guard": {
                    "decision": self.response_guard_decision(),
                },
                "response_filtered": self.response_filtered,
                "audited": self.audited,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskScore;
    use aegis_pii::PiiSummary;

    fn sample_verdict() -> SecurityVerdict {
        SecurityVerdict {
            request_id: Uuid::new_v4(),
            decision: Decision::Blocked,
            block_reason: Some(BlockReason::InjectionDetected {
                rule_id: Some(1),
                confidence: 0.95,
            }),
            intent: IntentLabel::Unknown,
            risk: RiskScore::new(80),
            policy: aegis_policy::PolicyAction::Block,
            pii: PiiSummary::empty(42),
            prompt_check: PromptCheck {
                decision: "blocked".to_string(),
                is_injection: true,
                confidence: 0.95,
                degraded: false,
            },
            response_filtered: false,
            audited: true,
            response_text: None,
        }
    }

    #[test]
    fn test_envelope_shape() {
        let verdict = sample_verdict();
        let envelope = verdict.envelope();
        let security = &envelope["security"];

        assert_eq!(security["decision"], "blocked");
        assert_eq!(security["intent"], "unknown");
        assert_eq!(security["risk_score"], 80);
        assert_eq!(security["risk_band"], "high");
        assert_eq!(security["pii"]["detected"], false);
        assert_eq!(security["pii"]["count"], 0);
        assert_eq!(security["prompt_check"]["is_injection"], true);
        assert_eq!(security["response_guard"]["decision"], "skipped");
        assert_eq!(security["audited"], true);
    }

    #[test]
    fn test_response_guard_decision_per_outcome() {
        let mut verdict = sample_verdict();
        verdict.decision = Decision::AllowedSanitized;
        verdict.block_reason = None;
        verdict.response_filtered = true;
        assert_eq!(verdict.envelope()["security"]["response_guard"]["decision"], "filtered");

        verdict.decision = Decision::Allowed;
        verdict.response_filtered = false;
        assert_eq!(verdict.response_guard_decision(), "allowed");

        verdict.decision = Decision::Blocked;
        verdict.block_reason = Some(BlockReason::ResponseLeak {
            categories: vec!["api_key".to_string()],
        });
        assert_eq!(verdict.response_guard_decision(), "blocked");
    }

    #[test]
    fn test_block_reason_display() {
        let reason = BlockReason::InjectionDetected {
            rule_id: Some(3),
            confidence: 0.9,
        };
        assert_eq!(reason.to_string(), "prompt injection (rule 3, confidence 0.90)");

        let reason = BlockReason::PolicyDenied {
            role: "guest".to_string(),
            intent: "admin".to_string(),
        };
        assert!(reason.to_string().contains("guest"));
    }

    #[test]
    fn test_verdict_serialization_round_trip() {
        let verdict = sample_verdict();
        let json = serde_json::to_string(&verdict).unwrap();
        let back: SecurityVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verdict);
    }

    #[test]
    fn test_is_blocked() {
        let verdict = sample_verdict();
        assert!(verdict.is_blocked());
        assert!(!verdict.is_allowed());
    }
}
