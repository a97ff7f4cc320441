//! Core types shared by the firewall components.

use serde::{Deserialize, Serialize};

/// Verdict produced by the [`InjectionDetector`](crate::InjectionDetector).
///
/// `confidence` is the aggregate rule weight in `0.0..=1.0`. When a single
/// rule short-circuits evaluation, `confidence` is that rule's weight and
/// `matched_rule_id` identifies it; when several weaker rules accumulate past
/// the block threshold, `matched_rule_id` is the first (lowest-id) match.
///
/// `degraded` marks a verdict produced without a usable rule table. The
/// detector fails safe (`is_injection = false`) but the flag must reach the
/// risk scorer - a missing signal is itself a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionVerdict {
    /// True if the aggregate confidence crossed the block threshold.
    pub is_injection: bool,

    /// Aggregate confidence in `0.0..=1.0`.
    pub confidence: f64,

    /// Id of the decisive rule, if any rule matched.
    pub matched_rule_id: Option<u32>,

    /// True if the detector could not evaluate (empty rule table).
    pub degraded: bool,
}

impl InjectionVerdict {
    /// A verdict for a prompt with no matching rules.
    pub fn clean() -> Self {
        Self {
            is_injection: false,
            confidence: 0.0,
            matched_rule_id: None,
            degraded: false,
        }
    }

    /// The fail-safe verdict returned when no rules are available.
    pub fn degraded() -> Self {
        Self {
            is_injection: false,
            confidence: 0.0,
            matched_rule_id: None,
            degraded: true,
        }
    }
}

/// The closed set of prompt intents recognized by the gateway.
///
/// `Unknown` is returned when no vocabulary clears the minimum match
/// threshold; the policy table decides what unknown intent is worth for a
/// given role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    /// Conversational request.
    Chat,
    /// Summarization or condensation request.
    Summarize,
    /// Tool or function invocation request.
    Tool,
    /// Administrative or privileged request.
    Admin,
    /// No vocabulary matched with sufficient weight.
    Unknown,
}

impl IntentLabel {
    /// All labels in classification precedence order (ties resolve to the
    /// earliest label).
    pub const ALL: [IntentLabel; 5] = [
        IntentLabel::Chat,
        IntentLabel::Summarize,
        IntentLabel::Tool,
        IntentLabel::Admin,
        IntentLabel::Unknown,
    ];

    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::Chat => "chat",
            IntentLabel::Summarize => "summarize",
            IntentLabel::Tool => "tool",
            IntentLabel::Admin => "admin",
            IntentLabel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntentLabel {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(IntentLabel::Chat),
            "summarize" => Ok(IntentLabel::Summarize),
            "tool" => Ok(IntentLabel::Tool),
            "admin" => Ok(IntentLabel::Admin),
            "unknown" => Ok(IntentLabel::Unknown),
            other => Err(UnknownIntent(other.to_string())),
        }
    }
}

/// Error returned when parsing an intent label from a string.
#[derive(Debug, thiserror::Error)]
#[error("unknown intent label: {0}")]
pub struct UnknownIntent(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_verdict() {
        let v = InjectionVerdict::clean();
        assert!(!v.is_injection);
        assert_eq!(v.confidence, 0.0);
        assert!(v.matched_rule_id.is_none());
        assert!(!v.degraded);
    }

    #[test]
    fn test_degraded_verdict_fails_safe() {
        let v = InjectionVerdict::degraded();
        assert!(!v.is_injection);
        assert!(v.degraded);
    }

    #[test]
    fn test_intent_label_round_trip() {
        for label in IntentLabel::ALL {
            let parsed: IntentLabel = label.as_str().parse().unwrap();
            assert_eq!(parsed, label);
        }
    }

    #[test]
    fn test_intent_label_serde_lowercase() {
        let json = serde_json::to_string(&IntentLabel::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }

    #[test]
    fn test_verdict_serialization() {
        let v = InjectionVerdict {
            is_injection: true,
            confidence: 0.95,
            matched_rule_id: Some(1),
            degraded: false,
        };
        let json = serde_json::to_string(&v).unwrap();
        let parsed: InjectionVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, v);
    }
}
