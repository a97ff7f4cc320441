//! Policy evaluation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use aegis_firewall::IntentLabel;

use crate::rules::{PolicyAction, Role, RoleTable};

/// The policy layer's answer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub action: PolicyAction,
    /// True when a table rule produced the action, false for the default
    /// deny and the injection override.
    pub rule_matched: bool,
    pub reason: String,
}

impl PolicyDecision {
    pub fn is_block(&self) -> bool {
        self.action == PolicyAction::Block
    }
}

/// Evaluates `(role, intent)` against a [`RoleTable`].
///
/// # Evaluation Rules
///
/// - A confirmed injection forces Block regardless of the table
/// - The highest-priority matching rule wins
/// - No matching rule means Block (default deny)
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    table: RoleTable,
}

impl PolicyEngine {
    /// Engine over the built-in table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: RoleTable) -> Self {
        Self { table }
    }

    /// Decide the action for one request.
    pub fn evaluate(
        &self,
        role: Role,
        intent: IntentLabel,
        injection_detected: bool,
    ) -> PolicyDecision {
        if injection_detected {
            debug!(%role, %intent, "policy override: injection detected");
            return PolicyDecision {
                action: PolicyAction::Block,
                rule_matched: false,
                reason: "prompt injection detected".to_string(),
            };
        }

        match self.table.lookup(role, intent) {
            Some(rule) => {
                debug!(%role, %intent, action = rule.action.as_str(), "policy rule matched");
                PolicyDecision {
                    action: rule.action,
                    rule_matched: true,
                    reason: format!("rule for role '{role}' and intent '{intent}'"),
                }
            }
            None => {
                debug!(%role, %intent, "no policy rule, default deny");
                PolicyDecision {
                    action: PolicyAction::Block,
                    rule_matched: false,
                    reason: format!("no rule permits intent '{intent}' for role '{role}'"),
                }
            }
        }
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_intent_blocked_for_guest() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(Role::Guest, IntentLabel::Admin, false);
        assert_eq!(decision.action, PolicyAction::Block);
        assert!(!decision.rule_matched);
        assert!(decision.reason.contains("guest"));
    }

    #[test]
    fn test_admin_intent_allowed_for_admin() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(Role::Admin, IntentLabel::Admin, false);
        assert_eq!(decision.action, PolicyAction::Allow);
        assert!(decision.rule_matched);
    }

    #[test]
    fn test_injection_dominates_allow_rule() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(Role::Admin, IntentLabel::Chat, true);
        assert_eq!(decision.action, PolicyAction::Block);
        assert!(!decision.rule_matched);
        assert!(decision.reason.contains("injection"));
    }

    #[test]
    fn test_user_tool_gets_sanitize() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(Role::User, IntentLabel::Tool, false);
        assert_eq!(decision.action, PolicyAction::AllowWithSanitize);
    }

    #[test]
    fn test_unknown_intent_sanitized_for_every_role() {
        let engine = PolicyEngine::new();
        for role in Role::ALL {
            let decision = engine.evaluate(role, IntentLabel::Unknown, false);
            assert_eq!(
                decision.action,
                PolicyAction::AllowWithSanitize,
                "role {role}"
            );
        }
    }

    #[test]
    fn test_guest_tool_default_denied() {
        let engine = PolicyEngine::new();
        let decision = engine.evaluate(Role::Guest, IntentLabel::Tool, false);
        assert!(decision.is_block());
    }
}
