//! Roles, rules, and the rule table.

use serde::{Deserialize, Serialize};

use aegis_firewall::IntentLabel;

use crate::error::PolicyError;

/// Caller role attached to each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Developer,
    User,
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Developer, Role::User, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "developer" => Ok(Role::Developer),
            "user" => Ok(Role::User),
            "guest" => Ok(Role::Guest),
            other => Err(PolicyError::UnknownRole(other.to_string())),
        }
    }
}

/// What the gateway should do with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Pass the request through unchanged.
    Allow,
    /// Pass it through, but force redaction of any detected PII.
    AllowWithSanitize,
    /// Refuse the request.
    Block,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Allow => "allow",
            PolicyAction::AllowWithSanitize => "allow_with_sanitize",
            PolicyAction::Block => "block",
        }
    }
}

/// One `(role, intent) -> action` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub role: Role,
    pub intent: IntentLabel,
    pub action: PolicyAction,
    /// Higher wins when several rules match.
    #[serde(default)]
    pub priority: u32,
}

impl PolicyRule {
    pub fn new(role: Role, intent: IntentLabel, action: PolicyAction) -> Self {
        Self {
            role,
            intent,
            action,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

/// The full rule set.
///
/// Anything not covered by a rule is denied, so the table only needs to
/// name what is permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<PolicyRule>", into = "Vec<PolicyRule>")]
pub struct RoleTable {
    rules: Vec<PolicyRule>,
}

impl RoleTable {
    /// Build a table, rejecting duplicate `(role, intent, priority)`
    /// triples.
    pub fn from_rules(rules: Vec<PolicyRule>) -> Result<Self, PolicyError> {
        for (i, a) in rules.iter().enumerate() {
            for b in &rules[i + 1..] {
                if a.role == b.role && a.intent == b.intent && a.priority == b.priority {
                    return Err(PolicyError::DuplicateRule {
                        role: a.role.to_string(),
                        intent: a.intent.to_string(),
                        priority: a.priority,
                    });
                }
            }
        }
        Ok(Self { rules })
    }

    /// The best matching rule for `(role, intent)`, if any.
    pub fn lookup(&self, role: Role, intent: IntentLabel) -> Option<&PolicyRule> {
        self.rules
            .iter()
            .filter(|r| r.role == role && r.intent == intent)
            .max_by_key(|r| r.priority)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RoleTable {
    /// The built-in table.
    ///
    /// | role      | chat | summarize | tool | admin | unknown |
    /// |-----------|------|-----------|------|-------|---------|
    /// | admin     | allow | allow | allow | allow | sanitize |
    /// | developer | allow | allow | allow | -     | sanitize |
    /// | user      | allow | allow | sanitize | -  | sanitize |
    /// | guest     | sanitize | - | -    | -     | sanitize |
    ///
    /// `-` means no rule, which the engine treats as Block.
    fn default() -> Self {
        use IntentLabel::*;
        use PolicyAction::*;

        let rules = vec![
            PolicyRule::new(Role::Admin, Chat, Allow),
            PolicyRule::new(Role::Admin, Summarize, Allow),
            PolicyRule::new(Role::Admin, Tool, Allow),
            PolicyRule::new(Role::Admin, Admin, Allow),
            PolicyRule::new(Role::Admin, Unknown, AllowWithSanitize),
            PolicyRule::new(Role::Developer, Chat, Allow),
            PolicyRule::new(Role::Developer, Summarize, Allow),
            PolicyRule::new(Role::Developer, Tool, Allow),
            PolicyRule::new(Role::Developer, Unknown, AllowWithSanitize),
            PolicyRule::new(Role::User, Chat, Allow),
            PolicyRule::new(Role::User, Summarize, Allow),
            PolicyRule::new(Role::User, Tool, AllowWithSanitize),
            PolicyRule::new(Role::User, Unknown, AllowWithSanitize),
            PolicyRule::new(Role::Guest, Chat, AllowWithSanitize),
            PolicyRule::new(Role::Guest, Unknown, AllowWithSanitize),
        ];

        // The built-in rules carry distinct (role, intent) pairs.
        Self { rules }
    }
}

impl TryFrom<Vec<PolicyRule>> for RoleTable {
    type Error = PolicyError;

    fn try_from(rules: Vec<PolicyRule>) -> Result<Self, Self::Error> {
        Self::from_rules(rules)
    }
}

impl From<RoleTable> for Vec<PolicyRule> {
    fn from(table: RoleTable) -> Self {
        table.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_table_lookups() {
        let table = RoleTable::default();
        assert_eq!(
            table.lookup(Role::Admin, IntentLabel::Admin).map(|r| r.action),
            Some(PolicyAction::Allow)
        );
        assert_eq!(
            table.lookup(Role::Guest, IntentLabel::Admin).map(|r| r.action),
            None
        );
        assert_eq!(
            table.lookup(Role::User, IntentLabel::Unknown).map(|r| r.action),
            Some(PolicyAction::AllowWithSanitize)
        );
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let rules = vec![
            PolicyRule::new(Role::User, IntentLabel::Chat, PolicyAction::Allow),
            PolicyRule::new(Role::User, IntentLabel::Chat, PolicyAction::Block),
        ];
        assert!(matches!(
            RoleTable::from_rules(rules),
            Err(PolicyError::DuplicateRule { .. })
        ));
    }

    #[test]
    fn test_same_pair_distinct_priority_allowed() {
        let rules = vec![
            PolicyRule::new(Role::User, IntentLabel::Chat, PolicyAction::Allow),
            PolicyRule::new(Role::User, IntentLabel::Chat, PolicyAction::Block).with_priority(10),
        ];
        let table = RoleTable::from_rules(rules).unwrap();
        // Higher priority wins.
        assert_eq!(
            table.lookup(Role::User, IntentLabel::Chat).map(|r| r.action),
            Some(PolicyAction::Block)
        );
    }

    #[test]
    fn test_table_deserializes_from_rule_list() {
        let json = r#"[
            {"role": "guest", "intent": "chat", "action": "allow_with_sanitize"}
        ]"#;
        let table: RoleTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(Role::Guest, IntentLabel::Chat).map(|r| r.action),
            Some(PolicyAction::AllowWithSanitize)
        );
    }

    #[test]
    fn test_table_rejects_duplicates_during_deserialize() {
        let json = r#"[
            {"role": "user", "intent": "chat", "action": "allow"},
            {"role": "user", "intent": "chat", "action": "block"}
        ]"#;
        assert!(serde_json::from_str::<RoleTable>(json).is_err());
    }
}
