//! Policy layer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    /// Two rules share one `(role, intent, priority)` triple, making the
    /// winner order-dependent.
    #[error("duplicate policy rule for role '{role}', intent '{intent}', priority {priority}")]
    DuplicateRule {
        role: String,
        intent: String,
        priority: u32,
    },

    /// A role name in a configuration-supplied table is not recognized.
    #[error("unknown role: '{0}'")]
    UnknownRole(String),
}
