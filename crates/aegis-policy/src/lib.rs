//! Role-based access policy for aegis-gateway.
//!
//! Maps a caller's role and the classified intent of their prompt onto an
//! action: allow the request through, allow it with forced sanitization, or
//! block it outright.
//!
//! # Evaluation Rules
//!
//! - An injection verdict dominates everything: the policy answer is Block
//!   no matter what the table says.
//! - Among matching rules, the highest priority wins.
//! - No matching rule means Block (default deny).
//!
//! The rule table is data, not code: it can be replaced wholesale from
//! configuration, and duplicate `(role, intent, priority)` entries are
//! rejected at load time rather than silently shadowed at evaluation time.

mod engine;
mod error;
mod rules;

pub use engine::{PolicyDecision, PolicyEngine};
pub use error::PolicyError;
pub use rules::{PolicyAction, PolicyRule, Role, RoleTable};
