//! # Aegis Gateway Core
//!
//! Unified security gateway for LLM traffic. Every prompt passes through a
//! layered pipeline before it may reach the upstream model, and every model
//! response is screened before it may reach the caller.
//!
//! ## Threat Coverage
//!
//! | Layer | Component | Threats Addressed |
//! |-------|-----------|-------------------|
//! | Prompt | Injection firewall | Instruction override, jailbreaks, prompt extraction |
//! | Prompt | PII sanitizer | Credential and PII exfiltration via prompts |
//! | Access | Role policy | Privilege escalation, out-of-role operations |
//! | Response | Response guard | Secret leakage in model output |
//! | Audit | Hash-chained ledger | Silent tampering with the security record |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        AEGIS GATEWAY                           │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │   request ──► intake ──► firewall ──► intent ──► policy        │
//! │                                                     │          │
//! │                           ┌─────────────────────────┘          │
//! │                           ▼                                    │
//! │                     pii sanitize ──► risk gate ──► upstream    │
//! │                                                      │         │
//! │   caller ◄── verdict ◄── risk ◄── response guard ◄───┘         │
//! │                 │                                              │
//! │                 ▼                                              │
//! │           audit ledger (hash chain)                            │
//! │                                                                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aegis_core::{Gateway, GatewayConfig, Request, Role};
//!
//! let gateway = Gateway::with_echo_model(GatewayConfig::default())?;
//!
//! let request = Request::new("Summarize this document", Role::User);
//! let verdict = gateway.process(&request).await?;
//!
//! if verdict.is_allowed() {
//!     println!("{}", verdict.response_text.unwrap_or_default());
//! }
//! ```
//!
//! ## Security Notes
//!
//! - Stages run in a fixed order; the earliest blocking stage decides
//! - The pipeline is fail-closed: upstream loss and degraded detection
//!   lean toward Block, never toward Allow
//! - Only sanitized text crosses the gateway boundary, in both directions
//! - Every terminal verdict is appended to the tamper-evident ledger

mod config;
mod error;
mod gateway;
mod model;
mod request;
pub mod risk;
mod verdict;

pub use config::{
    AuditConfig, FirewallConfig, GatewayConfig, PiiConfig, PolicyConfig, RiskConfig,
    UpstreamConfig,
};
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use model::{EchoModel, ModelClient, ModelError};
pub use request::{normalize_prompt, ModelParams, Request, MAX_PROMPT_BYTES};
pub use risk::{RiskBand, RiskScore};
pub use verdict::{BlockReason, Decision, PromptCheck, SecurityVerdict};

// Re-export component types for convenience
pub use aegis_firewall::{InjectionVerdict, IntentLabel};
pub use aegis_ledger::{AuditEntry, AuditLedger, ChainVerification};
pub use aegis_pii::{PiiCategory, PiiMatch, PiiSummary, SanitizeMode};
pub use aegis_policy::{PolicyAction, PolicyRule, Role, RoleTable};
