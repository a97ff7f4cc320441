//! Error types for the Aegis gateway core.

use thiserror::Error;

/// Core error type for gateway operations.
///
/// Threat-relevant failures (injection, policy denial, risk, upstream loss)
/// are NOT errors: the pipeline is fail-closed and turns them into Block
/// verdicts so they reach the audit trail. Errors here are operational:
/// bad configuration, broken storage, invalid policy tables.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Audit ledger write or open failed.
    #[error("Audit write failed: {0}")]
    AuditWrite(#[from] aegis_ledger::LedgerError),

    /// Policy table error passthrough.
    #[error("Policy error: {0}")]
    Policy(#[from] aegis_policy::PolicyError),
}

/// Core result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
