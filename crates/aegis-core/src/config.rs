//! Configuration types for the Aegis gateway.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use aegis_firewall::InjectionDetectorConfig;
use aegis_pii::SanitizeMode;
use aegis_policy::RoleTable;

use crate::error::{GatewayError, Result};

/// Configuration for the gateway facade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Prompt firewall configuration.
    pub firewall: FirewallConfig,

    /// PII sanitization configuration.
    pub pii: PiiConfig,

    /// Role policy configuration.
    pub policy: PolicyConfig,

    /// Risk scoring configuration.
    pub risk: RiskConfig,

    /// Upstream model client configuration.
    pub upstream: UpstreamConfig,

    /// Audit ledger configuration.
    pub audit: AuditConfig,
}

impl GatewayConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing sections fall back to their defaults; a malformed file or an
    /// invalid rule table is a [`GatewayError::Configuration`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            GatewayError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            GatewayError::Configuration(format!("invalid config {}: {e}", path.display()))
        })
    }
}

/// Prompt firewall thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Aggregate confidence at which a prompt is treated as an injection.
    pub block_threshold: f64,

    /// Individual rule weight that ends evaluation early.
    pub short_circuit_threshold: f64,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        let defaults = InjectionDetectorConfig::default();
        Self {
            block_threshold: defaults.block_threshold,
            short_circuit_threshold: defaults.short_circuit_threshold,
        }
    }
}

impl FirewallConfig {
    pub fn detector_config(&self) -> InjectionDetectorConfig {
        InjectionDetectorConfig {
            block_threshold: self.block_threshold,
            short_circuit_threshold: self.short_circuit_threshold,
        }
    }
}

/// PII handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiConfig {
    /// Transform applied to prompts and responses.
    ///
    /// A policy verdict of allow-with-sanitize escalates `detect` to
    /// `redact` for that request.
    pub mode: SanitizeMode,
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            mode: SanitizeMode::Mask,
        }
    }
}

/// Role policy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// The rule table. Defaults to the built-in table.
    pub role_table: RoleTable,
}

/// Risk scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Score at or above which the request is blocked outright.
    pub risk_threshold_block: u8,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_threshold_block: 70,
        }
    }
}

/// Upstream model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the first failed attempt.
    pub max_retries: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
        }
    }
}

/// Audit ledger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Ledger database directory. `None` keeps the chain in memory, which
    /// is only suitable for tests and demos.
    pub db_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.pii.mode, SanitizeMode::Mask);
        assert_eq!(config.risk.risk_threshold_block, 70);
        assert_eq!(config.upstream.max_retries, 2);
        assert!(config.audit.db_path.is_none());
        assert!(!config.policy.role_table.is_empty());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.risk.risk_threshold_block, config.risk.risk_threshold_block);
        assert_eq!(parsed.policy.role_table.len(), config.policy.role_table.len());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: GatewayConfig =
            serde_json::from_str(r#"{"risk": {"risk_threshold_block": 50}}"#).unwrap();
        assert_eq!(parsed.risk.risk_threshold_block, 50);
        assert_eq!(parsed.pii.mode, SanitizeMode::Mask);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = GatewayConfig::from_json_file("/nonexistent/aegis.json").unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_duplicate_policy_rule_rejected_at_load() {
        let json = r#"{"policy": {"role_table": [
            {"role": "user", "intent": "chat", "action": "allow"},
            {"role": "user", "intent": "chat", "action": "block"}
        ]}}"#;
        assert!(serde_json::from_str::<GatewayConfig>(json).is_err());
    }
}
