//! The unified gateway facade.
//!
//! [`Gateway`] owns every security component and runs the full pipeline for
//! each request. The pipeline is fail-closed: injection, policy denial,
//! risk, and upstream loss all produce Block verdicts, and every terminal
//! path is appended to the audit ledger.

use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use aegis_firewall::{InjectionDetector, InjectionVerdict, IntentClassifier, IntentLabel};
use aegis_ledger::AuditLedger;
use aegis_pii::{PiiSummary, PiiSanitizer, ResponseGuard, SanitizeMode, SanitizeOutcome};
use aegis_policy::{PolicyAction, PolicyEngine};

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::model::{EchoModel, ModelClient, ModelError};
use crate::request::{normalize_prompt, Request, MAX_PROMPT_BYTES};
use crate::risk::{self, RiskInputs};
use crate::verdict::{BlockReason, Decision, PromptCheck, SecurityVerdict};

/// The Aegis security gateway.
///
/// Orchestrates five components around the upstream model call:
/// - **Prompt firewall**: pattern-scored injection detection
/// - **Intent classifier**: routes the prompt to a policy intent
/// - **Role policy**: decides allow / sanitize / block per role and intent
/// - **PII sanitizer & response guard**: rewrite sensitive spans in both
///   directions
/// - **Audit ledger**: hash-chained record of every verdict
///
/// # Security Model
///
/// Checks run in order: intake, firewall, intent, policy, prompt
/// sanitization, pre-flight risk, upstream, response guard, final risk.
/// The earliest stage that blocks decides the verdict; later stages only
/// add evidence to the risk score.
pub struct Gateway {
    config: GatewayConfig,
    firewall: InjectionDetector,
    classifier: IntentClassifier,
    sanitizer: PiiSanitizer,
    guard: ResponseGuard,
    policy: PolicyEngine,
    ledger: AuditLedger,
    model: Box<dyn ModelClient>,
}

impl Gateway {
    /// Create a gateway over an explicit upstream client.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit ledger cannot be opened or its chain
    /// fails verification.
    pub fn new(config: GatewayConfig, model: Box<dyn ModelClient>) -> Result<Self> {
        let ledger = match &config.audit.db_path {
            Some(path) => AuditLedger::open(path)?,
            None => AuditLedger::temporary()?,
        };

        let firewall = InjectionDetector::with_config(config.firewall.detector_config());
        let policy = PolicyEngine::with_table(config.policy.role_table.clone());

        info!(
            rules = firewall.rule_count(),
            policy_rules = config.policy.role_table.len(),
            "gateway initialized"
        );

        Ok(Self {
            config,
            firewall,
            classifier: IntentClassifier::new(),
            sanitizer: PiiSanitizer::new(),
            guard: ResponseGuard::new(),
            policy,
            ledger,
            model,
        })
    }

    /// Create a gateway backed by the local echo model.
    pub fn with_echo_model(config: GatewayConfig) -> Result<Self> {
        Self::new(config, Box::new(EchoModel))
    }

    /// Run the full pipeline for one request.
    pub async fn process(&self, request: &Request) -> Result<SecurityVerdict> {
        debug!(request_id = %request.id, role = %request.role, "processing request");

        // If the caller drops this future mid-flight the guard still writes
        // a cancellation entry; only finalize disarms it.
        let mut cancel_guard = CancellationGuard {
            ledger: &self.ledger,
            request_id: request.id,
            armed: true,
        };

        // Intake: normalize and bound the prompt before anything reads it.
        let prompt = normalize_prompt(&request.prompt_text);
        if prompt.len() > MAX_PROMPT_BYTES {
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::PromptTooLarge {
                        size: prompt.len(),
                        max: MAX_PROMPT_BYTES,
                    },
                    IntentLabel::Unknown,
                    InjectionVerdict::clean(),
                    PolicyAction::Block,
                    PiiSummary::empty(prompt.len()),
                    0,
                ),
            ));
        }
        if prompt.trim().is_empty() {
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::EmptyPrompt,
                    IntentLabel::Unknown,
                    InjectionVerdict::clean(),
                    PolicyAction::Block,
                    PiiSummary::empty(prompt.len()),
                    0,
                ),
            ));
        }

        // Firewall: a confirmed injection ends the pipeline here. Intent is
        // reported as unknown because classification never ran. The score is
        // floored at the block threshold: a confirmed injection is never
        // recorded below the level the configuration calls blockable.
        let injection = self.firewall.evaluate(&prompt);
        if injection.is_injection {
            warn!(
                request_id = %request.id,
                rule = ?injection.matched_rule_id,
                confidence = injection.confidence,
                "prompt injection blocked"
            );
            let score = risk::assess(&RiskInputs {
                injection_confidence: injection.confidence,
                degraded: injection.degraded,
                ..Default::default()
            })
            .floor_at(self.config.risk.risk_threshold_block);
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::InjectionDetected {
                        rule_id: injection.matched_rule_id,
                        confidence: injection.confidence,
                    },
                    IntentLabel::Unknown,
                    injection,
                    PolicyAction::Block,
                    PiiSummary::empty(prompt.len()),
                    score.score,
                ),
            ));
        }

        // Intent and policy.
        let intent = self.classifier.classify(&prompt);
        let decision = self.policy.evaluate(request.role, intent, false);

        if decision.action == PolicyAction::Block {
            // Scan the prompt anyway so the audit record shows what the
            // blocked request carried.
            let matches = self.sanitizer.detect(&prompt);
            let score = risk::assess(&RiskInputs {
                injection_confidence: injection.confidence,
                prompt_matches: &matches,
                policy_blocked: true,
                degraded: injection.degraded,
                ..Default::default()
            });
            let summary = SanitizeOutcome {
                text: String::new(),
                matches,
                mode: SanitizeMode::Detect,
                original_length: prompt.len(),
                sanitized_length: prompt.len(),
            }
            .summary();
            warn!(request_id = %request.id, %intent, "policy denied request");
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::PolicyDenied {
                        role: request.role.to_string(),
                        intent: intent.to_string(),
                    },
                    intent,
                    injection,
                    decision.action,
                    summary,
                    score.score,
                ),
            ));
        }

        // Prompt sanitization. Allow-with-sanitize escalates a detect-only
        // configuration to redaction for this request.
        let mut mode = self.config.pii.mode;
        if decision.action == PolicyAction::AllowWithSanitize && mode == SanitizeMode::Detect {
            mode = SanitizeMode::Redact;
        }
        let prompt_outcome = self.sanitizer.sanitize(&prompt, mode);
        let prompt_rewritten = prompt_outcome.text != prompt;

        // Pre-flight risk: block before spending an upstream call.
        let preflight = risk::assess(&RiskInputs {
            injection_confidence: injection.confidence,
            prompt_matches: &prompt_outcome.matches,
            degraded: injection.degraded,
            ..Default::default()
        });
        let threshold = self.config.risk.risk_threshold_block;
        if preflight.score >= threshold {
            warn!(request_id = %request.id, score = preflight.score, "risk threshold block");
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::RiskThreshold {
                        score: preflight.score,
                        threshold,
                    },
                    intent,
                    injection,
                    decision.action,
                    prompt_outcome.summary(),
                    preflight.score,
                ),
            ));
        }

        // Upstream call. Only the sanitized prompt leaves the gateway.
        let response = match self.call_upstream(&prompt_outcome.text, request).await {
            Ok(text) => text,
            Err(reason) => {
                warn!(request_id = %request.id, %reason, "upstream failure, failing closed");
                return Ok(self.finalize(
                    &mut cancel_guard,
                    self.blocked(
                        request,
                        reason,
                        intent,
                        injection,
                        decision.action,
                        prompt_outcome.summary(),
                        preflight.score,
                    ),
                ));
            }
        };

        // Response guard. Detect-only mode still redacts outbound secrets;
        // raw leaks never leave the gateway.
        let guard_mode = if mode == SanitizeMode::Detect {
            SanitizeMode::Redact
        } else {
            mode
        };
        let guarded = self.guard.guard(&response, guard_mode);
        let response_filtered = guarded.outcome.text != response;

        let final_score = risk::assess(&RiskInputs {
            injection_confidence: injection.confidence,
            prompt_matches: &prompt_outcome.matches,
            response_filtered,
            degraded: injection.degraded,
            ..Default::default()
        });

        if guarded.leaked && final_score.score >= threshold {
            let categories = guarded
                .secret_categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect();
            warn!(request_id = %request.id, "response leak pushed risk over threshold");
            return Ok(self.finalize(
                &mut cancel_guard,
                self.blocked(
                    request,
                    BlockReason::ResponseLeak { categories },
                    intent,
                    injection,
                    decision.action,
                    prompt_outcome.summary(),
                    final_score.score,
                ),
            ));
        }

        let decision_kind = if prompt_rewritten || response_filtered {
            Decision::AllowedSanitized
        } else {
            Decision::Allowed
        };

        info!(
            request_id = %request.id,
            decision = decision_kind.as_str(),
            risk = final_score.score,
            "request completed"
        );

        Ok(self.finalize(&mut cancel_guard, SecurityVerdict {
            request_id: request.id,
            decision: decision_kind,
            block_reason: None,
            intent,
            risk: final_score,
            policy: decision.action,
            pii: prompt_outcome.summary(),
            prompt_check: prompt_check_for(&injection),
            response_filtered,
            audited: true,
            response_text: Some(guarded.outcome.text),
        }))
    }

    /// One bounded upstream exchange: per-attempt timeout, retries only for
    /// retryable failures.
    async fn call_upstream(
        &self,
        prompt: &str,
        request: &Request,
    ) -> std::result::Result<String, BlockReason> {
        let timeout = Duration::from_millis(self.config.upstream.timeout_ms);
        let attempts = self.config.upstream.max_retries + 1;
        let mut last_reason = BlockReason::UpstreamUnavailable {
            detail: "no attempts made".to_string(),
        };

        for attempt in 0..attempts {
            match tokio::time::timeout(timeout, self.model.complete(prompt, &request.model_params))
                .await
            {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(ModelError::Rejected(detail))) => {
                    return Err(BlockReason::UpstreamUnavailable { detail });
                }
                Ok(Err(ModelError::Unavailable(detail))) => {
                    debug!(attempt, %detail, "upstream attempt failed");
                    last_reason = BlockReason::UpstreamUnavailable { detail };
                }
                Err(_) => {
                    debug!(attempt, "upstream attempt timed out");
                    last_reason = BlockReason::UpstreamTimeout {
                        timeout_ms: self.config.upstream.timeout_ms,
                    };
                }
            }
        }

        Err(last_reason)
    }

    /// Build a Block verdict carrying whatever evidence was gathered before
    /// the pipeline stopped. `policy` is the action the policy layer actually
    /// chose; stages before policy evaluation report the forced `Block`.
    #[allow(clippy::too_many_arguments)]
    fn blocked(
        &self,
        request: &Request,
        reason: BlockReason,
        intent: IntentLabel,
        injection: InjectionVerdict,
        policy: PolicyAction,
        pii: PiiSummary,
        risk_score: u8,
    ) -> SecurityVerdict {
        SecurityVerdict {
            request_id: request.id,
            decision: Decision::Blocked,
            block_reason: Some(reason),
            intent,
            risk: crate::risk::RiskScore::new(risk_score),
            policy,
            pii,
            prompt_check: prompt_check_for(&injection),
            response_filtered: false,
            audited: true,
            response_text: None,
        }
    }

    /// Append the verdict to the ledger and disarm the cancellation guard.
    /// An append failure downgrades the verdict's `audited` flag instead of
    /// replacing the security decision.
    fn finalize(
        &self,
        cancel_guard: &mut CancellationGuard<'_>,
        verdict: SecurityVerdict,
    ) -> SecurityVerdict {
        cancel_guard.armed = false;
        let envelope = verdict.envelope();
        let result = self.ledger.append(&verdict.request_id.to_string(), envelope);
        apply_audit_result(verdict, result)
    }

    /// The audit ledger, for verification and inspection.
    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// The active configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Writes a cancellation entry for a request whose `process` future was
/// dropped before reaching a terminal verdict, so the ledger records every
/// request that entered the pipeline. Disarmed by [`Gateway::finalize`].
struct CancellationGuard<'a> {
    ledger: &'a AuditLedger,
    request_id: Uuid,
    armed: bool,
}

impl Drop for CancellationGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(request_id = %self.request_id, "request cancelled in flight");
        let envelope = serde_json::json!({
            "request_id": self.request_id.to_string(),
            "security": {
                "decision": "cancelled",
            },
        });
        if let Err(e) = self.ledger.append(&self.request_id.to_string(), envelope) {
            warn!(request_id = %self.request_id, error = %e, "audit append failed");
        }
    }
}

fn apply_audit_result(
    mut verdict: SecurityVerdict,
    result: std::result::Result<aegis_ledger::AuditEntry, aegis_ledger::LedgerError>,
) -> SecurityVerdict {
    if let Err(e) = result {
        warn!(request_id = %verdict.request_id, error = %e, "audit append failed");
        verdict.audited = false;
    }
    verdict
}

fn prompt_check_for(injection: &InjectionVerdict) -> PromptCheck {
    PromptCheck {
        decision: if injection.is_injection {
            "blocked".to_string()
        } else {
            "allowed".to_string()
        },
        is_injection: injection.is_injection,
        confidence: injection.confidence,
        degraded: injection.degraded,
    }
}
