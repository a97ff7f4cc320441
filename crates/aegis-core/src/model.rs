//! The upstream model boundary.

use async_trait::async_trait;
use thiserror::Error;

use crate::request::ModelParams;

/// Errors from an upstream model client.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend cannot be reached or refused the request. Retryable.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the request as malformed. Not retryable.
    #[error("model rejected request: {0}")]
    Rejected(String),
}

/// An upstream completion backend.
///
/// The gateway owns timeouts and retries; implementations should just make
/// one attempt per call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> std::result::Result<String, ModelError>;
}

/// Deterministic local backend: echoes the (sanitized) prompt.
///
/// Useful as a demo target and as the fallback when no real backend is
/// configured. Never fails.
#[derive(Debug, Clone, Default)]
pub struct EchoModel;

#[async_trait]
impl ModelClient for EchoModel {
    async fn complete(
        &self,
        prompt: &str,
        params: &ModelParams,
    ) -> std::result::Result<String, ModelError> {
        Ok(format!("[{}] {prompt}", params.model))
    }
}
