//! External verifier client
//!
//! The verification engine is an opaque service: given claim text it returns
//! `{ "verification": { "verdict": ..., "confidence": ... }, ...evidence }`.
//! [`ClaimVerifier`] is the seam the cache calls through; [`HttpClaimVerifier`]
//! talks to a service over JSON/HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::VerifierConfig;
use crate::error::VerifierError;
use crate::normalize::Payload;

// ============================================================================
// ClaimVerifier trait
// ============================================================================

#[async_trait]
pub trait ClaimVerifier: Send + Sync {
    /// Verify a claim and return the full result payload.
    async fn process(&self, claim: &str) -> Result<Payload, VerifierError>;

    /// Verifier name for logging.
    fn name(&self) -> &str;
}

/// Build the HTTP verifier from configuration.
pub fn create_verifier(config: &VerifierConfig) -> Result<Arc<dyn ClaimVerifier>, VerifierError> {
    Ok(Arc::new(HttpClaimVerifier::new(config.clone())?))
}

// ============================================================================
// Wire structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// HttpClaimVerifier
// ============================================================================

/// Posts `{"query": claim}` to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpClaimVerifier {
    client: Client,
    config: VerifierConfig,
}

impl HttpClaimVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        if config.endpoint.trim().is_empty() {
            return Err(VerifierError::MissingEndpoint);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    async fn process_once(&self, claim: &str) -> Result<Payload, VerifierError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&VerifyRequest { query: claim });

        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let (code, message) = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, "Verifier API error");
            return Err(VerifierError::Api { code, message });
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| VerifierError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        Ok(Payload::from(value))
    }
}

#[async_trait]
impl ClaimVerifier for HttpClaimVerifier {
    async fn process(&self, claim: &str) -> Result<Payload, VerifierError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let result = RetryIf::spawn(
            retry_strategy,
            || self.process_once(claim),
            |e: &VerifierError| e.is_transient(),
        )
        .await;

        if let Err(e) = &result {
            tracing::error!(
                retries = self.config.max_retries,
                error = %e,
                "Claim verification request failed"
            );
        }
        result
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// TESTS
// ============================================================================
