//! Verification orchestrator
//!
//! Per claim: check the cache, and on a miss call the external verifier.
//! Only a `TRUE` verdict is normalized and persisted; anything else is
//! returned as `false` without touching the store, so negative claims are
//! re-verified on every call.
//!
//! There is no lock around check-then-verify-then-write. Two concurrent calls
//! for the same uncached claim may both verify and both upsert; the upsert
//! merges on `query_id`, so the stored state is the same either way.

use std::sync::Arc;

use crate::error::{FactCacheError, VerifierError};
use crate::fingerprint::fingerprint;
use crate::models::{NewQueryFact, QueryFact, Verdict, VerificationSummary};
use crate::normalize::normalize;
use crate::store::FactStore;
use crate::verifier::ClaimVerifier;

/// Which branch answered a `resolve` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Answered from the store; the verifier was not called.
    Cached(bool),
    /// Verified `TRUE` and written to the store.
    Persisted { confidence: f64 },
    /// Verified with any other verdict; nothing written.
    Rejected { verdict: Verdict },
}

impl Resolution {
    pub fn is_true(&self) -> bool {
        match self {
            Resolution::Cached(is_true) => *is_true,
            Resolution::Persisted { .. } => true,
            Resolution::Rejected { .. } => false,
        }
    }
}

/// The fact cache: one store handle and one verifier, shared by all callers.
#[derive(Clone)]
pub struct FactCache {
    store: Arc<dyn FactStore>,
    verifier: Arc<dyn ClaimVerifier>,
}

impl FactCache {
    pub fn new(store: Arc<dyn FactStore>, verifier: Arc<dyn ClaimVerifier>) -> Self {
        Self { store, verifier }
    }

    pub fn store(&self) -> &Arc<dyn FactStore> {
        &self.store
    }

    /// Ensure the store's uniqueness constraint. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<(), FactCacheError> {
        self.store.initialize().await?;
        Ok(())
    }

    /// Whether `text` is a known or newly verified true claim.
    pub async fn verify(&self, text: &str) -> Result<bool, FactCacheError> {
        Ok(self.resolve(text).await?.is_true())
    }

    /// Run the cache state machine and report the branch taken.
    pub async fn resolve(&self, text: &str) -> Result<Resolution, FactCacheError> {
        let query_id = fingerprint(text);

        if let Some(is_true) = self.store.lookup_truth(&query_id).await? {
            tracing::debug!(query_id = %query_id, is_true, "Fact cache hit");
            return Ok(Resolution::Cached(is_true));
        }

        tracing::debug!(
            query_id = %query_id,
            verifier = self.verifier.name(),
            "Fact cache miss, verifying"
        );
        let result = self.verifier.process(text).await?;
        let summary = VerificationSummary::from_payload(&result)?;

        if !summary.verdict.is_true() {
            if let Verdict::Other(label) = &summary.verdict {
                tracing::warn!(query_id = %query_id, verdict = %label, "Unrecognized verdict treated as not true");
            }
            return Ok(Resolution::Rejected {
                verdict: summary.verdict,
            });
        }

        let confidence = summary.confidence.ok_or_else(|| {
            VerifierError::MalformedResponse("missing 'verification.confidence'".to_string())
        })?;

        let canonical = normalize(&result)?;
        let fact = NewQueryFact {
            query_id: query_id.clone(),
            text: text.to_string(),
            is_true: true,
            confidence,
            verification_data: canonical.to_string(),
        };

        if let Err(e) = self.store.upsert(&fact).await {
            tracing::error!(
                query_id = %query_id,
                error = %e,
                "Failed to persist verified fact"
            );
            return Err(e.into());
        }

        tracing::info!(query_id = %query_id, confidence, "Verified fact persisted");
        Ok(Resolution::Persisted { confidence })
    }

    /// Read-only cache probe. Never calls the verifier.
    pub async fn lookup_truth_only(&self, text: &str) -> Result<Option<bool>, FactCacheError> {
        Ok(self.store.lookup_truth(&fingerprint(text)).await?)
    }

    /// The stored fact for `text`, if any.
    pub async fn fact(&self, text: &str) -> Result<Option<QueryFact>, FactCacheError> {
        Ok(self.store.fetch(&fingerprint(text)).await?)
    }

    /// Release the store connection.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
