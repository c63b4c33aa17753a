//! Shared test doubles for the fact cache integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use factcache_core::{
    ClaimVerifier, FactStore, MemoryFactStore, NewQueryFact, Payload, QueryFact, StoreError,
    VerifierError,
};
use serde_json::json;

/// Verifier answering from a fixed table and counting calls.
pub struct StubVerifier {
    responses: HashMap<String, Payload>,
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, claim: &str, response: impl Into<Payload>) -> Self {
        self.responses.insert(claim.to_string(), response.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClaimVerifier for StubVerifier {
    async fn process(&self, claim: &str) -> Result<Payload, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers interleave between lookup and upsert.
        tokio::task::yield_now().await;
        self.responses.get(claim).cloned().ok_or_else(|| VerifierError::Api {
            code: 503,
            message: format!("no stubbed response for {claim}"),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn verdict(label: &str, confidence: f64) -> serde_json::Value {
    json!({
        "verification": {
            "verdict": label,
            "confidence": confidence,
            "evidence": [{ "source": "encyclopedia", "relevance": 0.7 }]
        },
        "search_results": 3
    })
}

/// Store whose reads succeed (delegating to memory) and whose writes fail.
#[derive(Default)]
pub struct FailingWriteStore {
    inner: MemoryFactStore,
    pub attempts: AtomicUsize,
}

#[async_trait]
impl FactStore for FailingWriteStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.inner.initialize().await
    }

    async fn upsert(&self, fact: &NewQueryFact) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::write(
            &fact.query_id,
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
        ))
    }

    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError> {
        self.inner.lookup_truth(query_id).await
    }

    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError> {
        self.inner.fetch(query_id).await
    }

    async fn health_check(&self) -> Result<String, StoreError> {
        Ok("failing".to_string())
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "failing-write"
    }
}

/// Store whose reads fail.
pub struct FailingReadStore;

#[async_trait]
impl FactStore for FailingReadStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert(&self, _fact: &NewQueryFact) -> Result<(), StoreError> {
        Ok(())
    }

    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError> {
        Err(StoreError::read(
            query_id,
            std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"),
        ))
    }

    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError> {
        self.lookup_truth(query_id).await.map(|_| None)
    }

    async fn health_check(&self) -> Result<String, StoreError> {
        Ok("failing".to_string())
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "failing-read"
    }
}
