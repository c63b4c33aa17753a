use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::FactStore;
use crate::error::StoreError;
use crate::models::{NewQueryFact, QueryFact};

/// Process-local fact store keyed by `query_id`.
///
/// Each call takes the lock for the duration of one map operation, which
/// gives the same per-write atomicity as a database transaction. The map is
/// keyed by `query_id`, so a second upsert of the same id replaces the first.
#[derive(Debug, Default)]
pub struct MemoryFactStore {
    facts: RwLock<HashMap<String, QueryFact>>,
    closed: AtomicBool,
}

impl MemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.read().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::connect("memory fact store is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn upsert(&self, fact: &NewQueryFact) -> Result<(), StoreError> {
        self.ensure_open()?;
        let record = fact.clone().into_fact(Utc::now());
        self.facts.write().insert(fact.query_id.clone(), record);
        Ok(())
    }

    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError> {
        self.ensure_open()?;
        Ok(self.facts.read().get(query_id).map(|f| f.is_true))
    }

    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError> {
        self.ensure_open()?;
        Ok(self.facts.read().get(query_id).cloned())
    }

    async fn health_check(&self) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok(format!("memory ({} facts)", self.len()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.facts.write().clear();
    }

    fn name(&self) -> &str {
        "memory"
    }
}
