//! Fact store adapters
//!
//! A [`FactStore`] owns all persisted Query facts. Every operation is its own
//! unit of work: the backend opens a transaction (or auto-commit statement),
//! runs it, and releases it before returning. Nothing is held across calls.
//!
//! Backends:
//! - **neo4j** — `(:Query)` nodes merged on `query_id`
//! - **postgres** — `query_facts` rows upserted on `query_id`
//! - **memory** — process-local map, same merge semantics

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use crate::models::{NewQueryFact, QueryFact};

pub mod memory;
pub mod neo4j;
pub mod postgres;

pub use memory::MemoryFactStore;
pub use neo4j::GraphFactStore;
pub use postgres::PgFactStore;

#[async_trait]
pub trait FactStore: Send + Sync {
    /// Ensure the uniqueness constraint on `query_id`. Idempotent.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Create the fact if absent, otherwise overwrite every field and refresh
    /// the timestamp. Never produces two facts for one `query_id`.
    async fn upsert(&self, fact: &NewQueryFact) -> Result<(), StoreError>;

    /// Stored `is_true`, or `None` when no fact exists for `query_id`.
    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError>;

    /// The full stored record.
    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError>;

    /// Backend version or status line.
    async fn health_check(&self) -> Result<String, StoreError>;

    /// Release connection resources. Later operations may fail.
    async fn close(&self);

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Connect the backend selected by `[store] backend`.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn FactStore>, StoreError> {
    let store: Arc<dyn FactStore> = match config.backend {
        StoreBackend::Neo4j => Arc::new(GraphFactStore::connect(config).await?),
        StoreBackend::Postgres => Arc::new(PgFactStore::connect(config).await?),
        StoreBackend::Memory => Arc::new(MemoryFactStore::new()),
    };

    tracing::info!(backend = store.name(), "Fact store connected");
    Ok(store)
}
