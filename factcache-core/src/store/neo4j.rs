use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{query, ConfigBuilder, Graph, Query};
use parking_lot::RwLock;

use super::FactStore;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{NewQueryFact, QueryFact};

const CREATE_CONSTRAINT: &str =
    "CREATE CONSTRAINT query_id_unique IF NOT EXISTS FOR (q:Query) REQUIRE q.query_id IS UNIQUE";

const MERGE_FACT: &str = "
    MERGE (q:Query {query_id: $query_id})
    SET q.text = $text,
        q.is_true = $is_true,
        q.confidence = $confidence,
        q.verification_data = $verification_data,
        q.timestamp = timestamp()";

/// Query facts as `(:Query)` nodes in Neo4j.
///
/// The driver handle is dropped by `close`; every later operation fails
/// with `StoreError::Connect`.
pub struct GraphFactStore {
    graph: RwLock<Option<Graph>>,
}

impl GraphFactStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let graph_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections as usize)
            .build()
            .map_err(StoreError::connect)?;

        let graph = Graph::connect(graph_config)
            .await
            .map_err(StoreError::connect)?;

        Ok(Self::from_graph(graph))
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph: RwLock::new(Some(graph)),
        }
    }

    /// The live driver handle, or `Connect` once the store is closed.
    pub fn graph(&self) -> Result<Graph, StoreError> {
        self.graph
            .read()
            .clone()
            .ok_or_else(|| StoreError::connect("neo4j fact store is closed"))
    }

    pub fn is_closed(&self) -> bool {
        self.graph.read().is_none()
    }

    /// Run one write statement in an explicit transaction, rolling back on failure.
    async fn run_in_txn(graph: &Graph, q: Query) -> Result<(), neo4rs::Error> {
        let mut txn = graph.start_txn().await?;
        if let Err(e) = txn.run(q).await {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Neo4j rollback failed");
            }
            return Err(e);
        }
        txn.commit().await
    }
}

#[async_trait]
impl FactStore for GraphFactStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        // Schema statements cannot share a transaction with data writes.
        self.graph()?
            .run(query(CREATE_CONSTRAINT))
            .await
            .map_err(StoreError::schema)?;

        tracing::info!("Query.query_id uniqueness constraint ensured");
        Ok(())
    }

    async fn upsert(&self, fact: &NewQueryFact) -> Result<(), StoreError> {
        let q = query(MERGE_FACT)
            .param("query_id", fact.query_id.as_str())
            .param("text", fact.text.as_str())
            .param("is_true", fact.is_true)
            .param("confidence", fact.confidence)
            .param("verification_data", fact.verification_data.as_str());

        let graph = self.graph()?;
        Self::run_in_txn(&graph, q)
            .await
            .map_err(|e| StoreError::write(&fact.query_id, e))
    }

    /// Runs as a single auto-commit read rather than an explicit read-only transaction.
    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError> {
        let q = query("MATCH (q:Query {query_id: $query_id}) RETURN q.is_true AS is_true")
            .param("query_id", query_id);

        let mut stream = self
            .graph()?
            .execute(q)
            .await
            .map_err(|e| StoreError::read(query_id, e))?;

        match stream
            .next()
            .await
            .map_err(|e| StoreError::read(query_id, e))?
        {
            Some(row) => {
                let is_true = row
                    .get::<bool>("is_true")
                    .map_err(|e| StoreError::read(query_id, e))?;
                Ok(Some(is_true))
            }
            None => Ok(None),
        }
    }

    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError> {
        let q = query(
            "MATCH (q:Query {query_id: $query_id})
             RETURN q.query_id AS query_id, q.text AS text, q.is_true AS is_true,
                    q.confidence AS confidence, q.verification_data AS verification_data,
                    q.timestamp AS timestamp",
        )
        .param("query_id", query_id);

        let mut stream = self
            .graph()?
            .execute(q)
            .await
            .map_err(|e| StoreError::read(query_id, e))?;

        let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::read(query_id, e))?
        else {
            return Ok(None);
        };

        let read = |e| StoreError::read(query_id, e);
        let millis = row.get::<i64>("timestamp").map_err(read)?;

        Ok(Some(QueryFact {
            query_id: row.get::<String>("query_id").map_err(read)?,
            text: row.get::<String>("text").map_err(read)?,
            is_true: row.get::<bool>("is_true").map_err(read)?,
            confidence: row.get::<f64>("confidence").map_err(read)?,
            verification_data: row.get::<String>("verification_data").map_err(read)?,
            timestamp: DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default(),
        }))
    }

    async fn health_check(&self) -> Result<String, StoreError> {
        let q = query(
            "CALL dbms.components() YIELD name, versions
             RETURN name + ' ' + versions[0] AS version",
        );
        let mut stream = self
            .graph()?
            .execute(q)
            .await
            .map_err(StoreError::connect)?;

        match stream.next().await.map_err(StoreError::connect)? {
            Some(row) => row.get::<String>("version").map_err(StoreError::connect),
            None => Ok("neo4j".to_string()),
        }
    }

    async fn close(&self) {
        // Dropping the last handle shuts down the connection pool.
        if self.graph.write().take().is_some() {
            tracing::debug!("Neo4j fact store closed");
        }
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}
