use async_trait::async_trait;
use sqlx::PgPool;

use super::FactStore;
use crate::config::StoreConfig;
use crate::db;
use crate::error::StoreError;
use crate::models::{NewQueryFact, QueryFact};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS query_facts (
        query_id          TEXT NOT NULL,
        text              TEXT NOT NULL,
        is_true           BOOLEAN NOT NULL,
        confidence        DOUBLE PRECISION NOT NULL,
        verification_data TEXT NOT NULL,
        "timestamp"       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_UNIQUE_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS query_facts_query_id_key ON query_facts (query_id)";

const UPSERT_FACT: &str = r#"
    INSERT INTO query_facts (query_id, text, is_true, confidence, verification_data, "timestamp")
    VALUES ($1, $2, $3, $4, $5, NOW())
    ON CONFLICT (query_id) DO UPDATE
    SET text = EXCLUDED.text,
        is_true = EXCLUDED.is_true,
        confidence = EXCLUDED.confidence,
        verification_data = EXCLUDED.verification_data,
        "timestamp" = NOW()
"#;

/// Query facts as rows of `query_facts`, one row per `query_id`.
#[derive(Debug, Clone)]
pub struct PgFactStore {
    pool: PgPool,
}

impl PgFactStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = db::create_pool(config)
            .await
            .map_err(StoreError::connect)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FactStore for PgFactStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::schema)?;

        sqlx::query(CREATE_TABLE)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::schema)?;
        sqlx::query(CREATE_UNIQUE_INDEX)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::schema)?;

        tx.commit().await.map_err(StoreError::schema)?;

        tracing::info!("query_facts table and query_id unique index ensured");
        Ok(())
    }

    async fn upsert(&self, fact: &NewQueryFact) -> Result<(), StoreError> {
        let id = fact.query_id.as_str();

        // Dropping an uncommitted transaction rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::write(id, e))?;

        sqlx::query(UPSERT_FACT)
            .bind(&fact.query_id)
            .bind(&fact.text)
            .bind(fact.is_true)
            .bind(fact.confidence)
            .bind(&fact.verification_data)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::write(id, e))?;

        tx.commit().await.map_err(|e| StoreError::write(id, e))?;
        Ok(())
    }

    async fn lookup_truth(&self, query_id: &str) -> Result<Option<bool>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::read(query_id, e))?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::read(query_id, e))?;

        let is_true: Option<bool> =
            sqlx::query_scalar("SELECT is_true FROM query_facts WHERE query_id = $1")
                .bind(query_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| StoreError::read(query_id, e))?;

        tx.commit().await.map_err(|e| StoreError::read(query_id, e))?;
        Ok(is_true)
    }

    async fn fetch(&self, query_id: &str) -> Result<Option<QueryFact>, StoreError> {
        sqlx::query_as::<_, QueryFact>(
            r#"
            SELECT query_id, text, is_true, confidence, verification_data, "timestamp"
            FROM query_facts
            WHERE query_id = $1
            "#,
        )
        .bind(query_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::read(query_id, e))
    }

    async fn health_check(&self) -> Result<String, StoreError> {
        db::health_check(&self.pool)
            .await
            .map_err(StoreError::connect)
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
