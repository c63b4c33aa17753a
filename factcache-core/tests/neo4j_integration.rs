//! Neo4j fact store round trips
//!
//! Needs `FACTCACHE_TEST_NEO4J_URI` (e.g. `bolt://localhost:7687`) plus
//! `FACTCACHE_TEST_NEO4J_USER` / `FACTCACHE_TEST_NEO4J_PASSWORD`.
//! Each test returns early when the URI is unset.

use std::sync::Arc;

use factcache_core::{
    fingerprint, FactStore, GraphFactStore, NewQueryFact, StoreBackend, StoreConfig, StoreError,
};
use neo4rs::query;

async fn test_store() -> Option<GraphFactStore> {
    let Ok(uri) = std::env::var("FACTCACHE_TEST_NEO4J_URI") else {
        eprintln!("FACTCACHE_TEST_NEO4J_URI not set; skipping");
        return None;
    };
    let config = StoreConfig {
        backend: StoreBackend::Neo4j,
        uri,
        username: std::env::var("FACTCACHE_TEST_NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string()),
        password: std::env::var("FACTCACHE_TEST_NEO4J_PASSWORD").unwrap_or_default(),
        max_connections: 4,
    };
    let store = GraphFactStore::connect(&config)
        .await
        .expect("Failed to connect to Neo4j");
    store.initialize().await.expect("Failed to create constraint");
    Some(store)
}

async fn count_nodes(store: &GraphFactStore, query_id: &str) -> i64 {
    let q = query("MATCH (q:Query {query_id: $query_id}) RETURN count(q) AS n")
        .param("query_id", query_id);
    let mut stream = store.graph().unwrap().execute(q).await.unwrap();
    let row = stream.next().await.unwrap().expect("count row");
    row.get::<i64>("n").unwrap()
}

fn fact(text: &str, confidence: f64) -> NewQueryFact {
    NewQueryFact {
        query_id: fingerprint(text),
        text: text.to_string(),
        is_true: true,
        confidence,
        verification_data: r#"{"verification":{"verdict":"TRUE"}}"#.to_string(),
    }
}

#[tokio::test]
async fn test_constraint_is_idempotent() {
    let Some(store) = test_store().await else { return };
    store.initialize().await.unwrap();
}

#[tokio::test]
async fn test_merge_overwrites_in_place() {
    let Some(store) = test_store().await else { return };

    store.upsert(&fact("neo4j: merge twice", 0.6)).await.unwrap();
    store.upsert(&fact("neo4j: merge twice", 0.8)).await.unwrap();

    let stored = store
        .fetch(&fingerprint("neo4j: merge twice"))
        .await
        .unwrap()
        .expect("node exists");
    assert_eq!(stored.confidence, 0.8);
    assert!(stored.is_true);
    assert_eq!(count_nodes(&store, &fingerprint("neo4j: merge twice")).await, 1);
    assert_eq!(
        store.lookup_truth(&fingerprint("neo4j: merge twice")).await.unwrap(),
        Some(true)
    );
}

#[tokio::test]
async fn test_lookup_missing_is_none() {
    let Some(store) = test_store().await else { return };
    assert_eq!(
        store.lookup_truth(&fingerprint("neo4j: never stored")).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_health_reports_version() {
    let Some(store) = test_store().await else { return };
    let version = store.health_check().await.unwrap();
    assert!(!version.is_empty());
}

#[tokio::test]
async fn test_concurrent_merges_leave_one_node() {
    let Some(store) = test_store().await else { return };
    let store = Arc::new(store);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .upsert(&fact("neo4j: concurrent merge", 0.5 + i as f64 / 100.0))
                    .await
            })
        })
        .collect();
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    assert_eq!(
        count_nodes(&store, &fingerprint("neo4j: concurrent merge")).await,
        1
    );
}

#[tokio::test]
async fn test_operations_after_close_fail_with_connect() {
    let Some(store) = test_store().await else { return };

    store.close().await;
    assert!(store.is_closed());
    assert!(matches!(store.graph(), Err(StoreError::Connect(_))));
    assert!(matches!(
        store.lookup_truth(&fingerprint("neo4j: after close")).await,
        Err(StoreError::Connect(_))
    ));
    assert!(matches!(
        store.upsert(&fact("neo4j: after close", 0.5)).await,
        Err(StoreError::Connect(_))
    ));
}
