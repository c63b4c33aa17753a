use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted Query fact: one node per claim fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueryFact {
    pub query_id: String,
    pub text: String,
    pub is_true: bool,
    pub confidence: f64,
    /// Canonical JSON of the full verification result.
    pub verification_data: String,
    pub timestamp: DateTime<Utc>,
}

/// Field values written by an upsert. The store assigns `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueryFact {
    pub query_id: String,
    pub text: String,
    pub is_true: bool,
    pub confidence: f64,
    pub verification_data: String,
}

impl NewQueryFact {
    pub(crate) fn into_fact(self, timestamp: DateTime<Utc>) -> QueryFact {
        QueryFact {
            query_id: self.query_id,
            text: self.text,
            is_true: self.is_true,
            confidence: self.confidence,
            verification_data: self.verification_data,
            timestamp,
        }
    }
}
