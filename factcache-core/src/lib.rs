pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod store;
pub mod verifier;

pub use config::{FactCacheConfig, StoreBackend, StoreConfig, VerifierConfig};
pub use error::{FactCacheError, NormalizationError, StoreError, VerifierError};
pub use fingerprint::fingerprint;
pub use models::{NewQueryFact, QueryFact, Verdict, VerificationSummary};
pub use normalize::{normalize, NumArray, NumScalar, Payload};
pub use orchestrator::{FactCache, Resolution};
pub use store::{create_store, FactStore, GraphFactStore, MemoryFactStore, PgFactStore};
pub use verifier::{create_verifier, ClaimVerifier, HttpClaimVerifier};
