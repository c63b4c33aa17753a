use thiserror::Error;

/// Boxed driver error kept as the `source` of store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised by a fact store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connect(#[source] BoxError),

    #[error("Store write failed for query {query_id}: {source}")]
    Write {
        query_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Store read failed for query {query_id}: {source}")]
    Read {
        query_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Schema initialization failed: {0}")]
    Schema(#[source] BoxError),
}

impl StoreError {
    pub fn connect(e: impl Into<BoxError>) -> Self {
        StoreError::Connect(e.into())
    }

    pub fn write(query_id: &str, e: impl Into<BoxError>) -> Self {
        StoreError::Write {
            query_id: query_id.to_string(),
            source: e.into(),
        }
    }

    pub fn read(query_id: &str, e: impl Into<BoxError>) -> Self {
        StoreError::Read {
            query_id: query_id.to_string(),
            source: e.into(),
        }
    }

    pub fn schema(e: impl Into<BoxError>) -> Self {
        StoreError::Schema(e.into())
    }
}

/// A payload value that has no canonical representation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("Non-finite float at {path}")]
    NonFiniteFloat { path: String },

    #[error("Payload nested deeper than {limit} levels at {path}")]
    TooDeep { path: String, limit: usize },
}

/// Failures of the external verification service.
#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Verifier API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Malformed verifier response: {0}")]
    MalformedResponse(String),

    #[error("Missing verifier endpoint")]
    MissingEndpoint,
}

impl VerifierError {
    /// Whether a transport retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            VerifierError::Http(e) => e.is_timeout() || e.is_connect(),
            VerifierError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum FactCacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Verifier(#[from] VerifierError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
