use basketiq_core::StoreError;
use thiserror::Error;

/// Why a single listing could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("listing is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("listing has invalid price {0}")]
    InvalidPrice(f64),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("limit must be between 1 and 1000, got {0}")]
    InvalidLimit(i64),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
