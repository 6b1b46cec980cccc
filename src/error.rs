//! Error types shared by the API client, codec, and sync pipeline.

use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network or protocol failure before an HTTP status was received
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered 404. Often treated as an empty collection.
    #[error("{url} was not found")]
    NotFound { url: String },

    /// Any non-404 HTTP error status
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// A response body could not be decoded into the expected shape
    #[error("could not decode response from {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GraphQL query {query} failed: {message}")]
    GraphQl { query: String, message: String },

    /// A flat-file row is missing or has an unparseable required field
    #[error("line {line}: invalid {column} value {value:?}")]
    MalformedRow {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// A flat-file row whose bytes are not UTF-8; `field` counts from 1
    #[error("line {line}: field {field} is not valid UTF-8")]
    InvalidEncoding { line: u64, field: usize },

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("no usable credential for {host}: {reason}")]
    AuthResolution { host: String, reason: String },

    #[error("repository {owner}/{name} not found or not accessible")]
    RepoNotFound { owner: String, name: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the remote reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for HTTP 409, which the variables API uses for "already exists"
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Status { status: 409, .. })
    }
}
