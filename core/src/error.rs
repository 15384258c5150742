//! Error types for the generation-service client.
//!
//! # Design
//! Every stage of the pipeline reports through one `ApiError` so callers get
//! a single type from `get` / `post`. Upstream failures keep the status code
//! for inspection, but their `Display` is exactly the response body, which is
//! the only diagnostic the service provides.

use thiserror::Error;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be built, e.g. the URL does not parse.
    #[error("request construction failed: {0}")]
    RequestConstruction(String),

    /// The server could not be reached or the exchange failed mid-flight.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be read to the end.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] std::io::Error),

    /// The server answered with a status other than 200.
    #[error("{body}")]
    Upstream { status: u16, body: String },

    /// The combined credential string is not of the form `"user, password"`.
    #[error("malformed credentials: expected \"username, password\"")]
    MalformedCredentials,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Status code of an upstream failure, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
