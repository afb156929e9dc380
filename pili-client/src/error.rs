//! Client error types
//!
//! Wraps the semantic [`ApiError`] and the caller-misuse [`ArgumentError`]
//! from `pili-core`, plus the failures that only exist once bytes move.

use pili_core::{ApiError, ArgumentError, ErrorKind};
use thiserror::Error;

/// Maximum response body size accepted from the API (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },
}

impl ClientError {
    /// Semantic kind for API failures, `None` for local errors.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(err) => Some(err.kind()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_exists(&self) -> bool {
        matches!(self, Self::Api(err) if pili_core::is_not_exists(err))
    }

    #[must_use]
    pub fn is_exists(&self) -> bool {
        matches!(self, Self::Api(err) if pili_core::is_exists(err))
    }
}

/// True if `err` reports a missing stream.
#[must_use]
pub fn is_not_exists(err: &ClientError) -> bool {
    err.is_not_exists()
}

/// True if `err` reports an already existing stream.
#[must_use]
pub fn is_exists(err: &ClientError) -> bool {
    err.is_exists()
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(ApiError::Transport(err.to_string()))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for ClientError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidArgument(ArgumentError::InvalidUrl(err.to_string()))
    }
}
