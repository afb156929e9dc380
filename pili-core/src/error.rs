//! Error types
//!
//! Two families that callers must never confuse:
//! - [`ArgumentError`]: the caller misused the SDK (empty keys, bad TTL, ...)
//! - [`ApiError`]: the server (or the transport in front of it) rejected a request
//!
//! [`classify`] turns an HTTP status plus the API call context into an
//! [`ApiError`]. It never inspects message text.

use serde::Deserialize;
use thiserror::Error;

/// Stream already exists.
pub const CODE_STREAM_EXISTS: u16 = 614;
/// Stream not found.
pub const CODE_STREAM_NOT_FOUND: u16 = 612;
/// No live session, or no recorded data in the requested range.
pub const CODE_NO_DATA: u16 = 619;
/// Referenced resource not found (a pipeline, for recording calls).
pub const CODE_RESOURCE_NOT_FOUND: u16 = 404;

/// Caller contract violation, raised before anything is signed or sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("access key must not be empty")]
    EmptyAccessKey,

    #[error("secret key must not be empty")]
    EmptySecretKey,

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("expiry must be a positive number of seconds, got {0}")]
    NonPositiveTtl(i64),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Semantic kind of an [`ApiError`]. Callers branch on this, never on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    NoActiveLiveSession,
    NoRecordedData,
    PipelineNotFound,
    Api,
    Transport,
}

/// Which API call produced a response; some status codes mean different
/// things depending on the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiContext {
    #[default]
    General,
    /// `GET .../live`
    LiveStatus,
    /// `saveas`, `snapshot` and friends
    Recording,
}

/// Closed set of failures reported by the Pili API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("already exists (status {status}): {message}")]
    AlreadyExists { status: u16, message: String },

    #[error("not found (status {status}): {message}")]
    NotFound { status: u16, message: String },

    #[error("no live")]
    NoActiveLiveSession { status: u16, message: String },

    #[error("no data")]
    NoRecordedData { status: u16, message: String },

    #[error("no such pipeline")]
    PipelineNotFound { status: u16, message: String },

    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),
}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NoActiveLiveSession { .. } => ErrorKind::NoActiveLiveSession,
            Self::NoRecordedData { .. } => ErrorKind::NoRecordedData,
            Self::PipelineNotFound { .. } => ErrorKind::PipelineNotFound,
            Self::Api { .. } => ErrorKind::Api,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Originating HTTP status, `None` for transport failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AlreadyExists { status, .. }
            | Self::NotFound { status, .. }
            | Self::NoActiveLiveSession { status, .. }
            | Self::NoRecordedData { status, .. }
            | Self::PipelineNotFound { status, .. } => Some(*status),
            Self::Api { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }

    /// Server-supplied message, for diagnostics only.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::AlreadyExists { message, .. }
            | Self::NotFound { message, .. }
            | Self::NoActiveLiveSession { message, .. }
            | Self::NoRecordedData { message, .. }
            | Self::PipelineNotFound { message, .. }
            | Self::Api { message, .. }
            | Self::Transport(message) => message,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// Extract a human readable message from an error response body.
///
/// Pili answers `{"error": "..."}`; anything else is returned as lossy text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.is_empty() => parsed.error,
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// Map a non-2xx API response to its semantic error.
#[must_use]
pub fn classify(context: ApiContext, status: u16, body: &[u8]) -> ApiError {
    let message = error_message(body);
    match (status, context) {
        (CODE_STREAM_EXISTS, _) => ApiError::AlreadyExists { status, message },
        (CODE_STREAM_NOT_FOUND, _) => ApiError::NotFound { status, message },
        (CODE_NO_DATA, ApiContext::LiveStatus) => ApiError::NoActiveLiveSession { status, message },
        (CODE_NO_DATA, ApiContext::Recording) => ApiError::NoRecordedData { status, message },
        (CODE_RESOURCE_NOT_FOUND, ApiContext::Recording) => {
            ApiError::PipelineNotFound { status, message }
        }
        _ => ApiError::Api { code: status, message },
    }
}

/// True only for [`ErrorKind::NotFound`].
#[must_use]
pub fn is_not_exists(err: &ApiError) -> bool {
    err.kind() == ErrorKind::NotFound
}

/// True only for [`ErrorKind::AlreadyExists`].
#[must_use]
pub fn is_exists(err: &ApiError) -> bool {
    err.kind() == ErrorKind::AlreadyExists
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXTS: [ApiContext; 3] = [
        ApiContext::General,
        ApiContext::LiveStatus,
        ApiContext::Recording,
    ];

    #[test]
    fn test_classify_exists_and_not_found_any_context() {
        for ctx in CONTEXTS {
            assert_eq!(classify(ctx, 614, b"").kind(), ErrorKind::AlreadyExists);
            assert_eq!(classify(ctx, 612, b"").kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn test_classify_no_data_depends_on_context() {
        assert_eq!(
            classify(ApiContext::LiveStatus, 619, b"").kind(),
            ErrorKind::NoActiveLiveSession
        );
        assert_eq!(
            classify(ApiContext::Recording, 619, b"").kind(),
            ErrorKind::NoRecordedData
        );
        assert_eq!(classify(ApiContext::General, 619, b"").kind(), ErrorKind::Api);
    }

    #[test]
    fn test_classify_pipeline_not_found() {
        let err = classify(ApiContext::Recording, 404, br#"{"error":"no such pipeline"}"#);
        assert_eq!(err.kind(), ErrorKind::PipelineNotFound);
        assert_eq!(classify(ApiContext::General, 404, b"").kind(), ErrorKind::Api);
    }

    #[test]
    fn test_classify_unmapped_codes_are_generic() {
        for status in [400, 401, 403, 500, 502, 503, 599, 611, 615, 999] {
            for ctx in CONTEXTS {
                let err = classify(ctx, status, b"boom");
                assert_eq!(err.kind(), ErrorKind::Api);
                assert_eq!(err.status(), Some(status));
            }
        }
    }

    #[test]
    fn test_classify_ignores_message_text() {
        // A message that reads like "exists" does not change the kind.
        let err = classify(ApiContext::General, 500, br#"{"error":"stream already exists"}"#);
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(!is_exists(&err));
    }

    #[test]
    fn test_error_message_extraction() {
        let err = classify(ApiContext::General, 612, br#"{"error":"stream not found"}"#);
        assert_eq!(err.message(), "stream not found");
        assert_eq!(err.status(), Some(612));

        let err = classify(ApiContext::General, 500, b"  upstream timeout \n");
        assert_eq!(err.message(), "upstream timeout");

        let err = classify(ApiContext::General, 500, br#"{"other":"x"}"#);
        assert_eq!(err.message(), r#"{"other":"x"}"#);
    }

    #[test]
    fn test_predicates() {
        let not_found = classify(ApiContext::General, 612, b"");
        let exists = classify(ApiContext::General, 614, b"");
        let transport = ApiError::Transport("connection refused".to_string());

        assert!(is_not_exists(&not_found));
        assert!(!is_exists(&not_found));
        assert!(is_exists(&exists));
        assert!(!is_not_exists(&exists));
        assert!(!is_exists(&transport));
        assert!(!is_not_exists(&transport));
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Api { code: 401, message: "bad token".to_string() };
        assert_eq!(err.to_string(), "API error (code 401): bad token");
        assert_eq!(classify(ApiContext::Recording, 404, b"").to_string(), "no such pipeline");
        assert_eq!(classify(ApiContext::LiveStatus, 619, b"").to_string(), "no live");
        assert_eq!(
            ArgumentError::NonPositiveTtl(0).to_string(),
            "expiry must be a positive number of seconds, got 0"
        );
    }
}
