//! Error types for Cellar Core

use thiserror::Error;

/// Longest response body excerpt kept in a [`FetchError::BadStatus`].
const BODY_EXCERPT_CHARS: usize = 512;

#[derive(Error, Debug)]
pub enum CellarError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid notice type code: {0}")]
    InvalidNoticeType(String),

    #[error("Query profile {profile} does not support a notice-type filter")]
    UnsupportedFilter { profile: String },

    #[error("Generated SPARQL does not parse: {0}")]
    QuerySyntax(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure talking to a remote endpoint.
///
/// Every variant names the endpoint it came from. None of them is ever turned
/// into an empty table or a zero count by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, TLS or timeout failure; no usable HTTP response.
    #[error("Transport error for {endpoint}: {message}")]
    Transport {
        endpoint: String,
        message: String,
        timed_out: bool,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("{endpoint} answered HTTP {status}: {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The body arrived but is not the expected JSON shape.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedBody { endpoint: String, reason: String },
}

impl FetchError {
    pub fn transport(endpoint: &str, err: &reqwest::Error) -> Self {
        FetchError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    pub fn bad_status(endpoint: &str, status: u16, body: &str) -> Self {
        FetchError::BadStatus {
            endpoint: endpoint.to_string(),
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        FetchError::MalformedBody {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request could succeed.
    ///
    /// Transport failures, rate limiting (429) and server errors (5xx) are
    /// retryable. Client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::BadStatus { status, .. } => *status == 429 || *status >= 500,
            FetchError::MalformedBody { .. } => false,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::BadStatus { endpoint, .. }
            | FetchError::MalformedBody { endpoint, .. } => endpoint,
        }
    }
}

pub type Result<T> = std::result::Result<T, CellarError>;
