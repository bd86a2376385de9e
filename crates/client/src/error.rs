//! Error types for forcedata-client.

/// Result type alias for forcedata-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forcedata-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for caller-misuse errors.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument(message.into()))
    }

    /// Returns true if this is a caller-misuse error.
    pub fn is_argument(&self) -> bool {
        matches!(self.kind, ErrorKind::Argument(_))
    }

    /// Returns true if this error wraps a non-success remote response.
    pub fn is_remote(&self) -> bool {
        matches!(self.kind, ErrorKind::Remote { .. })
    }

    /// The HTTP status of the remote failure, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Remote { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Caller misuse: missing credential combination, unknown field, bad input.
    /// Raised synchronously and never retried.
    #[error("Argument error: {0}")]
    Argument(String),

    /// Non-success response from the remote store, with the error code and
    /// message parsed from the response body.
    #[error("Remote error ({status}): {error_code} - {message}")]
    Remote {
        status: u16,
        error_code: String,
        message: String,
    },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Wire shape of OAuth-style error bodies: `{"error": ..., "error_description": ...}`.
#[derive(Debug, serde::Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Wire shape of REST-style error bodies: `{"errorCode": ..., "message": ...}`,
/// usually inside a one-element array.
#[derive(Debug, serde::Deserialize)]
struct RestErrorBody {
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(default)]
    message: String,
}

/// Translate a non-success response body into a `Remote` error.
///
/// The remote store answers with one of two body shapes depending on the
/// endpoint: the OAuth token endpoint returns a single object with
/// `error`/`error_description` keys, while the data endpoints return an
/// array of objects with `errorCode`/`message` keys. Both are supported;
/// anything else keeps the raw body as the message.
pub fn remote_error(status: u16, body: &str) -> Error {
    if let Ok(errors) = serde_json::from_str::<Vec<RestErrorBody>>(body) {
        if let Some(err) = errors.into_iter().next() {
            return Error::new(ErrorKind::Remote {
                status,
                error_code: err.error_code,
                message: err.message,
            });
        }
    }

    if let Ok(err) = serde_json::from_str::<RestErrorBody>(body) {
        return Error::new(ErrorKind::Remote {
            status,
            error_code: err.error_code,
            message: err.message,
        });
    }

    if let Ok(err) = serde_json::from_str::<OAuthErrorBody>(body) {
        return Error::new(ErrorKind::Remote {
            status,
            error_code: err.error,
            message: err.error_description,
        });
    }

    Error::new(ErrorKind::Remote {
        status,
        error_code: status.to_string(),
        message: body.to_string(),
    })
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}
