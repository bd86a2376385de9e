//! Error types for forcedata-rest.

/// Result type alias for forcedata-rest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for forcedata-rest operations.
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
    /// Caller misuse: unknown field, missing credential combination, rows
    /// that cannot be typed.
    #[error("Argument error: {0}")]
    Argument(String),

    /// Non-success response from the remote store.
    #[error("Remote error ({status}): {error_code} - {message}")]
    Remote {
        status: u16,
        error_code: String,
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport failure below the HTTP status layer.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<forcedata_client::Error> for Error {
    fn from(err: forcedata_client::Error) -> Self {
        use forcedata_client::ErrorKind as Client;

        let kind = match err.kind {
            Client::Argument(message) => ErrorKind::Argument(message),
            Client::Remote {
                status,
                error_code,
                message,
            } => ErrorKind::Remote {
                status,
                error_code,
                message,
            },
            Client::Json(message) => ErrorKind::Json(message),
            Client::Timeout => ErrorKind::Transport("request timeout".to_string()),
            Client::Connection(message)
            | Client::Config(message)
            | Client::Other(message) => ErrorKind::Transport(message),
        };

        Self {
            kind,
            source: err.source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Json(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
