//! Error types for directory operations
//!
//! Every error raised by a directory backend maps onto an [`ErrorKind`]. The
//! decorator layers use the kind to decide whether a failure is transient and
//! never translate one kind into another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Main error type for directory operations
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Connection error - the backend dropped or refused the connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_seconds}s: {context}")]
    Timeout {
        timeout_seconds: u64,
        context: String,
    },

    /// Transport-level failure (RPC/COM style errors from the client library)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request was rejected as invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// The addressed entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The bound account lacks rights for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// An entity with the same identity already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// No credentials were supplied before the first directory call
    #[error("Domain credentials not set, configure the connection first")]
    CredentialsNotSet,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A transient failure that persisted through every retry attempt
    #[error("Gave up after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<DirectoryError>,
    },

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Classification of [`DirectoryError`] used for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Timeout,
    Transport,
    Validation,
    NotFound,
    PermissionDenied,
    Authentication,
    AlreadyExists,
    Configuration,
    Serialization,
    Other,
}

impl ErrorKind {
    /// Kinds that are retried unless configured otherwise
    pub const DEFAULT_TRANSIENT: [ErrorKind; 3] =
        [ErrorKind::Connection, ErrorKind::Timeout, ErrorKind::Transport];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Authentication => "authentication",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Other => "other",
        }
    }

    /// Whether this kind belongs to the default transient set
    pub fn is_transient(&self) -> bool {
        Self::DEFAULT_TRANSIENT.contains(self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "connection" => ErrorKind::Connection,
            "timeout" => ErrorKind::Timeout,
            "transport" => ErrorKind::Transport,
            "validation" => ErrorKind::Validation,
            "not_found" => ErrorKind::NotFound,
            "permission_denied" => ErrorKind::PermissionDenied,
            "authentication" => ErrorKind::Authentication,
            "already_exists" => ErrorKind::AlreadyExists,
            "configuration" => ErrorKind::Configuration,
            "serialization" => ErrorKind::Serialization,
            "other" => ErrorKind::Other,
            unknown => {
                return Err(DirectoryError::Config(format!(
                    "unknown error kind '{}'",
                    unknown
                )))
            }
        };
        Ok(kind)
    }
}

impl DirectoryError {
    /// The kind of this error. Retry wrappers report the kind of the error they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::Connection(_) => ErrorKind::Connection,
            DirectoryError::Timeout { .. } => ErrorKind::Timeout,
            DirectoryError::Transport(_) => ErrorKind::Transport,
            DirectoryError::Validation(_) => ErrorKind::Validation,
            DirectoryError::NotFound { .. } => ErrorKind::NotFound,
            DirectoryError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            DirectoryError::Authentication(_) => ErrorKind::Authentication,
            DirectoryError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            DirectoryError::CredentialsNotSet | DirectoryError::Config(_) => {
                ErrorKind::Configuration
            }
            DirectoryError::Serialization(_) => ErrorKind::Serialization,
            DirectoryError::RetriesExhausted { source, .. } => source.kind(),
            DirectoryError::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether the default policy would retry this error
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// Number of attempts made before this error surfaced, if it came out of a retry loop
    pub fn attempts(&self) -> Option<u32> {
        match self {
            DirectoryError::RetriesExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// The innermost error, skipping retry context
    pub fn root(&self) -> &DirectoryError {
        match self {
            DirectoryError::RetriesExhausted { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Serialization(e.to_string())
    }
}

impl From<String> for DirectoryError {
    fn from(s: String) -> Self {
        DirectoryError::Other(s)
    }
}

impl From<&str> for DirectoryError {
    fn from(s: &str) -> Self {
        DirectoryError::Other(s.to_string())
    }
}
