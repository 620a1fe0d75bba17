//! DNS provider error types.

use thiserror::Error;

use crate::types::RecordType;

/// A result type using `DnsError`.
pub type Result<T> = std::result::Result<T, DnsError>;

/// Errors that can occur while talking to the DNS provider.
#[derive(Debug, Error)]
pub enum DnsError {
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Error text reported by the provider.
        message: String,
    },

    /// No record matched the requested name and type.
    #[error("no {record_type} record named {name}")]
    RecordNotFound {
        /// Queried record name.
        name: String,
        /// Queried record type.
        record_type: RecordType,
    },

    /// The provider has no record with this ID.
    #[error("record {0} not found")]
    RecordIdNotFound(String),

    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Http(String),

    /// The provider answered with a body that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DnsError {
    /// Returns true if the error means the addressed record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::RecordIdNotFound(_))
    }
}

impl From<reqwest::Error> for DnsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
