//! Error types for the control plane.
//!
//! This module defines all errors that can occur while provisioning seats,
//! managing proxy configuration and operating on the user directory.

use labseat_core::{IdError, UserId};
use labseat_dns::DnsError;
use labseat_store::StoreError;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors raised by the proxy config writer.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No configuration file exists for this server name.
    #[error("no proxy config for {0}")]
    NotFound(String),

    /// The server name cannot be used as a config file name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// The upstream address cannot be placed in a server block.
    #[error("invalid proxy_pass: {0}")]
    InvalidProxyPass(String),

    /// Reading or writing the config directory failed.
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The proxy server refused to reload.
    #[error("proxy reload failed: {0}")]
    Reload(String),
}

/// Errors that can occur in control plane operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// DNS provider error.
    #[error("dns error: {0}")]
    Dns(#[from] DnsError),

    /// Proxy configuration error.
    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A seat or user identifier is malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// The VM address did not appear in time.
    #[error("no IP address obtained within {seconds} seconds")]
    Timeout {
        /// Number of checks (one per poll interval) that were made.
        seconds: u64,
    },

    /// The requested user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A user with this ID already exists.
    #[error("user already exists: {0}")]
    UserExists(UserId),

    /// The request is well-formed JSON but semantically invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ControlError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Dns(DnsError::RecordNotFound { .. } | DnsError::RecordIdNotFound(_))
            | Self::Proxy(ProxyError::NotFound(_))
            | Self::Store(StoreError::NotFound)
            | Self::UserNotFound(_) => 404,
            Self::Proxy(ProxyError::InvalidServerName(_) | ProxyError::InvalidProxyPass(_))
            | Self::InvalidId(_)
            | Self::InvalidRequest(_) => 400,
            Self::Store(StoreError::Conflict) | Self::UserExists(_) => 409,
            Self::Dns(
                DnsError::Provider { .. } | DnsError::Http(_) | DnsError::InvalidResponse(_),
            ) => 502,
            Self::Timeout { .. } => 504,
            Self::Dns(DnsError::Config(_))
            | Self::Proxy(ProxyError::Io(_) | ProxyError::Reload(_))
            | Self::Store(_) => 500,
        }
    }

    /// Returns true if the addressed resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.http_status_code() == 404
    }
}
