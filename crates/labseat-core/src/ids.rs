//! Core identifier types for labseat.
//!
//! This module provides strongly-typed identifiers for users and seats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain suffix appended to seat hostnames when none is configured.
pub const DEFAULT_SEAT_DOMAIN: &str = "lab.infinigate.io";

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a full hostname.
const MAX_NAME_LEN: usize = 253;

/// A user identifier (UUID format).
///
/// User documents are keyed by this ID in the document store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(uuid::Uuid);

impl UserId {
    /// Create a new `UserId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random `UserId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Return the bytes of the UUID.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.to_string()
    }
}

impl AsRef<[u8]> for UserId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A validated, fully-qualified hostname served by the reverse proxy.
///
/// Seat hostnames are derived as `{last_name}-{training_name}.{domain}`; the
/// same type names the proxy config file (`{server_name}.conf`) and the DNS
/// record, so it never contains path separators or empty labels.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(String);

impl ServerName {
    /// Parse and validate a hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, too long, or contains a label
    /// that is not made of ASCII letters, digits and inner hyphens.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() || s.len() > MAX_NAME_LEN {
            return Err(IdError::InvalidHostname(s.to_string()));
        }
        if !s.split('.').all(is_valid_label) {
            return Err(IdError::InvalidHostname(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Derive the seat hostname for a trainee and a training.
    ///
    /// Both parts are lower-cased; the result is
    /// `{last_name}-{training_name}.{domain}`.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or the resulting hostname is
    /// not valid.
    pub fn for_seat(last_name: &str, training_name: &str, domain: &str) -> Result<Self, IdError> {
        let last_name = last_name.trim();
        let training_name = training_name.trim();
        if last_name.is_empty() {
            return Err(IdError::EmptySeatPart("last_name"));
        }
        if training_name.is_empty() {
            return Err(IdError::EmptySeatPart("training_name"));
        }
        Self::parse(&format!("{last_name}-{training_name}.{domain}"))
    }

    /// Return the hostname as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the proxy configuration file for this host.
    #[must_use]
    pub fn config_file_name(&self) -> String {
        format!("{}.conf", self.0)
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl fmt::Debug for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerName({})", self.0)
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ServerName {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ServerName {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServerName> for String {
    fn from(name: ServerName) -> Self {
        name.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid hostname.
    #[error("invalid hostname: {0:?}")]
    InvalidHostname(String),

    /// A seat component was empty.
    #[error("{0} must not be empty")]
    EmptySeatPart(&'static str),
}
