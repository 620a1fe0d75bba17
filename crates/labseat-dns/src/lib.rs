//! DNS provider client for labseat.
//!
//! This crate talks to the DNS provider's zone records API:
//!
//! - Create, list and delete records with a bearer-token credential
//! - Delete-by-name, which selects the first `(name, type)` match in provider order
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Control plane   │────▶│   DnsProvider    │
//! │  (seats, API)    │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │ CloudflareClient │
//!                          │ (impl)           │
//!                          └────────┬─────────┘
//!                                   │ HTTPS
//!                          ┌────────▼─────────┐
//!                          │ zones/{zone}/    │
//!                          │ dns_records      │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use labseat_dns::{CloudflareClient, DnsConfig, DnsProvider, NewDnsRecord, RecordType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DnsConfig {
//!     zone_id: "023e105f4ecef8ad9ca31a8372d0c353".to_string(),
//!     api_token: "token".to_string(),
//!     ..DnsConfig::default()
//! };
//! let client = CloudflareClient::new(config)?;
//!
//! let record = client
//!     .create_record(&NewDnsRecord::a("doe-sfb.lab.infinigate.io", "198.51.100.4", 3600))
//!     .await?;
//!
//! client
//!     .delete_by_name_and_type(&record.name, &RecordType::A)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt;

use async_trait::async_trait;

pub mod client;
pub mod error;
pub mod matching;
pub mod types;

pub use client::CloudflareClient;
pub use error::{DnsError, Result};
pub use matching::select_record;
pub use types::{DnsRecord, NewDnsRecord, RecordType, DEFAULT_TTL};

/// Operations on the records of one DNS zone.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns `DnsError::Provider` if the provider rejects the record.
    async fn create_record(&self, record: &NewDnsRecord) -> Result<DnsRecord>;

    /// List every record in the zone, in provider order.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched.
    async fn list_records(&self) -> Result<Vec<DnsRecord>>;

    /// Delete a record by its provider ID.
    ///
    /// # Errors
    ///
    /// Returns `DnsError::RecordIdNotFound` if the provider has no such record.
    async fn delete_record(&self, record_id: &str) -> Result<()>;

    /// Delete the first record named `name` with type `record_type`.
    ///
    /// Exactly one delete call is issued, for the selected record; it is not
    /// re-checked afterwards. Returns the ID of the deleted record.
    ///
    /// # Errors
    ///
    /// Returns `DnsError::RecordNotFound` (and deletes nothing) when no record
    /// matches.
    async fn delete_by_name_and_type(&self, name: &str, record_type: &RecordType) -> Result<String> {
        let records = self.list_records().await?;
        let record_id = select_record(&records, name, record_type)?.id.clone();
        self.delete_record(&record_id).await?;
        Ok(record_id)
    }
}

/// Configuration for the DNS provider.
#[derive(Clone)]
pub struct DnsConfig {
    /// API base URL (e.g., `https://api.cloudflare.com/client/v4`).
    pub base_url: String,
    /// Zone holding the lab records.
    pub zone_id: String,
    /// Bearer token used for every call.
    pub api_token: String,
    /// TTL for records created without an explicit one.
    pub default_ttl: u32,
    /// Page size when listing records.
    pub per_page: u32,
    /// Timeout for each provider request, in seconds.
    pub request_timeout_seconds: u64,
}

impl DnsConfig {
    /// Get the zone records endpoint URL.
    #[must_use]
    pub fn records_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records",
            self.base_url.trim_end_matches('/'),
            self.zone_id
        )
    }

    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `CF_API_KEY`: bearer token (required)
    /// - `CF_ZONE_ID`: zone identifier (required)
    /// - `CF_API_BASE_URL`: API base URL
    /// - `DNS_DEFAULT_TTL`: TTL for new records
    ///
    /// # Errors
    ///
    /// Returns `DnsError::Config` if a required variable is missing or a
    /// numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            api_token: required_env("CF_API_KEY")?,
            zone_id: required_env("CF_ZONE_ID")?,
            ..Self::default()
        };

        if let Ok(val) = std::env::var("CF_API_BASE_URL") {
            config.base_url = val;
        }
        if let Ok(val) = std::env::var("DNS_DEFAULT_TTL") {
            config.default_ttl = val
                .parse()
                .map_err(|_| DnsError::Config(format!("DNS_DEFAULT_TTL is not a number: {val}")))?;
        }

        Ok(config)
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| DnsError::Config(format!("{name} must be set")))
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
            zone_id: String::new(),
            api_token: String::new(),
            default_ttl: DEFAULT_TTL,
            per_page: 100,
            request_timeout_seconds: 30,
        }
    }
}

impl fmt::Debug for DnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsConfig")
            .field("base_url", &self.base_url)
            .field("zone_id", &self.zone_id)
            .field("api_token", &"[redacted]")
            .field("default_ttl", &self.default_ttl)
            .field("per_page", &self.per_page)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}
