//! Request and response types for control plane operations.
//!
//! These types define the API contracts for seats, DNS records and users.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

use labseat_core::{ServerName, UserId, DEFAULT_SEAT_DOMAIN};
use labseat_dns::DEFAULT_TTL;
use labseat_store::{Gender, Role, User};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, Result};

/// Identifies a training seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRequest {
    /// Trainee's last name.
    pub last_name: String,
    /// Short name of the training.
    pub training_name: String,
}

impl SeatRequest {
    /// Create a new seat request.
    #[must_use]
    pub fn new(last_name: impl Into<String>, training_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            training_name: training_name.into(),
        }
    }
}

/// A provisioned seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Public hostname of the seat.
    pub server_name: ServerName,
    /// Address the seat VM obtained.
    pub address: IpAddr,
    /// Upstream the proxy routes the hostname to.
    pub proxy_pass: String,
    /// Provider ID of the published DNS record.
    pub dns_record_id: String,
}

/// Result of one teardown step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The resource was removed.
    Deleted {
        /// What was removed.
        detail: String,
    },
    /// The step failed; the resource may still exist.
    Failed {
        /// Why the step failed.
        error: String,
    },
}

impl StepOutcome {
    /// Returns true if the step succeeded.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Outcome of a seat deletion. Both steps are always attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTeardown {
    /// Hostname of the seat.
    pub server_name: ServerName,
    /// DNS record removal.
    pub dns: StepOutcome,
    /// Proxy config removal.
    pub proxy: StepOutcome,
}

impl SeatTeardown {
    /// Returns true if every step succeeded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.dns.is_deleted() && self.proxy.is_deleted()
    }
}

/// Request to create an A record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDnsRecordRequest {
    /// Fully qualified record name.
    pub name: String,
    /// IPv4 address the record points at.
    pub content: String,
    /// Record TTL in seconds. Uses the configured default if not provided.
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Explicit ID. A fresh one is generated when omitted.
    #[serde(default)]
    pub id: Option<UserId>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Mail address.
    pub mail: String,
    /// Gender.
    pub gender: Gender,
    /// Assigned roles.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl CreateUserRequest {
    /// Validate the request and build the user document.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidRequest` if a required field is blank.
    pub fn into_user(self) -> Result<User> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("mail", &self.mail),
        ] {
            if value.trim().is_empty() {
                return Err(ControlError::InvalidRequest(format!("{field} must not be empty")));
            }
        }

        Ok(User {
            id: self.id.unwrap_or_else(UserId::generate),
            first_name: self.first_name,
            last_name: self.last_name,
            middle_name: self.middle_name,
            mail: self.mail,
            gender: self.gender,
            roles: self.roles,
        })
    }
}

/// Configuration for seat provisioning.
#[derive(Debug, Clone)]
pub struct SeatConfig {
    /// Domain seat hostnames are created under.
    pub seat_domain: String,
    /// Scheme of the upstream URL written into proxy configs.
    pub upstream_scheme: String,
    /// Port the seat VM serves on.
    pub upstream_port: u16,
    /// Public ingress address published in DNS. The VM address when `None`.
    pub dns_target: Option<IpAddr>,
    /// TTL for published records.
    pub dns_ttl: u32,
    /// Number of address checks before giving up.
    pub ip_wait_timeout_seconds: u64,
    /// Pause after each unsuccessful address check.
    pub poll_interval: Duration,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            seat_domain: DEFAULT_SEAT_DOMAIN.to_string(),
            upstream_scheme: "http".to_string(),
            upstream_port: 8080,
            dns_target: None,
            dns_ttl: DEFAULT_TTL,
            ip_wait_timeout_seconds: 300, // 5 minutes
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl SeatConfig {
    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `SEAT_DOMAIN`
    /// - `SEAT_UPSTREAM_SCHEME`
    /// - `SEAT_UPSTREAM_PORT`
    /// - `SEAT_DNS_TARGET`
    /// - `SEAT_IP_WAIT_SECONDS`
    /// - `SEAT_POLL_INTERVAL_MS`
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SEAT_DOMAIN") {
            config.seat_domain = val;
        }
        if let Ok(val) = std::env::var("SEAT_UPSTREAM_SCHEME") {
            config.upstream_scheme = val;
        }
        if let Ok(val) = std::env::var("SEAT_UPSTREAM_PORT") {
            if let Ok(port) = val.parse() {
                config.upstream_port = port;
            }
        }
        if let Ok(val) = std::env::var("SEAT_DNS_TARGET") {
            if let Ok(address) = val.parse() {
                config.dns_target = Some(address);
            }
        }
        if let Ok(val) = std::env::var("SEAT_IP_WAIT_SECONDS") {
            if let Ok(n) = val.parse() {
                config.ip_wait_timeout_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("SEAT_POLL_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                config.poll_interval = Duration::from_millis(ms);
            }
        }

        config
    }

    /// Upstream URL for a seat VM at `address`.
    #[must_use]
    pub fn proxy_pass(&self, address: IpAddr) -> String {
        let authority = std::net::SocketAddr::new(address, self.upstream_port);
        format!("{}://{authority}", self.upstream_scheme)
    }

    /// Longest time an IP wait can take. Saturates instead of overflowing.
    #[must_use]
    pub fn ip_wait_budget(&self) -> Duration {
        let checks = u32::try_from(self.ip_wait_timeout_seconds).unwrap_or(u32::MAX);
        self.poll_interval.saturating_mul(checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seat_config_defaults() {
        let config = SeatConfig::default();
        assert_eq!(config.seat_domain, "lab.infinigate.io");
        assert_eq!(config.upstream_port, 8080);
        assert_eq!(config.ip_wait_timeout_seconds, 300);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.dns_target.is_none());
    }

    #[test]
    fn ip_wait_budget_saturates() {
        let config = SeatConfig::default();
        assert_eq!(config.ip_wait_budget(), Duration::from_secs(300));

        let huge = SeatConfig {
            ip_wait_timeout_seconds: u64::MAX,
            poll_interval: Duration::from_millis(u64::MAX),
            ..SeatConfig::default()
        };
        assert_eq!(huge.ip_wait_budget(), Duration::MAX);
    }

    #[test]
        fn proxy_pass_formats_addresses() {
        let config = SeatConfig::default();
        assert_eq!(
            config.proxy_pass("10.0.0.7".parse().unwrap()),
            "http://10.0.0.7:8080"
        );
        assert_eq!(
            config.proxy_pass("2001:db8::7".parse().unwrap()),
            "http://[2001:db8::7]:8080"
        );
    }

    #[test]
    fn teardown_serializes_both_outcomes() {
        let teardown = SeatTeardown {
            server_name: ServerName::parse("doe-sfb.lab.io").unwrap(),
            dns: StepOutcome::Failed {
                error: "no A record named doe-sfb.lab.io".into(),
            },
            proxy: StepOutcome::Deleted {
                detail: "doe-sfb.lab.io.conf".into(),
            },
        };

        assert!(!teardown.is_complete());
        assert_eq!(
            serde_json::to_value(&teardown).unwrap(),
            json!({
                "server_name": "doe-sfb.lab.io",
                "dns": { "status": "failed", "error": "no A record named doe-sfb.lab.io" },
                "proxy": { "status": "deleted", "detail": "doe-sfb.lab.io.conf" }
            })
        );
    }

    #[test]
    fn create_user_generates_distinct_ids() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "mail": "jane@example.com",
            "gender": "female",
            "roles": ["student"]
        }))
        .unwrap();

        let first = request.clone().into_user().unwrap();
        let second = request.into_user().unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.roles.contains(&Role::Student));
        assert!(first.middle_name.is_none());
    }

    #[test]
    fn create_user_keeps_explicit_id() {
        let id = UserId::generate();
        let request: CreateUserRequest = serde_json::from_value(json!({
            "id": id.to_string(),
            "first_name": "Jane",
            "last_name": "Doe",
            "mail": "jane@example.com",
            "gender": "female"
        }))
        .unwrap();

        let user = request.into_user().unwrap();
        assert_eq!(user.id, id);
        assert!(user.roles.is_empty());
    }

    #[test]
    fn create_user_rejects_blank_fields() {
        let request = CreateUserRequest {
            id: None,
            first_name: "Jane".into(),
            last_name: "  ".into(),
            middle_name: None,
            mail: "jane@example.com".into(),
            gender: Gender::Female,
            roles: BTreeSet::new(),
        };

        assert!(matches!(
            request.into_user(),
            Err(ControlError::InvalidRequest(ref msg)) if msg == "last_name must not be empty"
        ));
    }
}
