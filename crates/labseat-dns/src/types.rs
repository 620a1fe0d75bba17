//! DNS record types exchanged with the provider.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default TTL for records created by labseat, in seconds.
pub const DEFAULT_TTL: u32 = 3600;

/// DNS record type.
///
/// Types the provider returns that are not listed here are kept verbatim in
/// [`RecordType::Other`] so listing never fails on an unfamiliar record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias).
    Cname,
    /// Mail exchanger.
    Mx,
    /// Name server.
    Ns,
    /// Start of authority.
    Soa,
    /// Free-form text.
    Txt,
    /// Service locator.
    Srv,
    /// Certification authority authorization.
    Caa,
    /// Reverse pointer.
    Ptr,
    /// Any other type, upper-cased.
    Other(String),
}

impl RecordType {
    /// The record type matching an address family (`A` or `AAAA`).
    #[must_use]
    pub const fn for_address(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => Self::A,
            IpAddr::V6(_) => Self::Aaaa,
        }
    }

    /// Wire representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Soa => "SOA",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Ptr => "PTR",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        let upper = value.trim().to_ascii_uppercase();
        match upper.as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "MX" => Self::Mx,
            "NS" => Self::Ns,
            "SOA" => Self::Soa,
            "TXT" => Self::Txt,
            "SRV" => Self::Srv,
            "CAA" => Self::Caa,
            "PTR" => Self::Ptr,
            _ => Self::Other(upper),
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier.
    pub id: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Fully-qualified record name.
    pub name: String,
    /// Record content (an address for `A`/`AAAA`, a target otherwise).
    pub content: String,
    /// Time to live in seconds (`1` means automatic at the provider).
    pub ttl: u32,
    /// Whether the provider proxies traffic for this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// When the provider created the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

/// Payload for creating a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDnsRecord {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Fully-qualified record name.
    pub name: String,
    /// Record content.
    pub content: String,
    /// Time to live in seconds.
    pub ttl: u32,
}

impl NewDnsRecord {
    /// An `A` record pointing `name` at an IPv4 address given as text.
    #[must_use]
    pub fn a(name: impl Into<String>, content: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: RecordType::A,
            name: name.into(),
            content: content.into(),
            ttl,
        }
    }

    /// An `A` or `AAAA` record, depending on the address family.
    #[must_use]
    pub fn for_address(name: impl Into<String>, address: IpAddr, ttl: u32) -> Self {
        Self {
            record_type: RecordType::for_address(&address),
            name: name.into(),
            content: address.to_string(),
            ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parses_case_insensitively() {
        assert_eq!(RecordType::from("a".to_string()), RecordType::A);
        assert_eq!(RecordType::from("aaaa".to_string()), RecordType::Aaaa);
        assert_eq!(
            RecordType::from("https".to_string()),
            RecordType::Other("HTTPS".to_string())
        );
    }

    #[test]
    fn record_deserializes_provider_shape() {
        let json = r#"{
            "id": "372e67954025e0ba6aaa6d586b9e0b59",
            "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
            "type": "A",
            "name": "doe-sfb.lab.infinigate.io",
            "content": "198.51.100.4",
            "proxied": false,
            "ttl": 3600,
            "created_on": "2014-01-01T05:20:00.12345Z"
        }"#;

        let record: DnsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.ttl, 3600);
        assert_eq!(record.proxied, Some(false));
        assert!(record.created_on.is_some());
    }

    #[test]
    fn new_record_serializes_type_field() {
        let record = NewDnsRecord::a("x.lab.io", "10.0.0.1", DEFAULT_TTL);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "A");
        assert_eq!(json["ttl"], 3600);
    }

    #[test]
    fn address_family_selects_type() {
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let record = NewDnsRecord::for_address("x.lab.io", v6, 60);
        assert_eq!(record.record_type, RecordType::Aaaa);
        assert_eq!(record.content, "2001:db8::1");
    }
}
