//! Control plane for labseat seat provisioning.
//!
//! This crate provides the business logic behind the HTTP API. It coordinates
//! the DNS provider, the reverse-proxy configuration directory and the user
//! store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Gateway (HTTP)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ControlPlaneService                      │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │    Seat     │ │   IP-Wait   │ │   Per-seat locks    │    │
//! │  │ Provisioner │ │   (poll)    │ │                     │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌──────────┐
//!        │  Store   │   │   DNS    │   │  Proxy   │
//!        │ (RocksDB)│   │ Provider │   │ (nginx)  │
//!        └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use labseat_control::{
//!     CommandReloader, ControlPlane, ControlPlaneService, NoAddressSource, ProxyConfigSettings,
//!     ProxyConfigStore, SeatConfig, SeatRequest,
//! };
//! use labseat_dns::{CloudflareClient, DnsConfig};
//! use labseat_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/labseat")?);
//! let dns = Arc::new(CloudflareClient::new(DnsConfig::from_env()?)?);
//! let proxy = Arc::new(ProxyConfigStore::new(
//!     ProxyConfigSettings::default(),
//!     Arc::new(CommandReloader::default()),
//! ));
//!
//! let control = ControlPlaneService::new(
//!     store,
//!     dns,
//!     proxy,
//!     Arc::new(NoAddressSource),
//!     SeatConfig::default(),
//! );
//!
//! let seat = control.create_seat(SeatRequest::new("doe", "sfb")).await?;
//! println!("Seat ready at {}", seat.server_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Seat flow
//!
//! - Create: wait for IP → write proxy config and reload → create DNS record
//! - Delete: delete DNS record, then delete proxy config; both always attempted
//!
//! See the [`seat`] module for details.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ip_wait;
pub mod locks;
pub mod proxy;
pub mod seat;
pub mod service;
pub mod types;

pub use error::{ControlError, ProxyError, Result};
pub use ip_wait::{wait_for_ip, AddressSource, FnAddressSource, NoAddressSource, StaticAddressSource};
pub use locks::{SeatGuard, SeatLocks};
pub use proxy::{CommandReloader, ProxyConfig, ProxyConfigSettings, ProxyConfigStore, Reloader};
pub use seat::SeatProvisioner;
pub use service::{ControlPlane, ControlPlaneService};
pub use types::{
    CreateDnsRecordRequest, CreateUserRequest, Seat, SeatConfig, SeatRequest, SeatTeardown,
    StepOutcome,
};

// Re-export commonly used types from dependencies for convenience
pub use labseat_core::{ServerName, UserId};
pub use labseat_dns::{DnsRecord, RecordType};
pub use labseat_store::{Gender, Role, User};
