//! HTTP gateway for the labseat provisioning service.
//!
//! This crate provides the REST API used to provision training seats. It
//! handles:
//!
//! - DNS record management at the provider
//! - Reverse-proxy configuration files
//! - Seat creation and teardown
//! - The user directory
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! │                       (HTTP / JSON)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      labseat-gateway                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Router    │ │  Handlers   │ │      ApiError       │    │
//! │  │ + tower-http│ │             │ │   (JSON errors)     │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                      ┌──────────────┐
//!                      │ ControlPlane │
//!                      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use labseat_control::{
//!     CommandReloader, ControlPlaneService, NoAddressSource, ProxyConfigSettings,
//!     ProxyConfigStore, SeatConfig,
//! };
//! use labseat_dns::{CloudflareClient, DnsConfig};
//! use labseat_gateway::{create_router, GatewayConfig, GatewayState};
//! use labseat_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/labseat")?);
//! let dns = Arc::new(CloudflareClient::new(DnsConfig::from_env()?)?);
//! let proxy = Arc::new(ProxyConfigStore::new(
//!     ProxyConfigSettings::default(),
//!     Arc::new(CommandReloader::default()),
//! ));
//! let control = Arc::new(ControlPlaneService::new(
//!     store,
//!     dns,
//!     proxy,
//!     Arc::new(NoAddressSource),
//!     SeatConfig::default(),
//! ));
//!
//! let state = GatewayState::new(control, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;
