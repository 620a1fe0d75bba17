//! Core types and utilities for labseat.
//!
//! This crate provides the foundational types shared by the seat provisioning
//! service:
//!
//! - **Identifiers**: `UserId` for user documents, `ServerName` for seat hostnames
//! - **Errors**: `IdError` for identifiers that fail validation
//!
//! # Example
//!
//! ```
//! use labseat_core::{ServerName, UserId, DEFAULT_SEAT_DOMAIN};
//!
//! // Derive the hostname of a training seat
//! let name = ServerName::for_seat("doe", "sfb", DEFAULT_SEAT_DOMAIN).unwrap();
//! assert_eq!(name.as_str(), "doe-sfb.lab.infinigate.io");
//!
//! // Generate a user ID
//! let user_id = UserId::generate();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{IdError, ServerName, UserId, DEFAULT_SEAT_DOMAIN};
