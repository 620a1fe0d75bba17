//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod dns;
pub mod health;
pub mod proxy;
pub mod seats;
pub mod users;
