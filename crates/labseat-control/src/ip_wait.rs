//! Bounded wait for a seat VM's IP address.
//!
//! The address itself comes from an [`AddressSource`]. The wait polls it once
//! per interval for a fixed number of checks and gives up with
//! `ControlError::Timeout` afterwards.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ControlError, Result};

/// Where the address of a freshly booted seat VM is looked up.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Check once for an address. `None` means "not yet".
    async fn lookup(&self) -> Option<IpAddr>;
}

/// A source that never yields an address.
///
/// Every wait against it ends in a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAddressSource;

#[async_trait]
impl AddressSource for NoAddressSource {
    async fn lookup(&self) -> Option<IpAddr> {
        None
    }
}

/// A source that always yields the same configured address.
#[derive(Debug, Clone, Copy)]
pub struct StaticAddressSource(IpAddr);

impl StaticAddressSource {
    /// Create a source for a fixed address.
    #[must_use]
    pub const fn new(address: IpAddr) -> Self {
        Self(address)
    }
}

#[async_trait]
impl AddressSource for StaticAddressSource {
    async fn lookup(&self) -> Option<IpAddr> {
        Some(self.0)
    }
}

/// A source backed by a closure.
pub struct FnAddressSource<F>(F);

impl<F> FnAddressSource<F>
where
    F: Fn() -> Option<IpAddr> + Send + Sync,
{
    /// Wrap a lookup closure.
    pub const fn new(lookup: F) -> Self {
        Self(lookup)
    }
}

#[async_trait]
impl<F> AddressSource for FnAddressSource<F>
where
    F: Fn() -> Option<IpAddr> + Send + Sync,
{
    async fn lookup(&self) -> Option<IpAddr> {
        (self.0)()
    }
}

/// Poll `source` until it yields an address.
///
/// Exactly `timeout_seconds` checks are made, with a `poll_interval` sleep
/// after every check that found nothing. The first address found is returned
/// immediately.
///
/// # Errors
///
/// Returns `ControlError::Timeout` when no check yields an address.
pub async fn wait_for_ip<S>(
    source: &S,
    timeout_seconds: u64,
    poll_interval: Duration,
) -> Result<IpAddr>
where
    S: AddressSource + ?Sized,
{
    for attempt in 1..=timeout_seconds {
        if let Some(address) = source.lookup().await {
            tracing::debug!(address = %address, attempt, "Obtained seat IP address");
            return Ok(address);
        }
        tracing::trace!(attempt, max_attempts = timeout_seconds, "No IP address yet");
        tokio::time::sleep(poll_interval).await;
    }

    tracing::warn!(timeout_seconds, "Timed out waiting for seat IP address");
    Err(ControlError::Timeout {
        seconds: timeout_seconds,
    })
}
