//! Seat provisioning.
//!
//! Creating a seat waits for the VM address, routes the seat hostname to it in
//! the proxy and publishes the hostname in DNS. Deleting a seat removes the
//! DNS record and the proxy route independently and reports both outcomes.
//!
//! Operations on the same hostname are serialized through [`SeatLocks`].
//! Nothing is rolled back: a create that fails while publishing DNS leaves the
//! proxy config in place.

use std::net::IpAddr;
use std::sync::Arc;

use labseat_core::ServerName;
use labseat_dns::{DnsError, DnsProvider, NewDnsRecord, RecordType};

use crate::error::Result;
use crate::ip_wait::{wait_for_ip, AddressSource};
use crate::locks::SeatLocks;
use crate::proxy::{ProxyConfig, ProxyConfigStore};
use crate::types::{Seat, SeatConfig, SeatRequest, SeatTeardown, StepOutcome};

/// Provisions and tears down seats.
pub struct SeatProvisioner<D: DnsProvider> {
    dns: Arc<D>,
    proxy: Arc<ProxyConfigStore>,
    addresses: Arc<dyn AddressSource>,
    locks: SeatLocks,
    config: SeatConfig,
}

impl<D: DnsProvider> SeatProvisioner<D> {
    /// Create a new provisioner.
    #[must_use]
    pub fn new(
        dns: Arc<D>,
        proxy: Arc<ProxyConfigStore>,
        addresses: Arc<dyn AddressSource>,
        config: SeatConfig,
    ) -> Self {
        Self {
            dns,
            proxy,
            addresses,
            locks: SeatLocks::new(),
            config,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SeatConfig {
        &self.config
    }

    /// Get the per-seat lock table.
    #[must_use]
    pub const fn locks(&self) -> &SeatLocks {
        &self.locks
    }

    /// Hostname for the seat described by `request`.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidId` if a part is blank or the hostname is
    /// not valid.
    pub fn server_name(&self, request: &SeatRequest) -> Result<ServerName> {
        Ok(ServerName::for_seat(
            &request.last_name,
            &request.training_name,
            &self.config.seat_domain,
        )?)
    }

    /// Wait for the seat VM address with the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Timeout` if no address appears in time.
    pub async fn wait_for_address(&self) -> Result<IpAddr> {
        wait_for_ip(
            self.addresses.as_ref(),
            self.config.ip_wait_timeout_seconds,
            self.config.poll_interval,
        )
        .await
    }

    /// Provision a seat.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails: the address wait, the
    /// proxy config write (or reload), or the DNS record creation.
    pub async fn create(&self, request: &SeatRequest) -> Result<Seat> {
        let server_name = self.server_name(request)?;
        let _guard = self.locks.lock(server_name.as_str()).await;

        tracing::info!(server_name = %server_name, "Provisioning seat");

        let address = self.wait_for_address().await?;
        let proxy_pass = self.config.proxy_pass(address);

        self.proxy
            .write(&ProxyConfig {
                server_name: server_name.to_string(),
                proxy_pass: proxy_pass.clone(),
            })
            .await?;

        let target = self.config.dns_target.unwrap_or(address);
        let record = NewDnsRecord::for_address(server_name.as_str(), target, self.config.dns_ttl);
        let created = self.dns.create_record(&record).await.inspect_err(|e| {
            tracing::error!(
                server_name = %server_name,
                error = %e,
                "DNS publication failed; proxy config left in place"
            );
        })?;

        tracing::info!(
            server_name = %server_name,
            address = %address,
            record_id = %created.id,
            "Seat provisioned"
        );

        Ok(Seat {
            server_name,
            address,
            proxy_pass,
            dns_record_id: created.id,
        })
    }

    /// Tear down a seat.
    ///
    /// Both the DNS record and the proxy config removal are attempted; a
    /// failure in one does not skip the other.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidId` if the hostname cannot be derived.
    /// Step failures are reported in the returned [`SeatTeardown`].
    pub async fn delete(&self, request: &SeatRequest) -> Result<SeatTeardown> {
        let server_name = self.server_name(request)?;
        let _guard = self.locks.lock(server_name.as_str()).await;

        tracing::info!(server_name = %server_name, "Deleting seat");

        let dns = match self.delete_record(&server_name).await {
            Ok(record_id) => StepOutcome::Deleted {
                detail: format!("dns record {record_id}"),
            },
            Err(e) => {
                tracing::warn!(
                    server_name = %server_name,
                    error = %e,
                    "Failed to delete seat DNS record"
                );
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let proxy = match self.proxy.delete(server_name.as_str()).await {
            Ok(()) => StepOutcome::Deleted {
                detail: server_name.config_file_name(),
            },
            Err(e) => {
                tracing::warn!(
                    server_name = %server_name,
                    error = %e,
                    "Failed to delete seat proxy config"
                );
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok(SeatTeardown {
            server_name,
            dns,
            proxy,
        })
    }

    /// Remove the seat's DNS record and return its provider ID.
    ///
    /// With a configured `dns_target` the record type follows its address
    /// family. Otherwise the record points at the VM address, which is not
    /// known at delete time: `A` is tried first, then `AAAA`.
    async fn delete_record(&self, server_name: &ServerName) -> labseat_dns::Result<String> {
        let name = server_name.as_str();
        if let Some(target) = self.config.dns_target {
            return self
                .dns
                .delete_by_name_and_type(name, &RecordType::for_address(&target))
                .await;
        }

        match self.dns.delete_by_name_and_type(name, &RecordType::A).await {
            Err(DnsError::RecordNotFound { .. }) => {
                self.dns.delete_by_name_and_type(name, &RecordType::Aaaa).await
            }
            other => other,
        }
    }
}
