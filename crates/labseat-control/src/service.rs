//! Control plane service implementation.
//!
//! This module provides the `ControlPlane` trait and `ControlPlaneService` implementation
//! that coordinates DNS records, proxy configuration, seats and users.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;
use labseat_core::UserId;
use labseat_dns::{DnsProvider, DnsRecord, NewDnsRecord, RecordType};
use labseat_store::{Store, StoreError, User};

use crate::error::{ControlError, Result};
use crate::ip_wait::AddressSource;
use crate::proxy::{ProxyConfig, ProxyConfigStore};
use crate::seat::SeatProvisioner;
use crate::types::{
    CreateDnsRecordRequest, CreateUserRequest, Seat, SeatConfig, SeatRequest, SeatTeardown,
};

/// Trait defining the control plane operations.
///
/// This trait provides the complete API exposed over HTTP. Implementations
/// talk to the DNS provider, the proxy config directory and the user store.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    // =========================================================================
    // DNS Records
    // =========================================================================

    /// List every record in the zone, in provider order.
    async fn list_dns_records(&self) -> Result<Vec<DnsRecord>>;

    /// Create an A record.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidRequest` if `content` is not an IPv4 address.
    async fn create_dns_record(&self, request: CreateDnsRecordRequest) -> Result<DnsRecord>;

    /// Delete a record by provider ID.
    async fn delete_dns_record(&self, record_id: &str) -> Result<()>;

    /// Delete the first record matching `(name, record_type)`. Returns its ID.
    async fn delete_dns_record_by_name(
        &self,
        name: &str,
        record_type: &RecordType,
    ) -> Result<String>;

    // =========================================================================
    // Proxy Configs
    // =========================================================================

    /// List server names that have a proxy config.
    async fn list_proxy_configs(&self) -> Result<Vec<String>>;

    /// Write a proxy config and reload the proxy.
    async fn write_proxy_config(&self, config: ProxyConfig) -> Result<()>;

    /// Delete a proxy config and reload the proxy.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Proxy(ProxyError::NotFound)` if no config exists.
    async fn delete_proxy_config(&self, server_name: &str) -> Result<()>;

    // =========================================================================
    // Seats
    // =========================================================================

    /// Provision a seat: wait for its address, route it, publish it.
    async fn create_seat(&self, request: SeatRequest) -> Result<Seat>;

    /// Tear down a seat, attempting every step.
    async fn delete_seat(&self, request: SeatRequest) -> Result<SeatTeardown>;

    /// Run one bounded wait for a seat VM address.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Timeout` if no address appears in time.
    async fn wait_for_ip(&self) -> Result<IpAddr>;

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::UserExists` if the ID is already taken.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::UserNotFound` if there is no such user.
    async fn get_user(&self, user_id: &UserId) -> Result<User>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// The main control plane service implementation.
pub struct ControlPlaneService<S: Store, D: DnsProvider> {
    store: Arc<S>,
    dns: Arc<D>,
    proxy: Arc<ProxyConfigStore>,
    seats: SeatProvisioner<D>,
}

impl<S: Store, D: DnsProvider> ControlPlaneService<S, D> {
    /// Create a new control plane service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        dns: Arc<D>,
        proxy: Arc<ProxyConfigStore>,
        addresses: Arc<dyn AddressSource>,
        config: SeatConfig,
    ) -> Self {
        let seats = SeatProvisioner::new(Arc::clone(&dns), Arc::clone(&proxy), addresses, config);
        Self {
            store,
            dns,
            proxy,
            seats,
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the seat provisioner.
    #[must_use]
    pub const fn seats(&self) -> &SeatProvisioner<D> {
        &self.seats
    }

    /// Get the seat configuration.
    #[must_use]
    pub const fn config(&self) -> &SeatConfig {
        self.seats.config()
    }
}

#[async_trait]
impl<S, D> ControlPlane for ControlPlaneService<S, D>
where
    S: Store + 'static,
    D: DnsProvider + 'static,
{
    // =========================================================================
    // DNS Records
    // =========================================================================

    async fn list_dns_records(&self) -> Result<Vec<DnsRecord>> {
        Ok(self.dns.list_records().await?)
    }

    async fn create_dns_record(&self, request: CreateDnsRecordRequest) -> Result<DnsRecord> {
        if request.name.trim().is_empty() {
            return Err(ControlError::InvalidRequest("name must not be empty".to_string()));
        }
        let address: Ipv4Addr = request.content.parse().map_err(|_| {
            ControlError::InvalidRequest(format!(
                "content must be an IPv4 address: {}",
                request.content
            ))
        })?;
        let ttl = request.ttl.unwrap_or(self.config().dns_ttl);

        let record = NewDnsRecord::a(request.name, address.to_string(), ttl);
        Ok(self.dns.create_record(&record).await?)
    }

    async fn delete_dns_record(&self, record_id: &str) -> Result<()> {
        if record_id.trim().is_empty() {
            return Err(ControlError::InvalidRequest("record_id must not be empty".to_string()));
        }
        Ok(self.dns.delete_record(record_id).await?)
    }

    async fn delete_dns_record_by_name(
        &self,
        name: &str,
        record_type: &RecordType,
    ) -> Result<String> {
        let record_id = self.dns.delete_by_name_and_type(name, record_type).await?;

        tracing::info!(
            name = %name,
            record_type = %record_type,
            record_id = %record_id,
            "Deleted DNS record by name"
        );

        Ok(record_id)
    }

    // =========================================================================
    // Proxy Configs
    // =========================================================================

    async fn list_proxy_configs(&self) -> Result<Vec<String>> {
        Ok(self.proxy.list().await?)
    }

    async fn write_proxy_config(&self, config: ProxyConfig) -> Result<()> {
        self.proxy.write(&config).await?;
        Ok(())
    }

    async fn delete_proxy_config(&self, server_name: &str) -> Result<()> {
        Ok(self.proxy.delete(server_name).await?)
    }

    // =========================================================================
    // Seats
    // =========================================================================

    async fn create_seat(&self, request: SeatRequest) -> Result<Seat> {
        self.seats.create(&request).await
    }

    async fn delete_seat(&self, request: SeatRequest) -> Result<SeatTeardown> {
        self.seats.delete(&request).await
    }

    async fn wait_for_ip(&self) -> Result<IpAddr> {
        self.seats.wait_for_address().await
    }

    // =========================================================================
    // Users
    // =========================================================================

    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let user = request.into_user()?;

        match self.store.insert_user(&user) {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(ControlError::UserExists(user.id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "Created user");

        Ok(user)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User> {
        self.store
            .get_user(user_id)?
            .ok_or(ControlError::UserNotFound(*user_id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users()?)
    }
}
