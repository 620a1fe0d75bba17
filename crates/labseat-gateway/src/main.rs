//! labseat gateway
//!
//! This is the main entry point for the provisioning service. All
//! configuration comes from the environment; `CF_API_KEY` and `CF_ZONE_ID`
//! are required.
//!
//! # Seat addresses
//!
//! Set `SEAT_VM_ADDRESS` to answer every IP wait with a fixed address. If not
//! set, no address source is available and seat creation times out after the
//! configured wait.

use std::net::IpAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labseat_control::{
    AddressSource, CommandReloader, ControlPlaneService, NoAddressSource, ProxyConfigSettings,
    ProxyConfigStore, SeatConfig, StaticAddressSource,
};
use labseat_dns::{CloudflareClient, DnsConfig};
use labseat_gateway::{create_router, GatewayConfig, GatewayState};
use labseat_store::StoreConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,labseat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting labseat gateway");

    // Load configuration from environment
    let gateway_config = GatewayConfig::from_env();
    let dns_config = DnsConfig::from_env()?;
    let proxy_settings = ProxyConfigSettings::from_env();
    let store_config = StoreConfig::from_env();
    let seat_config = SeatConfig {
        dns_ttl: dns_config.default_ttl,
        ..SeatConfig::from_env()
    };

    tracing::info!(
        listen_addr = %gateway_config.listen_addr,
        data_dir = %store_config.path.display(),
        dns = ?dns_config,
        proxy_dir = %proxy_settings.config_dir.display(),
        seat_domain = %seat_config.seat_domain,
        "Gateway configuration loaded"
    );

    let ip_wait = seat_config.ip_wait_budget();
    if gateway_config.request_timeout() <= ip_wait {
        tracing::warn!(
            request_timeout_seconds = gateway_config.request_timeout_seconds,
            ip_wait_seconds = ip_wait.as_secs(),
            "Request timeout does not outlast the IP wait; seat creation may be cut off"
        );
    }

    // Initialize RocksDB store
    tracing::info!(path = %store_config.path.display(), "Opening RocksDB store");
    let store = Arc::new(store_config.open()?);

    let dns = Arc::new(CloudflareClient::new(dns_config)?);

    let reloader = CommandReloader::from_command(&proxy_settings.reload_command)
        .unwrap_or_default();
    let proxy = Arc::new(ProxyConfigStore::new(proxy_settings, Arc::new(reloader)));

    let addresses: Arc<dyn AddressSource> = match std::env::var("SEAT_VM_ADDRESS")
        .ok()
        .and_then(|val| val.parse::<IpAddr>().ok())
    {
        Some(address) => {
            tracing::info!(address = %address, "Using static seat address source");
            Arc::new(StaticAddressSource::new(address))
        }
        None => {
            tracing::warn!("No SEAT_VM_ADDRESS set - seat IP waits will time out");
            Arc::new(NoAddressSource)
        }
    };

    let control = Arc::new(ControlPlaneService::new(
        store,
        dns,
        proxy,
        addresses,
        seat_config,
    ));
    tracing::info!("Control plane initialized");

    let listen_addr = gateway_config.listen_addr.clone();
    let state = GatewayState::new(control, gateway_config);
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
