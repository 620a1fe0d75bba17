//! Liveness probe.

use axum::Json;
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Health {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Package name of the running binary.
    pub service: &'static str,
    /// Package version of the running binary.
    pub version: &'static str,
}

impl Health {
    const CURRENT: Self = Self {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };
}

/// `GET /health`
///
/// Liveness only. The DNS provider, the proxy and the store are not probed,
/// so a 200 here says nothing about whether seat provisioning would succeed.
pub async fn health() -> Json<Health> {
    Json(Health::CURRENT)
}
