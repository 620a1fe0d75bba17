//! Reverse-proxy configuration endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use labseat_control::{ControlPlane, ProxyConfig};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for the config list.
#[derive(Debug, Serialize)]
pub struct ListConfigsResponse {
    /// Server names with a config file, sorted.
    pub server_names: Vec<String>,
}

/// Request to delete a config.
#[derive(Debug, Deserialize)]
pub struct DeleteConfigBody {
    /// Hostname whose config is removed.
    pub server_name: String,
}

/// List configured server names.
///
/// # Errors
///
/// Returns `500` if the config directory cannot be read.
pub async fn list_configs<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let server_names = state.control.list_proxy_configs().await?;
    Ok(Json(ListConfigsResponse { server_names }))
}

/// Write a config and reload the proxy.
///
/// # Errors
///
/// Returns `400` for unusable names or upstreams, `500` if the write or the
/// reload fails.
pub async fn write_config<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<ProxyConfig>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(config) = body?;
    state.control.write_proxy_config(config.clone()).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// Delete a config and reload the proxy.
///
/// # Errors
///
/// Returns `404` if no config exists for the name.
pub async fn delete_config<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<DeleteConfigBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(body) = body?;
    state.control.delete_proxy_config(&body.server_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
