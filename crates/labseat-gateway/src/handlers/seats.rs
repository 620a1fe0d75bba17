//! Seat endpoints.
//!
//! Creating a seat holds the request open while the VM address is awaited,
//! so the gateway request timeout must exceed the IP wait.

use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use labseat_control::{ControlPlane, SeatRequest};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for the IP wait.
#[derive(Debug, Serialize)]
pub struct WaitIpResponse {
    /// Address the seat VM obtained.
    pub ip: IpAddr,
}

/// Provision a seat.
///
/// # Errors
///
/// Returns `400` for blank name parts, `504` if the VM address never
/// appears, `502` if DNS publication fails.
pub async fn create_seat<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<SeatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(request) = body?;
    let seat = state.control.create_seat(request).await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

/// Tear down a seat.
///
/// Responds `200` when both the DNS record and the proxy config were removed
/// and `207 Multi-Status` otherwise; the body always carries both outcomes.
///
/// # Errors
///
/// Returns `400` if the seat hostname cannot be derived.
pub async fn delete_seat<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<SeatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(request) = body?;
    let teardown = state.control.delete_seat(request).await?;

    let status = if teardown.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(teardown)))
}

/// Wait once for a seat VM address.
///
/// # Errors
///
/// Returns `504` if no address appears in time.
pub async fn wait_ip<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let ip = state.control.wait_for_ip().await?;
    Ok(Json(WaitIpResponse { ip }))
}
