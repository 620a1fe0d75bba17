//! User directory endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use labseat_control::{ControlPlane, CreateUserRequest, User, UserId};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for the user list.
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// Every user in the directory.
    pub users: Vec<User>,
}

/// Create a user.
///
/// # Errors
///
/// Returns `400` for blank required fields and `409` if the ID is taken.
pub async fn create_user<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(request) = body?;
    let user = state.control.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users.
///
/// # Errors
///
/// Returns `500` if the store cannot be read.
pub async fn list_users<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let users = state.control.list_users().await?;
    Ok(Json(ListUsersResponse { users }))
}

/// Get a user by ID.
///
/// # Errors
///
/// Returns `400` for a malformed ID and `404` if there is no such user.
pub async fn get_user<C>(
    State(state): State<Arc<GatewayState<C>>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid user id: {user_id}")))?;

    let user = state.control.get_user(&user_id).await?;
    Ok(Json(user))
}
