//! API error types and responses.
//!
//! This module defines the standard error format for all API responses:
//! `{"error": "<message>", "code": "<code>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use labseat_control::{ControlError, ProxyError};
use labseat_dns::DnsError;
use labseat_store::StoreError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid request body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An upstream service (the DNS provider) failed.
    #[error("upstream error: {0}")]
    BadGateway(String),

    /// A bounded wait ran out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::BadRequest(_) => "bad_request",
            Self::BadGateway(_) => "upstream_error",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Dns(dns_err) => match dns_err {
                DnsError::RecordNotFound { .. } | DnsError::RecordIdNotFound(_) => {
                    Self::NotFound(dns_err.to_string())
                }
                DnsError::Provider { .. } | DnsError::Http(_) | DnsError::InvalidResponse(_) => {
                    tracing::warn!(error = %dns_err, "DNS provider error");
                    Self::BadGateway(dns_err.to_string())
                }
                DnsError::Config(_) => {
                    tracing::error!(error = %dns_err, "DNS configuration error");
                    Self::Internal("dns provider misconfigured".to_string())
                }
            },
            ControlError::Proxy(proxy_err) => match proxy_err {
                ProxyError::NotFound(_) => Self::NotFound(proxy_err.to_string()),
                ProxyError::InvalidServerName(_) | ProxyError::InvalidProxyPass(_) => {
                    Self::BadRequest(proxy_err.to_string())
                }
                ProxyError::Io(_) | ProxyError::Reload(_) => {
                    tracing::error!(error = %proxy_err, "Proxy config error");
                    Self::Internal(proxy_err.to_string())
                }
            },
            ControlError::Store(store_err) => match store_err {
                StoreError::NotFound => Self::NotFound("document".to_string()),
                StoreError::Conflict => Self::Conflict("document already exists".to_string()),
                StoreError::Database(_) | StoreError::Serialization(_) => {
                    tracing::error!(error = %store_err, "Store error");
                    Self::Internal("storage error".to_string())
                }
            },
            ControlError::InvalidId(id_err) => Self::BadRequest(id_err.to_string()),
            ControlError::InvalidRequest(msg) => Self::BadRequest(msg),
            ControlError::Timeout { seconds } => {
                Self::Timeout(format!("no IP address obtained within {seconds} seconds"))
            }
            ControlError::UserNotFound(id) => Self::NotFound(format!("user {id}")),
            ControlError::UserExists(id) => Self::Conflict(format!("user {id} already exists")),
        }
    }
}
