//! DNS record endpoints.
//!
//! Thin wrappers over the provider's zone records: list, create an A record,
//! delete by ID and delete by name.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use labseat_control::{ControlPlane, CreateDnsRecordRequest, DnsRecord, RecordType};

use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response for the record list.
#[derive(Debug, Serialize)]
pub struct ListRecordsResponse {
    /// Records in provider order.
    pub records: Vec<DnsRecord>,
}

/// Request to delete a record by ID.
#[derive(Debug, Deserialize)]
pub struct DeleteRecordBody {
    /// Provider record ID.
    pub record_id: String,
}

/// Request to delete a record by name and type.
#[derive(Debug, Deserialize)]
pub struct DeleteByNameBody {
    /// Fully qualified record name.
    pub record_name: String,
    /// Record type, `A` if omitted.
    #[serde(default = "default_record_type")]
    pub record_type: RecordType,
}

const fn default_record_type() -> RecordType {
    RecordType::A
}

/// Response naming the deleted record.
#[derive(Debug, Serialize)]
pub struct DeletedRecordResponse {
    /// Provider ID of the deleted record.
    pub record_id: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// List every record in the zone.
///
/// # Errors
///
/// Returns `502` if the provider cannot be reached or rejects the call.
pub async fn list_records<C>(
    State(state): State<Arc<GatewayState<C>>>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let records = state.control.list_dns_records().await?;
    Ok(Json(ListRecordsResponse { records }))
}

/// Create an A record.
///
/// # Errors
///
/// Returns `400` for a missing name or non-IPv4 content, `502` if the
/// provider rejects the record.
pub async fn create_record<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<CreateDnsRecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(body) = body?;
    let record = state.control.create_dns_record(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a record by provider ID.
///
/// # Errors
///
/// Returns `404` if the provider has no such record.
pub async fn delete_record<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<DeleteRecordBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(body) = body?;
    state.control.delete_dns_record(&body.record_id).await?;
    Ok(Json(DeletedRecordResponse {
        record_id: body.record_id,
    }))
}

/// Delete the first record matching a name and type.
///
/// # Errors
///
/// Returns `404` (and deletes nothing) if no record matches.
pub async fn delete_record_by_name<C>(
    State(state): State<Arc<GatewayState<C>>>,
    body: Result<Json<DeleteByNameBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ControlPlane + 'static,
{
    let Json(body) = body?;
    let record_id = state
        .control
        .delete_dns_record_by_name(&body.record_name, &body.record_type)
        .await?;
    Ok(Json(DeletedRecordResponse { record_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_by_name_defaults_to_a() {
        let body: DeleteByNameBody =
            serde_json::from_str(r#"{"record_name": "doe-sfb.lab.io"}"#).unwrap();
        assert_eq!(body.record_type, RecordType::A);

        let body: DeleteByNameBody =
            serde_json::from_str(r#"{"record_name": "x", "record_type": "txt"}"#).unwrap();
        assert_eq!(body.record_type, RecordType::Txt);
    }
}
