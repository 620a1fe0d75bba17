//! Cloudflare DNS client.
//!
//! This module provides a client for the zone DNS records API of a Cloudflare
//! v4 style provider: create, paginated list and delete, authenticated with a
//! bearer token.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{DnsError, Result};
use crate::types::{DnsRecord, NewDnsRecord};
use crate::{DnsConfig, DnsProvider};

/// Response envelope wrapping every provider answer.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

/// A single error entry in the envelope.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Pagination details for list responses.
#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

/// Client for the provider's zone records API.
pub struct CloudflareClient {
    config: DnsConfig,
    client: reqwest::Client,
}

impl CloudflareClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: DnsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DnsError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: DnsConfig) -> Self {
        Self { config, client }
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &DnsConfig {
        &self.config
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.config.api_token)
    }

    /// Decode a successful envelope, or turn the response into a provider error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| DnsError::InvalidResponse(format!("{e}: {body}")))?;

        if !envelope.success {
            return Err(DnsError::Provider {
                status: status.as_u16(),
                message: join_messages(&envelope.errors).unwrap_or(body),
            });
        }

        Ok(envelope)
    }
}

/// Build a provider error, preferring the envelope's error messages over the
/// raw body.
fn provider_error(status: u16, body: &str) -> DnsError {
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| join_messages(&envelope.errors))
        .unwrap_or_else(|| body.to_string());

    DnsError::Provider { status, message }
}

fn join_messages(errors: &[ApiMessage]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let joined = errors
        .iter()
        .map(|e| match e.code {
            Some(code) => format!("{code}: {}", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(joined)
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    async fn create_record(&self, record: &NewDnsRecord) -> Result<DnsRecord> {
        let url = self.config.records_url();

        let response = self
            .authorized(self.client.post(&url))
            .json(record)
            .send()
            .await?;

        let created = Self::decode::<DnsRecord>(response)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    name = %record.name,
                    record_type = %record.record_type,
                    error = %e,
                    "Failed to create DNS record"
                );
            })?
            .result
            .ok_or_else(|| DnsError::InvalidResponse("create returned no record".to_string()))?;

        tracing::info!(
            record_id = %created.id,
            name = %created.name,
            record_type = %created.record_type,
            content = %created.content,
            "Created DNS record"
        );

        Ok(created)
    }

    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let url = self.config.records_url();
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .authorized(self.client.get(&url))
                .query(&[("page", page), ("per_page", self.config.per_page)])
                .send()
                .await?;

            let envelope = Self::decode::<Vec<DnsRecord>>(response).await?;
            records.extend(envelope.result.unwrap_or_default());

            let total_pages = envelope.result_info.map_or(1, |info| info.total_pages);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = records.len(), pages = page, "Listed DNS records");

        Ok(records)
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let url = format!("{}/{record_id}", self.config.records_url());

        let response = self.authorized(self.client.delete(&url)).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(record_id = %record_id, "Deleted DNS record");
            return Ok(());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DnsError::RecordIdNotFound(record_id.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let error = provider_error(status.as_u16(), &body);
        tracing::error!(record_id = %record_id, error = %error, "Failed to delete DNS record");
        Err(error)
    }
}
