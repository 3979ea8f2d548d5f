//! reqwest-backed implementation of [`DocumentApi`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{ApiError, DocumentApi};
use crate::config::Settings;
use crate::models::{AnalysisReport, SearchFilter, SearchResponse, UploadRequest, UploadTarget};

const USER_AGENT: &str = concat!("docdesk/", env!("CARGO_PKG_VERSION"));

/// Resolve user agent from config value.
/// - None => default docdesk user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// Error body the service returns alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the document service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from application settings.
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let user_agent = resolve_user_agent(settings.user_agent.as_deref());
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(settings.request_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        // Validate early so a bad endpoint fails before any upload starts
        Url::parse(&settings.api_endpoint)?;

        Ok(Self {
            client,
            base_url: settings.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Turn a non-success response into an error, preferring the server's
    /// `error` field over the fallback text.
    async fn error_from_response(response: Response, fallback: &str) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Status { status, message }
    }
}

#[async_trait]
impl DocumentApi for ApiClient {
    async fn create_upload_target(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadTarget, ApiError> {
        let url = self.endpoint("/documents/upload")?;
        debug!(filename = %request.filename, content_type = %request.content_type, "Requesting upload target");

        let start = Instant::now();
        let response = self.client.post(url).json(request).send().await?;
        let duration = start.elapsed();

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "Upload failed").await);
        }

        let body = response.text().await?;
        let target: UploadTarget = serde_json::from_str(&body)?;
        info!(
            document_id = %target.document_id,
            duration_ms = duration.as_millis() as u64,
            "Upload target created"
        );
        Ok(target)
    }

    async fn transfer(
        &self,
        target: &UploadTarget,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), ApiError> {
        let url = Url::parse(&target.write_url)?;
        debug!(document_id = %target.document_id, size = bytes.len(), "Transferring document");

        let start = Instant::now();
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(
                Self::error_from_response(response, "Failed to upload to storage").await,
            );
        }

        info!(
            document_id = %target.document_id,
            size = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document transferred"
        );
        Ok(())
    }

    async fn analysis_status(&self, document_id: &str) -> Result<AnalysisReport, ApiError> {
        let mut url = self.endpoint("/documents/analyze")?;
        url.query_pairs_mut().append_pair("documentId", document_id);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "Status check failed").await);
        }

        let body = response.text().await?;
        let report: AnalysisReport = serde_json::from_str(&body)?;
        debug!(document_id = %document_id, status = %report.status, "Analysis status");
        Ok(report)
    }

    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> Result<SearchResponse, ApiError> {
        let mut url = self.endpoint("/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", filter.as_str());

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "Search failed").await);
        }

        let body = response.text().await?;
        let results: SearchResponse = serde_json::from_str(&body)?;
        debug!(
            query = %query,
            filter = %filter,
            hits = results.results.as_ref().map(|r| r.len()).unwrap_or(0),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(results)
    }
}
