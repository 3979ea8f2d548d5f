//! Client for the remote document service.
//!
//! All HTTP traffic goes through the [`DocumentApi`] trait so the upload
//! coordinator and search can run against a test double.

mod client;
mod error;
mod mock;

pub use client::{resolve_user_agent, ApiClient};
pub use error::ApiError;
pub use mock::{MockCall, MockDocumentApi};

use async_trait::async_trait;

use crate::models::{AnalysisReport, SearchFilter, SearchResponse, UploadRequest, UploadTarget};

/// Operations the document service exposes.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// `POST /documents/upload`: obtain a pre-authorized write target.
    async fn create_upload_target(&self, request: &UploadRequest)
        -> Result<UploadTarget, ApiError>;

    /// `PUT <uploadUrl>`: write the raw document bytes to the target.
    async fn transfer(
        &self,
        target: &UploadTarget,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), ApiError>;

    /// `GET /documents/analyze?documentId=<id>`.
    async fn analysis_status(&self, document_id: &str) -> Result<AnalysisReport, ApiError>;

    /// `GET /search?q=<query>&type=<type>`.
    async fn search(&self, query: &str, filter: &SearchFilter)
        -> Result<SearchResponse, ApiError>;
}
