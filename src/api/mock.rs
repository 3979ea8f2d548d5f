//! Scripted [`DocumentApi`] for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ApiError, DocumentApi};
use crate::models::{
    AnalysisReport, AnalysisStatus, SearchFilter, SearchResponse, UploadRequest, UploadTarget,
};

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateUploadTarget(UploadRequest),
    Transfer {
        document_id: String,
        content_type: String,
        size: usize,
    },
    AnalysisStatus(String),
    Search {
        query: String,
        filter: String,
    },
}

#[derive(Default)]
struct Script {
    targets: VecDeque<Result<UploadTarget, ApiError>>,
    transfers: VecDeque<Result<(), ApiError>>,
    statuses: VecDeque<Result<AnalysisReport, ApiError>>,
    searches: VecDeque<Result<SearchResponse, ApiError>>,
    calls: Vec<MockCall>,
}

/// Mock document service.
///
/// Responses are queued per operation and returned in FIFO order. An
/// operation with nothing queued answers with a 404 error.
#[derive(Clone, Default)]
pub struct MockDocumentApi {
    script: Arc<Mutex<Script>>,
}

impl MockDocumentApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// An upload target with a placeholder write URL.
    pub fn target(document_id: &str) -> UploadTarget {
        UploadTarget {
            write_url: format!("https://storage.example.com/uploads/{}", document_id),
            document_id: document_id.to_string(),
            key: None,
        }
    }

    /// A status report with only the status set.
    pub fn report(status: &str) -> AnalysisReport {
        AnalysisReport {
            document_id: None,
            status: AnalysisStatus::from(status),
            analysis: None,
            metadata: None,
        }
    }

    pub fn push_target(&self, response: Result<UploadTarget, ApiError>) {
        self.with_script(|s| s.targets.push_back(response));
    }

    pub fn push_transfer(&self, response: Result<(), ApiError>) {
        self.with_script(|s| s.transfers.push_back(response));
    }

    pub fn push_status(&self, response: Result<AnalysisReport, ApiError>) {
        self.with_script(|s| s.statuses.push_back(response));
    }

    pub fn push_search(&self, response: Result<SearchResponse, ApiError>) {
        self.with_script(|s| s.searches.push_back(response));
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.with_script(|s| s.calls.clone())
    }

    pub fn call_count(&self) -> usize {
        self.with_script(|s| s.calls.len())
    }

    /// Number of status checks made so far.
    pub fn status_call_count(&self) -> usize {
        self.with_script(|s| {
            s.calls
                .iter()
                .filter(|c| matches!(c, MockCall::AnalysisStatus(_)))
                .count()
        })
    }

    fn with_script<T>(&self, f: impl FnOnce(&mut Script) -> T) -> T {
        let mut script = match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut script)
    }

    fn unscripted(operation: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("No mock response configured for {}", operation),
        }
    }
}

#[async_trait]
impl DocumentApi for MockDocumentApi {
    async fn create_upload_target(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadTarget, ApiError> {
        self.with_script(|s| {
            s.calls.push(MockCall::CreateUploadTarget(request.clone()));
            s.targets
                .pop_front()
                .unwrap_or_else(|| Err(Self::unscripted("create_upload_target")))
        })
    }

    async fn transfer(
        &self,
        target: &UploadTarget,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), ApiError> {
        self.with_script(|s| {
            s.calls.push(MockCall::Transfer {
                document_id: target.document_id.clone(),
                content_type: content_type.to_string(),
                size: bytes.len(),
            });
            s.transfers
                .pop_front()
                .unwrap_or_else(|| Err(Self::unscripted("transfer")))
        })
    }

    async fn analysis_status(&self, document_id: &str) -> Result<AnalysisReport, ApiError> {
        self.with_script(|s| {
            s.calls
                .push(MockCall::AnalysisStatus(document_id.to_string()));
            s.statuses
                .pop_front()
                .unwrap_or_else(|| Err(Self::unscripted("analysis_status")))
        })
    }

    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> Result<SearchResponse, ApiError> {
        self.with_script(|s| {
            s.calls.push(MockCall::Search {
                query: query.to_string(),
                filter: filter.as_str().to_string(),
            });
            s.searches
                .pop_front()
                .unwrap_or_else(|| Err(Self::unscripted("search")))
        })
    }
}
