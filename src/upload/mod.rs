//! Upload-and-poll coordination.
//!
//! [`UploadCoordinator::submit`] validates a file, obtains a write target,
//! transfers the bytes, then starts a background chain that polls the
//! analysis status until the service reports completion.

mod poll;
mod state;

pub use poll::{PollConfig, PollHandle, PollOutcome};
pub use state::UploadState;

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiError, DocumentApi};
use crate::display::{Notifier, StatusLevel};
use crate::models::{AnalysisReport, UploadFile};
use poll::Poller;

/// Message shown when a file of the wrong type is selected.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a PDF, DOCX, or TXT file.";

/// Reasons an upload can fail before polling starts.
#[derive(Debug, Error)]
pub enum UploadError {
    /// File type is not in the accepted set; nothing was sent
    #[error("unsupported content type '{0}'")]
    UnsupportedType(String),

    /// The service rejected or never answered the upload-target request
    #[error("{0}")]
    TargetCreationFailed(String),

    /// Writing the bytes to the upload target failed
    #[error("{0}")]
    TransferFailed(String),
}

impl UploadError {
    /// Status line shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::UnsupportedType(_) => UNSUPPORTED_TYPE_MESSAGE.to_string(),
            other => format!("Upload failed: {}", other),
        }
    }
}

/// Drives uploads and their status polling.
#[derive(Clone)]
pub struct UploadCoordinator {
    api: Arc<dyn DocumentApi>,
    notifier: Arc<dyn Notifier>,
    poll_config: PollConfig,
}

impl UploadCoordinator {
    pub fn new(
        api: Arc<dyn DocumentApi>,
        notifier: Arc<dyn Notifier>,
        poll_config: PollConfig,
    ) -> Self {
        Self {
            api,
            notifier,
            poll_config,
        }
    }

    /// Upload a file and start polling for its analysis.
    ///
    /// Returns once the bytes are stored; the returned handle carries the
    /// document ID and tracks the background poll chain.
    pub async fn submit(&self, file: &UploadFile) -> Result<PollHandle, UploadError> {
        let document_id = self.upload(file).await?;
        Ok(self.spawn_poll(document_id, CancellationToken::new()))
    }

    /// Validate and upload a file without polling. Returns the document ID.
    pub async fn upload(&self, file: &UploadFile) -> Result<String, UploadError> {
        let mut state = UploadState::Idle;

        self.advance(&mut state, UploadState::Validating, &file.filename);
        if !file.is_accepted() {
            let err = UploadError::UnsupportedType(file.content_type.clone());
            return Err(self.fail(&mut state, err, &file.filename));
        }

        self.notifier
            .notify(StatusLevel::Info, "Uploading document...");

        self.advance(&mut state, UploadState::RequestingTarget, &file.filename);
        let target = match self.api.create_upload_target(&file.upload_request()).await {
            Ok(target) => target,
            Err(e) => {
                let err = UploadError::TargetCreationFailed(e.user_message());
                return Err(self.fail(&mut state, err, &file.filename));
            }
        };

        self.advance(&mut state, UploadState::Transferring, &file.filename);
        if let Err(e) = self
            .api
            .transfer(&target, &file.content_type, &file.bytes)
            .await
        {
            let err = UploadError::TransferFailed(e.user_message());
            return Err(self.fail(&mut state, err, &file.filename));
        }

        self.advance(&mut state, UploadState::Uploaded, &file.filename);
        info!(
            filename = %file.filename,
            document_id = %target.document_id,
            "Document uploaded"
        );
        self.notifier.notify(
            StatusLevel::Success,
            &format!(
                "Document uploaded successfully! Document ID: {}",
                target.document_id
            ),
        );

        Ok(target.document_id)
    }

    /// Start a background poll chain for an already uploaded document.
    pub fn spawn_poll(&self, document_id: String, token: CancellationToken) -> PollHandle {
        self.poller().spawn(document_id, token)
    }

    /// Poll on the current task until the chain ends.
    pub async fn poll_status(&self, document_id: &str, token: &CancellationToken) -> PollOutcome {
        self.poller().run(document_id, token, None).await
    }

    /// One status request, returned as-is.
    pub async fn check_status(&self, document_id: &str) -> Result<AnalysisReport, ApiError> {
        self.api.analysis_status(document_id).await
    }

    fn poller(&self) -> Poller {
        Poller {
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
            config: self.poll_config.clone(),
        }
    }

    fn advance(&self, state: &mut UploadState, next: UploadState, filename: &str) {
        debug_assert!(state.can_transition_to(&next), "{} -> {}", state, next);
        debug!(filename = %filename, from = %state, to = %next, "Upload state");
        *state = next;
    }

    fn fail(&self, state: &mut UploadState, err: UploadError, filename: &str) -> UploadError {
        warn!(filename = %filename, stage = %state, error = %err, "Upload failed");
        self.advance(state, UploadState::Failed(err.to_string()), filename);
        self.notifier.notify(StatusLevel::Error, &err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::{MockCall, MockDocumentApi};
    use crate::display::RecordingNotifier;
    use crate::models::{
        SearchFilter, SearchResponse, UploadRequest, UploadTarget, DOCX_CONTENT_TYPE,
        PDF_CONTENT_TYPE,
    };

    fn coordinator(api: &MockDocumentApi, notifier: &RecordingNotifier) -> UploadCoordinator {
        UploadCoordinator::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            PollConfig::default(),
        )
    }

    fn pdf() -> UploadFile {
        UploadFile::new("season.pdf", PDF_CONTENT_TYPE, b"%PDF-1.7".to_vec())
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Status {
            status: 400,
            message: message.to_string(),
        }
    }

    // ========================================================================
    // upload
    // ========================================================================

    #[tokio::test]
    async fn test_unsupported_type_fails_without_network_calls() {
        let api = MockDocumentApi::new();
        let notifier = RecordingNotifier::new();
        let coordinator = coordinator(&api, &notifier);

        for content_type in ["image/png", "application/msword", "text/html", ""] {
            let file = UploadFile::new("x", content_type, vec![1, 2, 3]);
            let err = coordinator.submit(&file).await.err().unwrap();
            assert!(matches!(err, UploadError::UnsupportedType(ref ct) if ct == content_type));
        }

        assert_eq!(api.call_count(), 0);
        assert_eq!(
            notifier.last(),
            Some((StatusLevel::Error, UNSUPPORTED_TYPE_MESSAGE.to_string()))
        );
        assert!(notifier.at_level(StatusLevel::Info).is_empty());
    }

    #[tokio::test]
    async fn test_target_creation_failure_skips_transfer() {
        let api = MockDocumentApi::new();
        api.push_target(Err(rejected("Invalid filename")));
        let notifier = RecordingNotifier::new();

        let err = coordinator(&api, &notifier)
            .upload(&pdf())
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::TargetCreationFailed(ref m) if m == "Invalid filename"));
        assert_eq!(api.calls().len(), 1);
        assert!(matches!(api.calls()[0], MockCall::CreateUploadTarget(_)));
        assert_eq!(
            notifier.messages(),
            vec![
                (StatusLevel::Info, "Uploading document...".to_string()),
                (StatusLevel::Error, "Upload failed: Invalid filename".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_transfer_failure_reports_transfer_failed() {
        let api = MockDocumentApi::new();
        api.push_target(Ok(MockDocumentApi::target("doc-1")));
        api.push_transfer(Err(ApiError::Status {
            status: 403,
            message: "Failed to upload to storage".to_string(),
        }));
        let notifier = RecordingNotifier::new();

        let err = coordinator(&api, &notifier)
            .submit(&pdf())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, UploadError::TransferFailed(_)));
        assert_eq!(err.user_message(), "Upload failed: Failed to upload to storage");
        assert_eq!(api.status_call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_sends_request_then_bytes() {
        let api = MockDocumentApi::new();
        api.push_target(Ok(MockDocumentApi::target("doc-42")));
        api.push_transfer(Ok(()));
        let notifier = RecordingNotifier::new();

        let file = UploadFile::new("draft.docx", DOCX_CONTENT_TYPE, vec![0u8; 16]);
        let id = coordinator(&api, &notifier).upload(&file).await.unwrap();

        assert_eq!(id, "doc-42");
        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            MockCall::CreateUploadTarget(req) => {
                assert_eq!(req.filename, "draft.docx");
                assert_eq!(req.content_type, DOCX_CONTENT_TYPE);
            }
            other => panic!("unexpected call {:?}", other),
        }
        match &calls[1] {
            MockCall::Transfer {
                document_id,
                content_type,
                size,
            } => {
                assert_eq!(document_id, "doc-42");
                assert_eq!(content_type, DOCX_CONTENT_TYPE);
                assert_eq!(*size, 16);
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(
            notifier.last(),
            Some((
                StatusLevel::Success,
                "Document uploaded successfully! Document ID: doc-42".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_repeated_submits_are_not_deduplicated() {
        let api = MockDocumentApi::new();
        for id in ["doc-a", "doc-b"] {
            api.push_target(Ok(MockDocumentApi::target(id)));
            api.push_transfer(Ok(()));
        }
        let notifier = RecordingNotifier::new();
        let coordinator = coordinator(&api, &notifier);

        let first = coordinator.upload(&pdf()).await.unwrap();
        let second = coordinator.upload(&pdf()).await.unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("doc-a", "doc-b"));
        assert_eq!(api.call_count(), 4);
    }

    // ========================================================================
    // polling
    // ========================================================================

    fn uploaded(api: &MockDocumentApi, id: &str) {
        api.push_target(Ok(MockDocumentApi::target(id)));
        api.push_transfer(Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed_then_stops() {
        let api = MockDocumentApi::new();
        uploaded(&api, "doc-1");
        api.push_status(Ok(MockDocumentApi::report("pending")));
        api.push_status(Ok(MockDocumentApi::report("pending")));
        api.push_status(Ok(MockDocumentApi::report("completed")));
        let notifier = RecordingNotifier::new();

        let start = tokio::time::Instant::now();
        let handle = coordinator(&api, &notifier).submit(&pdf()).await.unwrap();
        assert_eq!(handle.document_id(), "doc-1");

        let outcome = handle.wait().await;
        assert!(outcome.is_completed());
        // 3s before the first check, 5s between the rest
        assert!(start.elapsed() >= Duration::from_secs(13));
        assert_eq!(api.status_call_count(), 3);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.status_call_count(), 3);

        let completions: Vec<_> = notifier
            .at_level(StatusLevel::Success)
            .into_iter()
            .filter(|m| m == "Document analysis completed!")
            .collect();
        assert_eq!(completions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_errors_are_retried_and_not_surfaced() {
        let api = MockDocumentApi::new();
        uploaded(&api, "doc-1");
        api.push_status(Err(ApiError::Status {
            status: 404,
            message: "Document not found".to_string(),
        }));
        api.push_status(Ok(MockDocumentApi::report("completed")));
        let notifier = RecordingNotifier::new();

        let handle = coordinator(&api, &notifier).submit(&pdf()).await.unwrap();
        let outcome = handle.wait().await;

        assert!(outcome.is_completed());
        assert_eq!(api.status_call_count(), 2);
        assert!(notifier.at_level(StatusLevel::Error).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandons_after_max_attempts() {
        let api = MockDocumentApi::new();
        for _ in 0..10 {
            api.push_status(Ok(MockDocumentApi::report("processing")));
        }
        let notifier = RecordingNotifier::new();
        let coordinator = UploadCoordinator::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            PollConfig {
                max_attempts: Some(4),
                ..PollConfig::default()
            },
        );

        let outcome = coordinator
            .poll_status("doc-1", &CancellationToken::new())
            .await;

        assert!(matches!(outcome, PollOutcome::Abandoned { attempts: 4 }));
        assert_eq!(api.status_call_count(), 4);
        assert_eq!(
            notifier.last(),
            Some((
                StatusLevel::Error,
                "Document analysis did not complete after 4 status checks.".to_string()
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        // No scripted statuses: every check errors, so only cancellation ends the chain
        let api = MockDocumentApi::new();
        uploaded(&api, "doc-1");
        let notifier = RecordingNotifier::new();
        let coordinator = UploadCoordinator::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            PollConfig {
                max_attempts: None,
                ..PollConfig::default()
            },
        );

        let handle = coordinator.submit(&pdf()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(api.status_call_count(), 2);

        handle.cancel();
        let outcome = handle.wait().await;
        assert!(matches!(outcome, PollOutcome::Cancelled));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.status_call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_tracks_state() {
        let api = MockDocumentApi::new();
        uploaded(&api, "doc-1");
        api.push_status(Ok(MockDocumentApi::report("pending")));
        api.push_status(Ok(MockDocumentApi::report("completed")));
        let notifier = RecordingNotifier::new();

        let handle = coordinator(&api, &notifier).submit(&pdf()).await.unwrap();
        assert_eq!(handle.state(), UploadState::Uploaded);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(handle.state(), UploadState::Polling { attempt: 1 });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.state(), UploadState::Completed);
        assert!(handle.wait().await.is_completed());
    }

    /// Service whose status endpoint brings the poll task down.
    struct PanickingApi;

    #[async_trait::async_trait]
    impl DocumentApi for PanickingApi {
        async fn create_upload_target(&self, _: &UploadRequest) -> Result<UploadTarget, ApiError> {
            Ok(MockDocumentApi::target("doc-1"))
        }

        async fn transfer(&self, _: &UploadTarget, _: &str, _: &[u8]) -> Result<(), ApiError> {
            Ok(())
        }

        async fn analysis_status(&self, _: &str) -> Result<AnalysisReport, ApiError> {
            panic!("status decoder blew up");
        }

        async fn search(&self, _: &str, _: &SearchFilter) -> Result<SearchResponse, ApiError> {
            Ok(SearchResponse::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_poll_task_is_not_reported_as_cancelled() {
        let notifier = RecordingNotifier::new();
        let coordinator = UploadCoordinator::new(
            Arc::new(PanickingApi),
            Arc::new(notifier.clone()),
            PollConfig::default(),
        );

        let handle = coordinator.submit(&pdf()).await.unwrap();
        let outcome = handle.wait().await;

        assert!(matches!(outcome, PollOutcome::Failed(_)), "got {:?}", outcome);
        assert!(!outcome.is_completed());
    }

    #[tokio::test]
    async fn test_check_status_returns_report() {
        let api = MockDocumentApi::new();
        api.push_status(Ok(MockDocumentApi::report("processing")));
        let notifier = RecordingNotifier::new();

        let report = coordinator(&api, &notifier)
            .check_status("doc-9")
            .await
            .unwrap();
        assert_eq!(report.status.as_str(), "processing");
        assert_eq!(api.calls(), vec![MockCall::AnalysisStatus("doc-9".to_string())]);
        assert!(notifier.messages().is_empty());
    }
}
