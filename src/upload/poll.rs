//! Status polling for an uploaded document.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::UploadState;
use crate::api::DocumentApi;
use crate::config::Settings;
use crate::display::{Notifier, StatusLevel};
use crate::models::AnalysisReport;

/// Timing of a poll chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait before the first status check.
    pub initial_delay: Duration,
    /// Wait between subsequent status checks.
    pub interval: Duration,
    /// Give up after this many checks. None polls until completed or cancelled.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for PollConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            initial_delay: settings.initial_poll_delay(),
            interval: settings.poll_interval(),
            max_attempts: settings.max_poll_attempts,
        }
    }
}

/// How a poll chain ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The service reported `completed`.
    Completed(AnalysisReport),
    /// The attempt limit ran out first.
    Abandoned { attempts: u32 },
    /// The chain was cancelled.
    Cancelled,
    /// The poll task died before reaching an outcome.
    Failed(String),
}

impl PollOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }
}

/// Handle to a background poll chain.
pub struct PollHandle {
    document_id: String,
    token: CancellationToken,
    state: watch::Receiver<UploadState>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Current lifecycle state of the upload.
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Token that cancels this chain.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the chain to end.
    pub async fn wait(self) -> PollOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(document_id = %self.document_id, error = %e, "Poll task ended abnormally");
                PollOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Runs one poll chain. Each iteration is a sleep followed by one status request.
pub(super) struct Poller {
    pub api: Arc<dyn DocumentApi>,
    pub notifier: Arc<dyn Notifier>,
    pub config: PollConfig,
}

impl Poller {
    /// Start the chain on a background task.
    pub fn spawn(self, document_id: String, token: CancellationToken) -> PollHandle {
        let (state_tx, state_rx) = watch::channel(UploadState::Uploaded);
        let task = {
            let document_id = document_id.clone();
            let token = token.clone();
            tokio::spawn(async move { self.run(&document_id, &token, Some(&state_tx)).await })
        };

        PollHandle {
            document_id,
            token,
            state: state_rx,
            task,
        }
    }

    pub async fn run(
        &self,
        document_id: &str,
        token: &CancellationToken,
        state: Option<&watch::Sender<UploadState>>,
    ) -> PollOutcome {
        let publish = |next: UploadState| {
            debug!(document_id = %document_id, state = %next, "Upload state");
            if let Some(tx) = state {
                tx.send_replace(next);
            }
        };

        let mut attempts: u32 = 0;
        let mut delay = self.config.initial_delay;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    publish(UploadState::Cancelled);
                    return PollOutcome::Cancelled;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            attempts += 1;
            publish(UploadState::Polling { attempt: attempts });

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    publish(UploadState::Cancelled);
                    return PollOutcome::Cancelled;
                }
                result = self.api.analysis_status(document_id) => result,
            };

            match result {
                Ok(report) if report.is_completed() => {
                    info!(document_id = %document_id, attempts, "Document analysis completed");
                    self.notifier
                        .notify(StatusLevel::Success, "Document analysis completed!");
                    publish(UploadState::Completed);
                    return PollOutcome::Completed(report);
                }
                Ok(report) => {
                    debug!(document_id = %document_id, status = %report.status, attempt = attempts, "Analysis not finished");
                }
                Err(e) => {
                    // Transient; keep polling
                    warn!(document_id = %document_id, attempt = attempts, error = %e, "Error checking analysis status");
                }
            }

            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    warn!(document_id = %document_id, attempts, "Giving up on analysis status");
                    self.notifier.notify(
                        StatusLevel::Error,
                        &format!(
                            "Document analysis did not complete after {} status checks.",
                            attempts
                        ),
                    );
                    publish(UploadState::Abandoned { attempts });
                    return PollOutcome::Abandoned { attempts };
                }
            }

            delay = self.config.interval;
        }
    }
}
