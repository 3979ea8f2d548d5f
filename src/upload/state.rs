//! Lifecycle of a single upload.

use std::fmt;

/// Where one upload is in its lifecycle.
///
/// `Idle -> Validating -> RequestingTarget -> Transferring -> Uploaded ->
/// Polling -> Completed`. The three active upload states may fall into
/// `Failed`. Polling never fails; it ends in `Completed`, `Abandoned`
/// or `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Validating,
    RequestingTarget,
    Transferring,
    Uploaded,
    Polling { attempt: u32 },
    Completed,
    Abandoned { attempts: u32 },
    Cancelled,
    Failed(String),
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Completed
                | UploadState::Abandoned { .. }
                | UploadState::Cancelled
                | UploadState::Failed(_)
        )
    }

    /// Whether moving from `self` to `next` follows the lifecycle.
    pub fn can_transition_to(&self, next: &UploadState) -> bool {
        use UploadState::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Idle, Validating) => true,
            (Validating, RequestingTarget) => true,
            (RequestingTarget, Transferring) => true,
            (Transferring, Uploaded) => true,
            (Validating | RequestingTarget | Transferring, Failed(_)) => true,
            (Uploaded, Polling { attempt }) => *attempt == 1,
            (Polling { attempt: a }, Polling { attempt: b }) => *b == a + 1,
            (Uploaded | Polling { .. }, Completed | Abandoned { .. } | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Idle => write!(f, "idle"),
            UploadState::Validating => write!(f, "validating"),
            UploadState::RequestingTarget => write!(f, "requesting_target"),
            UploadState::Transferring => write!(f, "transferring"),
            UploadState::Uploaded => write!(f, "uploaded"),
            UploadState::Polling { attempt } => write!(f, "polling({})", attempt),
            UploadState::Completed => write!(f, "completed"),
            UploadState::Abandoned { attempts } => write!(f, "abandoned({})", attempts),
            UploadState::Cancelled => write!(f, "cancelled"),
            UploadState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
