//! User-facing output.
//!
//! The upload coordinator and search never print directly. They report
//! through a [`Notifier`] and a [`ResultsView`], which the caller supplies.

mod terminal;
mod recording;

pub use terminal::{ConsoleNotifier, ConsoleResultsView};
pub use recording::{RecordedView, RecordingNotifier, RecordingResultsView};

use std::fmt;

use crate::api::ApiError;
use crate::models::ResultCard;

/// Text shown when a search yields nothing.
pub const NO_RESULTS_MESSAGE: &str = "No results found. Try a different search term.";

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusLevel::Info => "info",
            StatusLevel::Success => "success",
            StatusLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Receives upload and analysis status messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: StatusLevel, message: &str);
}

/// Renders search outcomes.
pub trait ResultsView: Send + Sync {
    fn render_results(&self, cards: &[ResultCard]);

    fn render_no_results(&self);

    /// Called when the search request itself failed.
    ///
    /// Shows the same view as an empty result set unless overridden.
    fn render_search_error(&self, _error: &ApiError) {
        self.render_no_results();
    }
}
