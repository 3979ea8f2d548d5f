//! In-memory display implementations for tests and embedding.

use std::sync::{Arc, Mutex};

use super::{Notifier, ResultsView, StatusLevel};
use crate::api::ApiError;
use crate::models::ResultCard;

/// Records every status message it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<(StatusLevel, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(StatusLevel, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Messages at the given level, in order.
    pub fn at_level(&self, level: StatusLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn last(&self) -> Option<(StatusLevel, String)> {
        self.messages().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: StatusLevel, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

/// What a [`RecordingResultsView`] was last asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedView {
    Results(Vec<ResultCard>),
    NoResults,
    SearchError(String),
}

/// Records every render call.
///
/// Search errors are recorded as [`RecordedView::NoResults`] unless
/// constructed with [`distinguishing_errors`](Self::distinguishing_errors).
#[derive(Clone, Default)]
pub struct RecordingResultsView {
    renders: Arc<Mutex<Vec<RecordedView>>>,
    distinguish_errors: bool,
}

impl RecordingResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinguishing_errors() -> Self {
        Self {
            distinguish_errors: true,
            ..Self::default()
        }
    }

    pub fn renders(&self) -> Vec<RecordedView> {
        self.renders.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<RecordedView> {
        self.renders().last().cloned()
    }

    fn push(&self, view: RecordedView) {
        if let Ok(mut renders) = self.renders.lock() {
            renders.push(view);
        }
    }
}

impl ResultsView for RecordingResultsView {
    fn render_results(&self, cards: &[ResultCard]) {
        self.push(RecordedView::Results(cards.to_vec()));
    }

    fn render_no_results(&self) {
        self.push(RecordedView::NoResults);
    }

    fn render_search_error(&self, error: &ApiError) {
        if self.distinguish_errors {
            self.push(RecordedView::SearchError(error.user_message()));
        } else {
            self.render_no_results();
        }
    }
}
