//! Keyword search against the document index.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiError, DocumentApi};
use crate::display::ResultsView;
use crate::models::{ResultCard, SearchFilter};

/// What a search ended up showing.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Empty query with no type filter; nothing was requested.
    Skipped,
    /// This many cards were rendered.
    Results(usize),
    /// The service returned no matches.
    NoResults,
    /// The request failed.
    Failed(ApiError),
}

/// Runs searches and renders their results.
#[derive(Clone)]
pub struct SearchService {
    api: Arc<dyn DocumentApi>,
    view: Arc<dyn ResultsView>,
}

impl SearchService {
    pub fn new(api: Arc<dyn DocumentApi>, view: Arc<dyn ResultsView>) -> Self {
        Self { api, view }
    }

    /// Search for `query` within `filter` and render the outcome.
    pub async fn search(&self, query: &str, filter: &SearchFilter) -> SearchOutcome {
        let query = query.trim();

        if query.is_empty() && *filter == SearchFilter::All {
            debug!("Empty search, skipping request");
            self.view.render_no_results();
            return SearchOutcome::Skipped;
        }

        let response = match self.api.search(query, filter).await {
            Ok(response) => response,
            Err(e) => {
                warn!(query = %query, filter = %filter, error = %e, "Search error");
                self.view.render_search_error(&e);
                return SearchOutcome::Failed(e);
            }
        };

        let cards: Vec<ResultCard> = response.into_hits().iter().map(ResultCard::from).collect();
        if cards.is_empty() {
            self.view.render_no_results();
            return SearchOutcome::NoResults;
        }

        self.view.render_results(&cards);
        SearchOutcome::Results(cards.len())
    }
}
