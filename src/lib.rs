//! docdesk: upload documents for analysis, follow their processing, and
//! search the analyzed collection.
//!
//! - [`upload::UploadCoordinator`] validates, uploads and polls.
//! - [`search::SearchService`] runs keyword searches.
//! - [`api::ApiClient`] talks HTTP to the document service.
//! - [`display`] holds the output interfaces both of them report through.

pub mod api;
pub mod config;
pub mod display;
pub mod models;
pub mod search;
pub mod upload;

pub use api::{ApiClient, ApiError, DocumentApi};
pub use config::{load_settings, Config, Settings};
pub use search::{SearchOutcome, SearchService};
pub use upload::{PollConfig, PollHandle, PollOutcome, UploadCoordinator, UploadError, UploadState};
