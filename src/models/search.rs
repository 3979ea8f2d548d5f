//! Search request and result models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Category the analysis pipeline assigns to a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentType {
    SeasonReport,
    PlayerStats,
    DraftReport,
    ContractNews,
    StadiumReport,
    Other(String),
}

impl DocumentType {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::SeasonReport => "season_report",
            DocumentType::PlayerStats => "player_stats",
            DocumentType::DraftReport => "draft_report",
            DocumentType::ContractNews => "contract_news",
            DocumentType::StadiumReport => "stadium_report",
            DocumentType::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Other(_))
    }

    /// Human-readable label. Unrecognized types are shown as-is.
    pub fn label(&self) -> &str {
        match self {
            DocumentType::SeasonReport => "Season Report",
            DocumentType::PlayerStats => "Player Stats",
            DocumentType::DraftReport => "Draft Report",
            DocumentType::ContractNews => "Contract News",
            DocumentType::StadiumReport => "Stadium Report",
            DocumentType::Other(s) => s,
        }
    }
}

impl From<&str> for DocumentType {
    fn from(s: &str) -> Self {
        match s {
            "season_report" => DocumentType::SeasonReport,
            "player_stats" => DocumentType::PlayerStats,
            "draft_report" => DocumentType::DraftReport,
            "contract_news" => DocumentType::ContractNews,
            "stadium_report" => DocumentType::StadiumReport,
            other => DocumentType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restricts a search to one document type, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchFilter {
    #[default]
    All,
    Type(DocumentType),
}

impl SearchFilter {
    pub fn as_str(&self) -> &str {
        match self {
            SearchFilter::All => "all",
            SearchFilter::Type(t) => t.as_str(),
        }
    }
}

impl FromStr for SearchFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "all" => SearchFilter::All,
            other => SearchFilter::Type(DocumentType::from(other)),
        })
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single match returned by `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub relevance: Option<f64>,
}

/// Body of `GET /search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<SearchHit>>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(rename = "type", default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

impl SearchResponse {
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.results.unwrap_or_default()
    }
}

/// A search hit prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub title: String,
    pub excerpt: String,
    pub type_label: String,
    pub date: String,
}

impl From<&SearchHit> for ResultCard {
    fn from(hit: &SearchHit) -> Self {
        Self {
            title: hit.title.clone(),
            excerpt: hit.excerpt.clone(),
            type_label: DocumentType::from(hit.doc_type.as_str()).label().to_string(),
            date: format_date(&hit.date),
        }
    }
}

/// Format a date as `Jan 15, 2024`.
///
/// Accepts plain dates, RFC 3339 timestamps and naive timestamps.
/// Anything else yields `Invalid Date`.
pub fn format_date(input: &str) -> String {
    const FORMAT: &str = "%b %-d, %Y";
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.format(FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return dt.format(FORMAT).to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return dt.format(FORMAT).to_string();
        }
    }

    "Invalid Date".to_string()
}
