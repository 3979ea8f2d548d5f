//! Upload and analysis status models.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Content types the service will analyze. Matched exactly, no wildcards.
pub const ACCEPTED_CONTENT_TYPES: &[&str] =
    &[PDF_CONTENT_TYPE, DOCX_CONTENT_TYPE, TEXT_CONTENT_TYPE];

/// A file selected by the user for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// The content type is the override when given, otherwise it is guessed
    /// from the extension. Files without a recognizable extension get
    /// `application/octet-stream`, which is then rejected at submit time.
    pub async fn from_path(path: &Path, content_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        Ok(Self::new(filename, content_type, bytes))
    }

    /// Whether the content type is one the service accepts.
    pub fn is_accepted(&self) -> bool {
        ACCEPTED_CONTENT_TYPES.contains(&self.content_type.as_str())
    }

    /// Build the request body for creating an upload target.
    pub fn upload_request(&self) -> UploadRequest {
        UploadRequest {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Body of `POST /documents/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
}

/// A pre-authorized write destination for one document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    #[serde(rename = "uploadUrl")]
    pub write_url: String,
    pub document_id: String,
    /// Storage key the server assigned, when it reports one.
    #[serde(default)]
    pub key: Option<String>,
}

/// Processing state reported by the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Unknown,
    Other(String),
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Unknown => "unknown",
            AnalysisStatus::Other(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisStatus::Completed)
    }
}

impl From<&str> for AnalysisStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => AnalysisStatus::Pending,
            "processing" => AnalysisStatus::Processing,
            "completed" => AnalysisStatus::Completed,
            "unknown" => AnalysisStatus::Unknown,
            other => AnalysisStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnalysisStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnalysisStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AnalysisStatus::from(s.as_str()))
    }
}

/// Body of `GET /documents/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default)]
    pub document_id: Option<String>,
    pub status: AnalysisStatus,
    /// Analysis output, present once processing has completed.
    #[serde(default)]
    pub analysis: Option<serde_json::Value>,
    /// Raw tracking record, present while processing is underway.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl AnalysisReport {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}
