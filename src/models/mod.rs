//! Data types exchanged with the document service.

mod search;
mod upload;

pub use search::{format_date, DocumentType, ResultCard, SearchFilter, SearchHit, SearchResponse};
pub use upload::{
    AnalysisReport, AnalysisStatus, UploadFile, UploadRequest, UploadTarget, ACCEPTED_CONTENT_TYPES,
    DOCX_CONTENT_TYPE, PDF_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
