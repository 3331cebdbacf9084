//! Backend collaborator seam for Regscope.
//!
//! The [`Backend`] trait covers every external endpoint the console
//! consumes: summarization preview, commit/persistence, paginated reads,
//! the server-computed visualization payload, and the notification
//! side-channel. Implementations must be `Send + Sync` to work with async
//! runtimes.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`preview`](Backend::preview) | Summarize/tag a URL or pasted text into a draft |
//! | [`commit`](Backend::commit) | Persist a draft, yielding an identified record |
//! | [`list_documents`](Backend::list_documents) | Paginated corpus read |
//! | [`get_document`](Backend::get_document) | Single full document read |
//! | [`visualization_data`](Backend::visualization_data) | Server-computed aggregation payload |
//! | [`notify`](Backend::notify) | Fire-and-forget notification for a document |

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{DocumentRecord, PreviewInput};

/// Failure classes for backend calls.
///
/// The staging workflow treats all three the same way (the session lands
/// in its `Error` state with the message retained), but callers that talk
/// to the backend directly can distinguish them.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, DNS, or timeout failure before a response arrived.
    #[error("backend unreachable: {0}")]
    Transport(String),
    /// The backend answered with a non-success HTTP status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The backend answered successfully but the body is missing required
    /// fields. No partial result is ever accepted.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Draft returned by the summarization collaborator.
///
/// `title`, `text`, `tags`, `entities`, `severity`, and `probability` are
/// required: a response missing any of them is malformed and rejected
/// whole.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviewResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub severity: f64,
    pub probability: f64,
}

/// Payload sent to the persistence collaborator on commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRequest {
    pub url: Option<String>,
    pub text: String,
    pub title: String,
}

/// Identity assigned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitReceipt {
    pub id: String,
    /// Whether the commit created a new record (as opposed to updating an
    /// existing one for the same URL).
    #[serde(default)]
    pub created: bool,
}

/// One page of the corpus listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub items: Vec<DocumentRecord>,
}

/// Server-computed aggregation input, one field per projection.
///
/// Every field is kept as raw JSON: the aggregator degrades each
/// malformed or missing projection independently to its empty form
/// rather than rejecting the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualizationPayload {
    #[serde(default)]
    pub source_counts: Value,
    #[serde(default)]
    pub tags_by_source: Value,
    #[serde(default)]
    pub severity_points: Value,
    #[serde(default)]
    pub word_freq: Value,
    #[serde(default)]
    pub network_nodes: Value,
    #[serde(default)]
    pub network_edges: Value,
    #[serde(default)]
    pub timeline: Value,
}

/// Abstract backend for the corpus service.
///
/// [`http::HttpBackend`] is the production implementation;
/// [`memory::MemoryBackend`] is a deterministic in-memory fake for tests
/// and offline development.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Ask the summarization collaborator for a draft of the given input.
    async fn preview(&self, input: &PreviewInput) -> BackendResult<PreviewResponse>;

    /// Persist a draft. The store assigns identity at this point.
    async fn commit(&self, request: &CommitRequest) -> BackendResult<CommitReceipt>;

    /// Read one page of the corpus. Pages are 1-based.
    async fn list_documents(&self, page: u32, page_size: u32) -> BackendResult<DocumentPage>;

    /// Read a single full document by id.
    async fn get_document(&self, id: &str) -> BackendResult<DocumentRecord>;

    /// Fetch the server-computed aggregation payload.
    async fn visualization_data(&self) -> BackendResult<VisualizationPayload>;

    /// Fire the notification side-channel for a committed document.
    async fn notify(&self, doc_id: &str) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_receipt_created_defaults_to_false() {
        let receipt: CommitReceipt = serde_json::from_str(r#"{"id": "d1"}"#).unwrap();
        assert_eq!(receipt.id, "d1");
        assert!(!receipt.created);
    }

    #[test]
    fn slim_list_items_decode_with_defaults() {
        let page: DocumentPage = serde_json::from_str(
            r#"{"total": 1, "page": 1, "page_size": 20,
                "items": [{"id": "d1", "source": "Gazette", "snippet": "s",
                           "tags": ["Copyright"], "severity": 2.0,
                           "probability": 0.5}]}"#,
        )
        .unwrap();

        let doc = &page.items[0];
        assert_eq!(doc.id, "d1");
        assert!(doc.text.is_empty());
        assert!(doc.entities.is_empty());
        assert_eq!(doc.severity, Some(2.0));
    }

    #[test]
    fn preview_response_missing_required_fields_is_rejected() {
        // No partial draft: a response without scores is malformed whole.
        let result: Result<PreviewResponse, _> =
            serde_json::from_str(r#"{"title": "T", "text": "body"}"#);
        assert!(result.is_err());
    }
}
