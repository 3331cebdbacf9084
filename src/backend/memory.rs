//! In-memory [`Backend`] implementation for tests and offline development.
//!
//! Deterministic fake of the corpus service: preview echoes the input
//! back as the summary (the NLP service is external and not imitated),
//! commit assigns a UUID and derives the stored snippet, reads serve from
//! the in-memory store, and `visualization_data` is computed with the
//! local aggregator over the stored documents.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::aggregate;
use crate::models::{snippet_of, DocumentRecord, PreviewInput};

use super::{
    Backend, BackendError, BackendResult, CommitReceipt, CommitRequest, DocumentPage,
    PreviewResponse, VisualizationPayload,
};

/// In-memory corpus service fake.
pub struct MemoryBackend {
    docs: RwLock<Vec<DocumentRecord>>,
    canned_preview: RwLock<Option<PreviewResponse>>,
    notified: RwLock<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            canned_preview: RwLock::new(None),
            notified: RwLock::new(Vec::new()),
        }
    }

    /// Preload a committed document, bypassing the staging workflow.
    pub fn seed(&self, doc: DocumentRecord) {
        self.docs.write().unwrap().push(doc);
    }

    /// Serve this response for the next preview calls instead of echoing
    /// the input.
    pub fn set_preview(&self, response: PreviewResponse) {
        *self.canned_preview.write().unwrap() = Some(response);
    }

    /// Document ids that have been notified, in call order.
    pub fn notified(&self) -> Vec<String> {
        self.notified.read().unwrap().clone()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn preview(&self, input: &PreviewInput) -> BackendResult<PreviewResponse> {
        if let Some(canned) = self.canned_preview.read().unwrap().clone() {
            return Ok(canned);
        }

        // Echo semantics: the summarizer is an external collaborator, so
        // the fake returns the input itself as the "summary".
        let response = match input {
            PreviewInput::Url(url) => PreviewResponse {
                url: Some(url.clone()),
                source: None,
                title: url.clone(),
                text: url.clone(),
                tags: Vec::new(),
                entities: Vec::new(),
                severity: 0.0,
                probability: 0.0,
            },
            PreviewInput::Text(text) => PreviewResponse {
                url: None,
                source: None,
                title: "User Input".to_string(),
                text: text.clone(),
                tags: Vec::new(),
                entities: Vec::new(),
                severity: 0.0,
                probability: 0.0,
            },
        };
        Ok(response)
    }

    async fn commit(&self, request: &CommitRequest) -> BackendResult<CommitReceipt> {
        if request.text.trim().is_empty() {
            return Err(BackendError::Status {
                status: 400,
                message: "no text provided".to_string(),
            });
        }

        let mut docs = self.docs.write().unwrap();

        // Re-committing the same URL updates the existing record instead
        // of creating a duplicate.
        if let Some(url) = request.url.as_deref() {
            if let Some(doc) = docs
                .iter_mut()
                .find(|d| d.url.as_deref() == Some(url))
            {
                doc.title = request.title.clone();
                doc.source = request.title.clone();
                doc.text = request.text.clone();
                doc.snippet = snippet_of(&request.text);
                return Ok(CommitReceipt {
                    id: doc.id.clone(),
                    created: false,
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        docs.push(DocumentRecord {
            id: id.clone(),
            source: request.title.clone(),
            url: request.url.clone(),
            title: request.title.clone(),
            text: request.text.clone(),
            snippet: snippet_of(&request.text),
            tags: Vec::new(),
            entities: Vec::new(),
            severity: None,
            probability: None,
            created_at: Some(Utc::now()),
        });

        Ok(CommitReceipt { id, created: true })
    }

    async fn list_documents(&self, page: u32, page_size: u32) -> BackendResult<DocumentPage> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let docs = self.docs.read().unwrap();

        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items = docs
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(|doc| DocumentRecord {
                // List items are slim: no body, no entities.
                text: String::new(),
                entities: Vec::new(),
                ..doc.clone()
            })
            .collect();

        Ok(DocumentPage {
            total: docs.len() as u64,
            page,
            page_size,
            items,
        })
    }

    async fn get_document(&self, id: &str) -> BackendResult<DocumentRecord> {
        let docs = self.docs.read().unwrap();
        docs.iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("document not found: {}", id),
            })
    }

    async fn visualization_data(&self) -> BackendResult<VisualizationPayload> {
        let docs = self.docs.read().unwrap();
        let snapshot = aggregate::aggregate(&docs);

        Ok(VisualizationPayload {
            source_counts: serde_json::to_value(&snapshot.source_counts)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            tags_by_source: serde_json::to_value(&snapshot.tags_by_source)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            severity_points: serde_json::to_value(&snapshot.severity_points)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            word_freq: serde_json::to_value(&snapshot.word_freq)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            network_nodes: serde_json::to_value(&snapshot.network.nodes)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            network_edges: serde_json::to_value(&snapshot.network.edges)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
            timeline: serde_json::to_value(&snapshot.timeline)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
        })
    }

    async fn notify(&self, doc_id: &str) -> BackendResult<()> {
        let docs = self.docs.read().unwrap();
        if !docs.iter().any(|d| d.id == doc_id) {
            return Err(BackendError::Status {
                status: 404,
                message: format!("document not found: {}", doc_id),
            });
        }
        drop(docs);

        self.notified.write().unwrap().push(doc_id.to_string());
        Ok(())
    }
}
