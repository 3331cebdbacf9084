//! Core data models used throughout Regscope.
//!
//! These types represent the documents and drafts that flow through the
//! staging workflow and the aggregation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of the derived excerpt stored alongside a committed document.
pub const SNIPPET_CHARS: usize = 500;

/// A committed, immutable document owned by the backend store.
///
/// Only the persistence collaborator assigns `id`: anything without an
/// `id` is still a [`PreviewDraft`], not a record. List endpoints return
/// slim items (no body, no entities); serde defaults let those decode
/// into the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub severity: Option<f64>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Provenance of a preview request: exactly one of a source URL or pasted
/// text, enforced by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewInput {
    Url(String),
    Text(String),
}

/// Rejected preview input: both or neither of url/text were supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provide exactly one of url or text")]
pub struct InvalidInput;

impl PreviewInput {
    /// Build provenance from optional form fields.
    ///
    /// Whitespace-only values count as absent. Exactly one of the two
    /// must be present; anything else is rejected synchronously with no
    /// other effect.
    pub fn from_parts(url: Option<&str>, text: Option<&str>) -> Result<Self, InvalidInput> {
        let url = url.map(str::trim).filter(|s| !s.is_empty());
        let text = text.filter(|s| !s.trim().is_empty());
        match (url, text) {
            (Some(u), None) => Ok(PreviewInput::Url(u.to_string())),
            (None, Some(t)) => Ok(PreviewInput::Text(t.to_string())),
            _ => Err(InvalidInput),
        }
    }

    /// The source URL, when this input came from a URL.
    pub fn url(&self) -> Option<&str> {
        match self {
            PreviewInput::Url(u) => Some(u),
            PreviewInput::Text(_) => None,
        }
    }

    /// The pasted text, when this input came from raw text.
    pub fn text(&self) -> Option<&str> {
        match self {
            PreviewInput::Url(_) => None,
            PreviewInput::Text(t) => Some(t),
        }
    }
}

/// An unpersisted, editable candidate document produced by a preview
/// request.
///
/// Same fields as [`DocumentRecord`] minus `id`, plus the provenance it
/// was previewed from. Mutated only by local edits to `text`; replaced by
/// a record on commit or dropped on discard.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDraft {
    pub source: Option<String>,
    pub url: Option<String>,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub severity: f64,
    pub probability: f64,
    pub provenance: PreviewInput,
}

/// Derive the short excerpt stored with a committed document.
pub fn snippet_of(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}
