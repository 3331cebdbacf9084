//! Multi-projection aggregation over the document corpus.
//!
//! [`aggregate`] turns a flat collection of documents into a
//! [`VisualizationSnapshot`]: several independent, internally-consistent
//! projections ready to hand to rendering collaborators. The computation
//! is pure and deterministic (same input, bit-identical output) with no
//! shared state, so it may run concurrently and is always a full
//! recompute; there is no incremental path.
//!
//! # Projections
//!
//! 1. Source counts — documents per source label.
//! 2. Tags-by-source matrix — dense: every source row carries every tag
//!    column present anywhere in the collection, zeros included.
//! 3. Severity/probability points — one per document carrying both
//!    scores, in input order.
//! 4. Word frequencies — computed upstream; local aggregation yields the
//!    empty list and server payloads pass through unchanged.
//! 5. Entity network — document and tag nodes, one deduplicated edge per
//!    (document, tag) association.
//! 6. Timeline — (index, severity) per document in input order.
//!
//! Source labels fall back from `source` to `url`; a document with
//! neither is excluded from source-keyed projections. An empty collection
//! produces every projection's empty form, never an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::VisualizationPayload;
use crate::models::DocumentRecord;

/// One `(probability, severity)` scatter point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPoint {
    pub probability: f64,
    pub severity: f64,
}

/// One severity sample along the corpus input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub index: u64,
    pub severity: f64,
}

/// A node in the entity network: either a document or a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An undirected document–tag association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub doc: String,
    pub tag: String,
}

/// Document/tag association graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EntityNetwork {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

impl EntityNetwork {
    /// Assemble a consistent graph from raw node and edge lists:
    /// duplicate edges collapse (first occurrence wins) and edge
    /// endpoints missing from the node list are added, so every edge
    /// always has both of its nodes.
    pub fn from_parts(nodes: Vec<NetworkNode>, edges: Vec<NetworkEdge>) -> Self {
        let mut seen_edges = BTreeSet::new();
        let mut deduped = Vec::new();
        for edge in edges {
            if seen_edges.insert((edge.doc.clone(), edge.tag.clone())) {
                deduped.push(edge);
            }
        }

        let mut node_ids: BTreeSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut nodes = nodes;
        for edge in &deduped {
            if node_ids.insert(edge.doc.clone()) {
                nodes.push(NetworkNode {
                    id: edge.doc.clone(),
                    label: edge.doc.clone(),
                    kind: "document".to_string(),
                });
            }
            if node_ids.insert(edge.tag.clone()) {
                nodes.push(NetworkNode {
                    id: edge.tag.clone(),
                    label: edge.tag.clone(),
                    kind: "tag".to_string(),
                });
            }
        }

        Self {
            nodes,
            edges: deduped,
        }
    }
}

/// The full set of projections computed together for one rendering pass.
///
/// Derived and disposable: recompute from the current collection whenever
/// it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VisualizationSnapshot {
    pub source_counts: BTreeMap<String, u64>,
    pub tags_by_source: BTreeMap<String, BTreeMap<String, u64>>,
    pub severity_points: Vec<SeverityPoint>,
    pub word_freq: Vec<(String, u64)>,
    pub network: EntityNetwork,
    pub timeline: Vec<TimelinePoint>,
}

impl VisualizationSnapshot {
    /// Build a snapshot from a server-computed payload.
    ///
    /// Each projection is decoded independently; a missing or malformed
    /// field degrades to that projection's empty form rather than
    /// failing the snapshot. "No data" is a renderable state.
    pub fn from_payload(payload: VisualizationPayload) -> Self {
        let nodes: Vec<NetworkNode> = section(payload.network_nodes);
        let edges: Vec<NetworkEdge> = section(payload.network_edges);

        Self {
            source_counts: section(payload.source_counts),
            tags_by_source: section(payload.tags_by_source),
            severity_points: section(payload.severity_points),
            word_freq: section(payload.word_freq),
            network: EntityNetwork::from_parts(nodes, edges),
            timeline: section(payload.timeline),
        }
    }
}

fn section<T: DeserializeOwned + Default>(value: Value) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_default()
}

/// Label a document for source-keyed projections: `source`, falling back
/// to `url`. Documents with neither are excluded from those projections.
fn source_label(doc: &DocumentRecord) -> Option<String> {
    let source = doc.source.trim();
    if !source.is_empty() {
        return Some(source.to_string());
    }
    doc.url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

/// Compute every projection over a document collection.
///
/// Word frequencies are tokenized upstream, so the local result is always
/// empty; use [`VisualizationSnapshot::from_payload`] when the server
/// supplies them.
pub fn aggregate(docs: &[DocumentRecord]) -> VisualizationSnapshot {
    let mut source_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut counts_by_source_tag: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    let mut all_tags: BTreeSet<String> = BTreeSet::new();
    let mut severity_points = Vec::new();
    let mut timeline = Vec::new();
    let mut doc_nodes: Vec<NetworkNode> = Vec::new();
    let mut seen_doc_ids: BTreeSet<String> = BTreeSet::new();
    let mut edges: BTreeSet<(String, String)> = BTreeSet::new();

    for (index, doc) in docs.iter().enumerate() {
        let label = source_label(doc);

        // Tags are a set: duplicates within one document count once.
        let tags: BTreeSet<&str> = doc
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        for tag in &tags {
            all_tags.insert(tag.to_string());
        }

        if let Some(label) = &label {
            *source_counts.entry(label.clone()).or_insert(0) += 1;
            let row = counts_by_source_tag.entry(label.clone()).or_default();
            for tag in &tags {
                *row.entry(tag.to_string()).or_insert(0) += 1;
            }
        }

        if let (Some(probability), Some(severity)) = (doc.probability, doc.severity) {
            severity_points.push(SeverityPoint {
                probability,
                severity,
            });
        }

        timeline.push(TimelinePoint {
            index: index as u64,
            severity: doc.severity.unwrap_or(0.0),
        });

        if !doc.id.is_empty() && seen_doc_ids.insert(doc.id.clone()) {
            doc_nodes.push(NetworkNode {
                id: doc.id.clone(),
                label: label.clone().unwrap_or_else(|| doc.id.clone()),
                kind: "document".to_string(),
            });
            for tag in &tags {
                edges.insert((doc.id.clone(), tag.to_string()));
            }
        }
    }

    // Densify: every source row carries every tag column, zeros included.
    let tags_by_source: BTreeMap<String, BTreeMap<String, u64>> = source_counts
        .keys()
        .map(|source| {
            let counted = counts_by_source_tag.get(source);
            let row: BTreeMap<String, u64> = all_tags
                .iter()
                .map(|tag| {
                    let count = counted
                        .and_then(|row| row.get(tag))
                        .copied()
                        .unwrap_or(0);
                    (tag.clone(), count)
                })
                .collect();
            (source.clone(), row)
        })
        .collect();

    let mut nodes = doc_nodes;
    nodes.extend(all_tags.iter().map(|tag| NetworkNode {
        id: tag.clone(),
        label: tag.clone(),
        kind: "tag".to_string(),
    }));

    let edges = edges
        .into_iter()
        .map(|(doc, tag)| NetworkEdge { doc, tag })
        .collect();

    VisualizationSnapshot {
        source_counts,
        tags_by_source,
        severity_points,
        word_freq: Vec::new(),
        network: EntityNetwork { nodes, edges },
        timeline,
    }
}
