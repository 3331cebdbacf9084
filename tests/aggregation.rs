//! Snapshot contract tests: the JSON shapes handed to the rendering
//! collaborators.

use regscope::aggregate::aggregate;
use regscope::models::DocumentRecord;

fn doc(id: &str, source: &str, tags: &[&str]) -> DocumentRecord {
    DocumentRecord {
        id: id.to_string(),
        source: source.to_string(),
        url: None,
        title: String::new(),
        text: String::new(),
        snippet: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        entities: Vec::new(),
        severity: None,
        probability: None,
        created_at: None,
    }
}

#[test]
fn snapshot_serializes_to_renderer_shapes() {
    let mut first = doc("d1", "A", &["x"]);
    first.severity = Some(2.0);
    first.probability = Some(0.5);
    let docs = vec![first, doc("d2", "A", &["y"]), doc("d3", "B", &["x"])];

    let json = serde_json::to_value(aggregate(&docs)).unwrap();

    // Bar chart input: label → count object.
    assert_eq!(json["source_counts"]["A"], 2);
    assert_eq!(json["source_counts"]["B"], 1);

    // Stacked bars: dense rows, zeros included.
    assert_eq!(json["tags_by_source"]["A"]["x"], 1);
    assert_eq!(json["tags_by_source"]["B"]["y"], 0);

    // Scatter points as (probability, severity) objects.
    assert_eq!(json["severity_points"][0]["probability"], 0.5);
    assert_eq!(json["severity_points"][0]["severity"], 2.0);

    // Force-graph nodes carry id/label/type; edges carry doc/tag.
    assert_eq!(json["network"]["nodes"][0]["id"], "d1");
    assert_eq!(json["network"]["nodes"][0]["type"], "document");
    assert_eq!(json["network"]["edges"][0]["doc"], "d1");
    assert_eq!(json["network"]["edges"][0]["tag"], "x");

    // Word cloud input: (word, count) pairs, empty locally.
    assert_eq!(json["word_freq"], serde_json::json!([]));

    assert_eq!(json["timeline"][1]["index"], 1);
    assert_eq!(json["timeline"][1]["severity"], 0.0);
}

#[test]
fn empty_corpus_serializes_to_empty_renderable_forms() {
    let json = serde_json::to_value(aggregate(&[])).unwrap();

    assert_eq!(json["source_counts"], serde_json::json!({}));
    assert_eq!(json["tags_by_source"], serde_json::json!({}));
    assert_eq!(json["severity_points"], serde_json::json!([]));
    assert_eq!(json["word_freq"], serde_json::json!([]));
    assert_eq!(json["network"]["nodes"], serde_json::json!([]));
    assert_eq!(json["network"]["edges"], serde_json::json!([]));
    assert_eq!(json["timeline"], serde_json::json!([]));
}

#[test]
fn a_document_listed_twice_contributes_one_node_and_edge_set() {
    let docs = vec![doc("d1", "A", &["x"]), doc("d1", "A", &["x"])];
    let snapshot = aggregate(&docs);

    let doc_nodes = snapshot
        .network
        .nodes
        .iter()
        .filter(|n| n.kind == "document")
        .count();
    assert_eq!(doc_nodes, 1);
    assert_eq!(snapshot.network.edges.len(), 1);

    // Source counts still see two list entries; deduplication is an
    // identity concern, not a counting one.
    assert_eq!(snapshot.source_counts["A"], 2);
}

#[test]
fn repeated_runs_serialize_identically() {
    let mut docs = vec![
        doc("d1", "B", &["y", "x"]),
        doc("d2", "A", &["x"]),
    ];
    docs[1].severity = Some(1.0);
    docs[1].probability = Some(0.25);

    let first = serde_json::to_string(&aggregate(&docs)).unwrap();
    let second = serde_json::to_string(&aggregate(&docs)).unwrap();
    assert_eq!(first, second);
}
