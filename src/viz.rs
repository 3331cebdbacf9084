//! Visualization snapshot command.
//!
//! Builds a [`VisualizationSnapshot`] either locally, fetching the full
//! corpus page by page and running the aggregator, or from the
//! server-computed payload. With `--out` the snapshot is written as JSON
//! for the rendering collaborators; otherwise a summary is printed.

use anyhow::Result;
use std::path::Path;

use crate::aggregate::{self, VisualizationSnapshot};
use crate::backend::http::HttpBackend;
use crate::backend::Backend;
use crate::config::Config;
use crate::models::DocumentRecord;

pub async fn run_viz(config: &Config, server: bool, out: Option<&Path>) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;

    let snapshot = if server {
        let payload = backend.visualization_data().await?;
        VisualizationSnapshot::from_payload(payload)
    } else {
        let docs = fetch_all(&backend, config.paging.page_size).await?;
        aggregate::aggregate(&docs)
    };

    match out {
        Some(path) => {
            let json = serde_json::to_string_pretty(&snapshot)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Wrote snapshot ({} sources, {} network nodes) to {}",
                snapshot.source_counts.len(),
                snapshot.network.nodes.len(),
                path.display()
            );
        }
        None => print_summary(&snapshot),
    }

    Ok(())
}

/// Page through the whole corpus. Refresh is always a full re-fetch.
async fn fetch_all(backend: &HttpBackend, page_size: u32) -> Result<Vec<DocumentRecord>> {
    let mut docs: Vec<DocumentRecord> = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = backend.list_documents(page, page_size).await?;
        let fetched = batch.items.len();
        docs.extend(batch.items);
        if fetched == 0 || docs.len() as u64 >= batch.total {
            break;
        }
        page += 1;
    }
    Ok(docs)
}

fn print_summary(snapshot: &VisualizationSnapshot) {
    let tag_columns = snapshot
        .tags_by_source
        .values()
        .next()
        .map(|row| row.len())
        .unwrap_or(0);

    println!("Regscope — Visualization Snapshot");
    println!("=================================");
    println!();
    println!("  Sources:        {}", snapshot.source_counts.len());
    println!("  Tag columns:    {}", tag_columns);
    println!("  Scatter points: {}", snapshot.severity_points.len());
    println!("  Words:          {}", snapshot.word_freq.len());
    println!(
        "  Network:        {} nodes, {} edges",
        snapshot.network.nodes.len(),
        snapshot.network.edges.len()
    );
    println!("  Timeline:       {} points", snapshot.timeline.len());

    if !snapshot.source_counts.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<36} {:>6}", "SOURCE", "DOCS");
        println!("  {}", "-".repeat(44));
        for (source, count) in &snapshot.source_counts {
            println!("  {:<36} {:>6}", source, count);
        }
    }

    println!();
}
