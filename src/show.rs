//! Single document retrieval.
//!
//! Fetches a full committed document and prints its metadata and body.

use anyhow::Result;

use crate::backend::http::HttpBackend;
use crate::backend::Backend;
use crate::config::Config;

pub async fn run_show(config: &Config, id: &str) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let doc = backend.get_document(id).await?;

    println!("--- Document ---");
    println!("id:           {}", doc.id);
    println!(
        "title:        {}",
        if doc.title.is_empty() {
            "(untitled)"
        } else {
            &doc.title
        }
    );
    println!("source:       {}", doc.source);
    if let Some(url) = &doc.url {
        println!("url:          {}", url);
    }
    if let Some(severity) = doc.severity {
        println!("severity:     {}", severity);
    }
    if let Some(probability) = doc.probability {
        println!("probability:  {}", probability);
    }
    if let Some(created_at) = doc.created_at {
        println!("created_at:   {}", created_at.format("%Y-%m-%dT%H:%M:%SZ"));
    }
    println!("tags:         {}", doc.tags.join(", "));
    println!("entities:     {}", doc.entities.join(", "));
    println!();

    println!("--- Body ---");
    println!("{}", doc.text);

    Ok(())
}
