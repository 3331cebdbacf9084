//! Paginated corpus listing.

use anyhow::Result;

use crate::backend::http::HttpBackend;
use crate::backend::Backend;
use crate::config::Config;

pub async fn run_list(config: &Config, page: u32, page_size: Option<u32>) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let page_size = page_size.unwrap_or(config.paging.page_size);
    let result = backend.list_documents(page, page_size).await?;

    println!(
        "{:<36} {:<24} {:>5} {:>6}  {:<10}  {}",
        "ID", "SOURCE", "SEV", "PROB", "CREATED", "TAGS"
    );
    println!("{}", "-".repeat(100));

    for doc in &result.items {
        let severity = doc
            .severity
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        let probability = doc
            .probability
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        let created = doc
            .created_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<36} {:<24} {:>5} {:>6}  {:<10}  {}",
            doc.id,
            truncate(&doc.source, 24),
            severity,
            probability,
            created,
            doc.tags.join(", ")
        );
    }

    let total_pages = if result.total == 0 {
        1
    } else {
        result.total.div_ceil(page_size as u64)
    };
    println!();
    println!(
        "Page {} of {} ({} document{})",
        result.page,
        total_pages,
        result.total,
        if result.total == 1 { "" } else { "s" }
    );

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
