//! Notification side-channel command.

use anyhow::Result;

use crate::backend::http::HttpBackend;
use crate::backend::Backend;
use crate::config::Config;

pub async fn run_notify(config: &Config, id: &str) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    backend.notify(id).await?;
    println!("Notification sent for {}.", id);
    Ok(())
}
