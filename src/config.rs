use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub paging: PagingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the corpus service, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// A config usable without a config file (local development defaults).
    pub fn minimal() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:8000/api".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            paging: PagingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.backend.base_url.trim().is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }

    if !config.backend.base_url.starts_with("http://")
        && !config.backend.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "backend.base_url must be an http(s) URL, got '{}'",
            config.backend.base_url
        );
    }

    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be >= 1");
    }

    if config.paging.page_size == 0 {
        anyhow::bail!("paging.page_size must be >= 1");
    }

    Ok(config)
}
