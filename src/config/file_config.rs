use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub required_capability: Option<String>,
    pub bearer_fallback_headers: Option<Vec<String>>,

    // Feature configs
    pub security: Option<SecurityConfig>,
    pub site: Option<SiteConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SecurityConfig {
    pub cors_allowed_origins: Option<Vec<String>>,
    pub ip_allowlist: Option<Vec<String>>,
    pub rate_limit_max_requests: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
