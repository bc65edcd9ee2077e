mod file_config;

pub use file_config::{FileConfig, SecurityConfig, SiteConfig};

use crate::auth::DEFAULT_BEARER_FALLBACK_HEADERS;
use crate::content::SiteInfo;
use crate::security::{IpAllowlist, RateLimitSettings};
use crate::server::RequestsLoggingLevel;
use crate::user::Capability;
use anyhow::{bail, Result};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub required_capability: String,
    pub cors_allowed_origins: Vec<String>,
    pub ip_allowlist: Vec<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub site_name: String,
    pub site_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            required_capability: Capability::EditPosts.as_str().to_string(),
            cors_allowed_origins: Vec::new(),
            ip_allowlist: Vec::new(),
            rate_limit_max_requests: 60,
            rate_limit_window_secs: 60,
            site_name: "Demo Site".to_string(),
            site_url: "http://localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub required_capability: Capability,
    pub bearer_fallback_headers: Vec<String>,
    pub cors_allowed_origins: Vec<String>,
    pub ip_allowlist: Vec<String>,
    pub rate_limit: RateLimitSettings,
    pub site: SiteInfo,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            required_capability: Capability::EditPosts,
            bearer_fallback_headers: DEFAULT_BEARER_FALLBACK_HEADERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cors_allowed_origins: Vec::new(),
            ip_allowlist: Vec::new(),
            rate_limit: RateLimitSettings::default(),
            site: SiteInfo::default(),
        }
    }
}

impl GatewayConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        if port == 0 {
            bail!("port must be non-zero");
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or(cli.logging_level);

        let capability_name = file
            .required_capability
            .unwrap_or_else(|| cli.required_capability.clone());
        let required_capability = match Capability::parse(&capability_name) {
            Some(capability) => capability,
            None => bail!("unknown capability: {}", capability_name),
        };

        let bearer_fallback_headers = file.bearer_fallback_headers.unwrap_or_else(|| {
            DEFAULT_BEARER_FALLBACK_HEADERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

        let security = file.security.unwrap_or_default();
        let cors_allowed_origins = security
            .cors_allowed_origins
            .unwrap_or_else(|| cli.cors_allowed_origins.clone());
        let ip_allowlist = security
            .ip_allowlist
            .unwrap_or_else(|| cli.ip_allowlist.clone());
        // Fail on malformed entries now rather than at the first request
        IpAllowlist::parse(&ip_allowlist)?;

        let rate_limit = RateLimitSettings {
            max_requests: security
                .rate_limit_max_requests
                .unwrap_or(cli.rate_limit_max_requests),
            window_secs: security
                .rate_limit_window_secs
                .unwrap_or(cli.rate_limit_window_secs),
        };
        if rate_limit.max_requests == 0 {
            bail!("rate_limit_max_requests must be positive");
        }

        let site_file = file.site.unwrap_or_default();
        let site = SiteInfo {
            name: site_file.name.unwrap_or_else(|| cli.site_name.clone()),
            description: site_file
                .description
                .unwrap_or_else(|| "Just another demo site".to_string()),
            url: site_file.url.unwrap_or_else(|| cli.site_url.clone()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            language: site_file.language.unwrap_or_else(|| "en_US".to_string()),
        };

        Ok(Self {
            port,
            logging_level,
            required_capability,
            bearer_fallback_headers,
            cors_allowed_origins,
            ip_allowlist,
            rate_limit,
            site,
        })
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    match s.to_lowercase().as_str() {
        "none" => Some(RequestsLoggingLevel::None),
        "path" => Some(RequestsLoggingLevel::Path),
        "headers" => Some(RequestsLoggingLevel::Headers),
        _ => None,
    }
}
