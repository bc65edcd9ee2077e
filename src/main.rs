use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wp_mcp_gateway::config::{CliConfig, FileConfig, GatewayConfig};
use wp_mcp_gateway::content::InMemoryContentStore;
use wp_mcp_gateway::server::{run_server, RequestsLoggingLevel};
use wp_mcp_gateway::user::{generate_secret, Capability, InMemoryUserStore, UserStore};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values there override CLI flags.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Capability a principal must hold to use the gateway.
    #[clap(long, default_value = "edit_posts")]
    pub required_capability: String,

    /// Additional allowed CORS origin. Repeatable.
    #[clap(long = "cors-origin")]
    pub cors_origins: Vec<String>,

    /// Allowed client address or CIDR block. Repeatable; empty allows all.
    #[clap(long = "allow-ip")]
    pub allow_ips: Vec<String>,

    /// Maximum requests per client within the rate-limit window.
    #[clap(long, default_value_t = 60)]
    pub rate_limit_max_requests: u32,

    /// Rate-limit window in seconds.
    #[clap(long, default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Site name reported by wp_get_site_info.
    #[clap(long, default_value = "Demo Site")]
    pub site_name: String,

    /// Site URL reported by wp_get_site_info.
    #[clap(long, default_value = "http://localhost")]
    pub site_url: String,

    /// Gateway credential as login:secret. Repeatable. When omitted, an
    /// admin user with a generated secret is created and logged at startup.
    #[clap(long = "credential")]
    pub credentials: Vec<String>,
}

fn build_user_store(credentials: &[String]) -> Result<InMemoryUserStore> {
    let mut users = InMemoryUserStore::new();
    if credentials.is_empty() {
        let secret = generate_secret();
        users.add_user("admin", vec![Capability::Read, Capability::EditPosts]);
        users.add_application_password("admin", "generated", &secret)?;
        info!("No credentials configured, generated one: admin:{}", secret);
        return Ok(users);
    }
    for entry in credentials {
        let Some((login, secret)) = entry.split_once(':') else {
            bail!("credential must be login:secret, got: {}", entry);
        };
        if users.find_user(login).is_none() {
            users.add_user(login, vec![Capability::Read, Capability::EditPosts]);
        }
        users.add_application_password(login, "cli", secret)?;
    }
    Ok(users)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path).context("loading config file")?),
        None => None,
    };

    let cli_config = CliConfig {
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        required_capability: cli_args.required_capability,
        cors_allowed_origins: cli_args.cors_origins,
        ip_allowlist: cli_args.allow_ips,
        rate_limit_max_requests: cli_args.rate_limit_max_requests,
        rate_limit_window_secs: cli_args.rate_limit_window_secs,
        site_name: cli_args.site_name,
        site_url: cli_args.site_url,
    };
    let config = GatewayConfig::resolve(&cli_config, file_config)?;

    let users = Arc::new(build_user_store(&cli_args.credentials)?);
    let store = Arc::new(InMemoryContentStore::with_sample_data(config.site.clone()));

    run_server(config, store, users).await
}
