use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use reelfeed::app::App;
use reelfeed::catalog::{Catalog, TmdbClient};
use reelfeed::config::Config;
use reelfeed::feed::FeedEvent;
use reelfeed::region::{normalize_region, RegionCache};
use reelfeed::ui;

const TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// Get the config directory path (~/.config/reelfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("reelfeed");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "reelfeed", about = "Terminal movie browser for the TMDB catalog")]
struct Args {
    /// Config file (default: ~/.config/reelfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initial search query
    #[arg(long, value_name = "TEXT", default_value = "")]
    query: String,

    /// Delete the cached region before starting
    #[arg(long)]
    clear_region_cache: bool,
}

/// Log to a file in the config directory, and only when RUST_LOG is set.
/// Anything written to stderr would land on the alternate screen.
fn init_tracing(config_dir: &std::path::Path) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    let log_path = config_dir.join("reelfeed.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // Config dir holds the token-bearing config file; keep it user-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(&config_dir) {
            let mut perms = metadata.permissions();
            perms.set_mode(0o700);
            let _ = std::fs::set_permissions(&config_dir, perms);
        }
    }

    init_tracing(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    tracing::debug!(?config, "Effective configuration");

    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| config.api_token.clone())
        .map(SecretString::from);
    if token.is_none() {
        eprintln!("Warning: no API token found. Set {TOKEN_ENV} or api_token in the config file.");
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("reelfeed/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let region_cache = RegionCache::new(
        http.clone(),
        config_dir.join("region.json"),
        config.region_endpoint.clone(),
    );
    if args.clear_region_cache {
        region_cache
            .clear()
            .await
            .context("Failed to clear region cache")?;
        println!("Region cache cleared.");
    }

    let region = match config.region.as_deref().and_then(normalize_region) {
        Some(region) => region,
        None => {
            if config.region.is_some() {
                tracing::warn!("Ignoring malformed region in config file");
            }
            region_cache.get_region().await
        }
    };
    tracing::info!(region = %region, "Using region");

    let catalog: Arc<dyn Catalog> = Arc::new(
        TmdbClient::new(http, &config.api_base_url, token)
            .context("Invalid api_base_url in config")?
            .with_timeout(config.request_timeout())
            .with_region(Some(region)),
    );

    let (feed_tx, feed_rx) = mpsc::channel::<FeedEvent>(32);
    let mut app = App::new(&config, catalog, feed_tx);
    app.start(&args.query);

    ui::run(&mut app, feed_rx).await?;

    Ok(())
}
