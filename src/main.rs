use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpl_league::api::state::AppState;
use fpl_league::cache::connect_store;
use fpl_league::config::AppConfig;
use fpl_league::models::LeagueId;
use fpl_league::parse_duration;
use fpl_league::upstream::HttpFplApi;

#[derive(Parser)]
#[command(name = "fpl-league")]
#[command(about = "Fantasy Premier League mini-league dashboard backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Snapshot freshness window (e.g., "120s", "2m")
        #[arg(long)]
        cache_ttl: Option<String>,
    },

    /// Aggregate one league and print the snapshot as JSON
    Snapshot {
        /// Classic league id
        #[arg(long)]
        league_id: u64,

        /// Skip the cache freshness check
        #[arg(long)]
        force: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate configuration and print the effective settings
    CheckConfig {
        /// Check this TOML file on its own, ignoring environment overrides
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_state(config: AppConfig) -> Result<AppState> {
    let api = HttpFplApi::from_config(&config.upstream).context("Invalid upstream settings")?;
    let store = connect_store(&config.cache)
        .await
        .context("Failed to connect to cache store")?;
    let state = AppState::new(Arc::new(config), Arc::new(api), store)?;
    Ok(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    tracing::info!("Starting fpl-league v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            cache_ttl,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(raw) = cache_ttl {
                let ttl = parse_duration(&raw)
                    .with_context(|| format!("Invalid --cache-ttl: {}", raw))?;
                config.cache.ttl_seconds = ttl.as_secs();
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = build_state(config).await?;
            let app = fpl_league::api::build_router(state);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Snapshot {
            league_id,
            force,
            pretty,
        } => {
            let state = build_state(config).await?;
            let snapshot = state
                .league_cache
                .get(LeagueId::new(league_id), force)
                .await?;

            let json = if pretty {
                serde_json::to_string_pretty(&snapshot)?
            } else {
                serde_json::to_string(&snapshot)?
            };
            println!("{}", json);
        }
        Commands::CheckConfig { file } => {
            if let Some(path) = file {
                config = AppConfig::from_file(&path)
                    .with_context(|| format!("Invalid config file {}", path.display()))?;
            }
            println!("{}", toml::to_string_pretty(&config)?);
            tracing::info!("Configuration is valid");
        }
    }

    Ok(())
}
