use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use detect2dash_config::RuntimeConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// HTTP relay from an object-detection pipeline to its web dashboard
#[derive(Parser)]
#[command(name = "detect2dash")]
#[command(version)]
#[command(about = "HTTP relay from an object-detection pipeline to its web dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// HTTP listen port (overrides config file)
    #[arg(short, long, value_name = "PORT", global = true)]
    port: Option<u16>,

    /// Directory holding the built dashboard (index.html and assets)
    #[arg(short, long, value_name = "DIR", global = true)]
    static_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default if no subcommand given)
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) | None => run_server(cli),
    }
}

fn run_server(cli: Cli) -> Result<()> {
    // Build tokio runtime and run async server
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Step 1: Load base configuration (file + environment)
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    // Step 3: Initialize tracing early so startup checks show up
    // Note: run_with_config will also call init_tracing, but that's idempotent
    detect2dash::init_tracing(&config);

    // Step 4: Display startup info and check the dashboard bundle
    display_startup_info(&config);
    check_frontend(&config);

    // Step 5: Run server with resolved config
    detect2dash::run_with_config(config).await
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.server.listen_addr = format!("0.0.0.0:{}", port);
    }

    if let Some(dir) = &cli.static_dir {
        config.frontend.static_dir = dir.to_string_lossy().to_string();
    }

    if let Some(level) = &cli.log_level {
        config.server.log_level = level.clone();
    }
}

fn display_startup_info(config: &RuntimeConfig) {
    info!("╭─────────────────────────────────────────────────");
    info!("│ detect2dash v{}", env!("CARGO_PKG_VERSION"));
    info!("├─────────────────────────────────────────────────");
    info!("│ Listen address: http://{}", config.server.listen_addr);
    info!("│ Retained batches: {}", config.retention.capacity);
    info!("│ Dashboard root: {}", config.frontend.static_dir);
    info!(
        "│ CORS: {}",
        if config.frontend.cors_enabled {
            "any origin"
        } else {
            "disabled"
        }
    );
    info!("│ Log level: {}", config.server.log_level);
    info!("╰─────────────────────────────────────────────────");
}

// The API works without the bundle, so a missing one only warns.
fn check_frontend(config: &RuntimeConfig) {
    let root = Path::new(&config.frontend.static_dir);
    if !root.is_dir() {
        warn!(
            "Dashboard directory '{}' not found; only the API will be served",
            config.frontend.static_dir
        );
        return;
    }

    let index = root.join(&config.frontend.index);
    if !index.is_file() {
        warn!("Dashboard entry document '{}' not found", index.display());
    }
}
