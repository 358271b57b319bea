//! UniMind wellness backend entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unimind_server::api::{cors_layer, create_router, AppState};
use unimind_server::config::Config;
use unimind_server::metrics;
use unimind_server::utils::shutdown_signal;

/// UniMind wellness backend.
#[derive(Parser, Debug)]
#[command(name = "unimind-server")]
#[command(about = "HTTP backend for the UniMind wellness client")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Run {
        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity and provider availability.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("unimind_server=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(args.port).await,
    }
}

/// Run the HTTP server.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let port = port_override.unwrap_or(config.port);

    // Initialize metrics
    metrics::init_metrics();
    if config.metrics_enabled {
        let exporter = metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from(([0, 0, 0, 0], config.metrics_port)));
        if let Err(e) = exporter.install() {
            warn!("Prometheus exporter failed to start: {}", e);
        } else {
            info!("Prometheus exporter listening on port {}", config.metrics_port);
        }
    }

    info!("Configuration loaded successfully");
    info!(
        "Emotion provider: {}",
        provider_mode(config.blossoms_api_key.is_some())
    );
    info!(
        "Completion provider: {}",
        provider_mode(config.openrouter_api_key.is_some())
    );
    info!(
        "Places provider: {}",
        provider_mode(config.google_places_api_key.is_some())
    );
    info!(
        "Persistence: {}",
        if config.has_firestore() { "firestore" } else { "in-memory" }
    );

    // Build app state, resolving each provider once
    let state = AppState::from_config(&config);
    let router = create_router(state).layer(cors_layer(&config.frontend_origin));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("UNIMIND SERVER - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Frontend Origin: {}", config.frontend_origin);
    println!(
        "  Emotion Provider: {}",
        provider_mode(config.blossoms_api_key.is_some())
    );
    println!(
        "  Completion Provider: {} (model: {})",
        provider_mode(config.openrouter_api_key.is_some()),
        config.openrouter_model
    );
    println!(
        "  Places Provider: {}",
        provider_mode(config.google_places_api_key.is_some())
    );
    println!(
        "  Persistence: {}",
        if config.has_firestore() {
            "firestore"
        } else {
            "in-memory"
        }
    );
    if let Some(project) = &config.firestore_project_id {
        println!("  Firestore Project: {}", project);
    }
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("enabled (port {})", config.metrics_port)
        } else {
            "disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

fn provider_mode(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "fallback"
    }
}
