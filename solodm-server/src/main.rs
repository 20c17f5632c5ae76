use std::sync::Arc;

use clap::Parser;
use solodm_core::{AppConfig, DmNarrator, GameStore};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use solodm_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "solodm.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match AppConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let narrator = DmNarrator::from_config(&config.openai);

    if args.health {
        println!(
            "Solo DM server config OK (port {}, OpenAI configured: {})",
            config.service.port,
            narrator.upstream_configured()
        );
        return Ok(());
    }

    // In-memory store, seeded so the API is exercisable immediately
    let store = Arc::new(GameStore::new());
    store.seed();

    tracing::info!(port = config.service.port, "Solo DM server starting");
    if narrator.upstream_configured() {
        tracing::info!("OpenAI API key configured");
    } else {
        tracing::warn!("OpenAI API key not found — running in mock narration mode");
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState { store, narrator });
    http::start_http_server(
        state,
        &config.service.host,
        config.service.port,
        tx.subscribe(),
    )
    .await?;

    Ok(())
}
