//! adgen-cg (Concept Generation) - marketing concept microservice
//!
//! Generates and remixes audience-targeted marketing concepts through an
//! OpenAI-compatible model. Sessions, audience ownership and usage logs live
//! in `adgen.db` under the resolved root folder.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adgen_cg::api::BuildInfo;
use adgen_cg::llm::OpenAiClient;
use adgen_cg::services::{ConceptGenerator, GenerationSettings};
use adgen_cg::{build_router, AppState};
use adgen_common::config::{
    load_config_or_default, resolve_llm_api_key, LoggingConfig, RootFolderInitializer,
    RootFolderResolver,
};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 5731;

/// Command-line arguments for adgen-cg
#[derive(Parser, Debug)]
#[command(name = "adgen-cg")]
#[command(about = "Marketing concept generation microservice")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "ADGEN_CG_PORT")]
    port: Option<u16>,

    /// Root folder holding adgen.db
    #[arg(short, long, env = "ADGEN_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to the per-user config location)
    #[arg(short, long, env = "ADGEN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config_or_default(args.config.as_deref());

    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!("Starting adgen Concept Generation (adgen-cg) {}", BuildInfo::current());

    let root_folder = RootFolderResolver::new("concept-generation")
        .with_cli_arg(args.root_folder.clone())
        .with_toml_config(&config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match adgen_common::db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let api_key = resolve_llm_api_key(&config.llm).context("No language-model API key configured")?;
    let settings = GenerationSettings::from_llm_config(&config.llm);
    let client = OpenAiClient::new(
        &config.llm.base_url,
        api_key,
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .context("Failed to build language-model client")?;

    info!(
        endpoint = client.endpoint(),
        model = %config.llm.model,
        timeout_secs = config.llm.timeout_secs,
        "Language-model client configured"
    );

    let generator = Arc::new(ConceptGenerator::new(Arc::new(client), settings));
    info!(sink = ?config.usage.sink, "API usage logging");
    let app = build_router(AppState::with_database(pool, generator, config.usage.sink));

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("adgen-cg listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Console logging, or append to the configured file. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
