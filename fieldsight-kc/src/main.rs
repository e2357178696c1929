//! fieldsight-kc - KoBoCAT companion service
//!
//! Staff/team management, instance history, submissions, attachment archives
//! and Enketo form links over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use fieldsight_common::config::{config_file_path, resolve_root_folder, RootFolder, TomlConfig};
use fieldsight_common::db::init_database;
use fieldsight_common::report::LogReporter;
use fieldsight_common::storage::FileSystemStorage;
use fieldsight_kc::services::EnketoClient;
use fieldsight_kc::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fieldsight-kc", version, about = "FieldSight KoBoCAT companion service")]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "FIELDSIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database and media files
    #[arg(long, env = "FIELDSIGHT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config_file_path(args.config.as_deref());
    let config = TomlConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        revision = env!("FSKC_SOURCE_REVISION"),
        built_at = env!("FSKC_BUILT_AT"),
        target = env!("FSKC_BUILD_TARGET"),
        "Starting FieldSight KoBoCAT companion (fieldsight-kc)"
    );
    match &config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: built-in defaults"),
    }

    let root_folder = RootFolder::new(resolve_root_folder(args.root_folder.as_deref(), &config));
    root_folder
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", root_folder.path().display());

    let db_pool = init_database(&root_folder.database_path()).await?;
    info!("Database connection established");

    let storage = FileSystemStorage::new(root_folder.media_path(), config.media.base_url.clone());
    let reporter = LogReporter::new(config.debug);

    let enketo = EnketoClient::new(config.enketo.clone())?;
    if enketo.is_configured() {
        info!("Enketo integration enabled");
    } else {
        warn!("Enketo is not configured; form links will be unavailable");
    }

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let state = AppState::new(db_pool, config, enketo, Arc::new(storage), Arc::new(reporter));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("fieldsight-kc stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
