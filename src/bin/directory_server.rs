use anyhow::Context;
use clap::Parser;
use org_directory::app::http;
use org_directory::core::ConfigProvider;
use org_directory::utils::{logger, validation::Validate};
use org_directory::{CliConfig, DirectoryService, SqliteStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let config = cli.resolve().context("failed to load configuration")?;

    logger::init_server_logger(config.verbose(), config.json_logs());

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    let store = SqliteStore::open(config.database_path(), config.busy_timeout())
        .with_context(|| format!("failed to open database {}", config.database_path()))?;
    let service = Arc::new(DirectoryService::new(store));
    let app = http::router(service);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    let addr = listener.local_addr().context("failed to read bound address")?;

    tracing::info!("🚀 Server running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
