mod config;
mod handlers;
mod models;
mod services;
mod web; // Meal form pages

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::SubmissionHandler;
use services::{GeminiClient, InferenceService};
use web::create_router;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG can come from it
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🚀 Starting Meal Calorie Estimator...");

    let config = Config::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);

    let gemini = GeminiClient::from_config(&config);
    log::info!("✅ Gemini client initialized with model: {}", gemini.model());

    let inference: Arc<dyn InferenceService> = Arc::new(gemini);
    let app = create_router(SubmissionHandler::new(inference), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Calorie calculator listening on http://{}", config.bind_addr);
    log::info!("📏 Upload limit: {} bytes", config.max_upload_bytes);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server stopped unexpectedly")?;

    log::info!("🛑 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
    }
}
