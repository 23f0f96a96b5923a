use sketch_service::config::SketchConfig;
use sketch_service::services::metrics;
use sketch_service::startup::Application;

use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env before anything reads the environment.
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT")
        .ok()
        .filter(|v| !v.trim().is_empty());
    init_tracing("sketch-service", "info", otlp_endpoint.as_deref());

    let config = SketchConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    if let Err(e) = metrics::init_metrics() {
        tracing::error!("Failed to initialize metrics: {}", e);
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
