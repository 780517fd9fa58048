use price_scout::{api::start_server, config::Config, gemini::GeminiClient, PriceAnalyzer};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    if !config.has_credential() {
        warn!("GEMINI_API_KEY not set; analysis requests will fail until it is configured");
    }

    info!("Price Scout - API Server");
    info!("Port: {}", config.port);
    info!("Model: {}", config.model);

    let provider = Arc::new(GeminiClient::new(&config)?);
    let analyzer = Arc::new(PriceAnalyzer::new(provider, config.model.clone()));

    start_server(analyzer, config.port).await?;

    Ok(())
}
