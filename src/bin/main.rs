use price_scout::{
    config::Config,
    gemini::GeminiClient,
    provider::{AnalysisProvider, MockProvider},
    report::render_report,
    PriceAnalyzer,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let use_mock = args.iter().any(|a| a == "--mock");
    args.retain(|a| a != "--mock");

    let query = args.join(" ");
    if query.trim().is_empty() && !use_mock {
        eprintln!("Usage: price-scout [--mock] <product name or link>");
        std::process::exit(2);
    }

    let config = Config::from_env();

    let provider: Arc<dyn AnalysisProvider> = if use_mock {
        Arc::new(MockProvider::demo())
    } else {
        Arc::new(GeminiClient::new(&config)?)
    };

    let query = if query.trim().is_empty() {
        "Sony WH-1000XM5".to_string()
    } else {
        query
    };

    info!(model = %config.model, provider = %provider.name(), "Analyzing {}", query);

    let analyzer = PriceAnalyzer::new(provider, config.model.clone());

    match analyzer.analyze(&query).await {
        Ok(result) => {
            println!("{}", render_report(&result));
            Ok(())
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
