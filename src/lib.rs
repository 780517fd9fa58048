//! Price Scout
//!
//! Turns a product name or link into a 12-month price-history summary for
//! the Indian market:
//! - Builds a search-grounded prompt for a hosted LLM
//! - Extracts the fenced JSON block from the model's reply
//! - Validates it into a typed `ProductAnalysis`
//! - Attaches deduplicated source citations
//!
//! PIPELINE:
//! QUERY → PROMPT → PROVIDER → EXTRACT → RESULT

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod report;

pub use error::{PriceScoutError, Result};

// Re-export common types
pub use analyzer::PriceAnalyzer;
pub use models::*;
