//! Error types for the price analysis service

use thiserror::Error;

/// Result type alias for price analysis operations
pub type Result<T> = std::result::Result<T, PriceScoutError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceScoutError {

    // =============================
    // Request Errors
    // =============================

    #[error("Please enter a product name or link.")]
    EmptyQuery,

    #[error("API key is missing. Please set GEMINI_API_KEY in your environment.")]
    MissingCredential,

    // =============================
    // Extraction Errors
    // =============================

    #[error("No response received from the model.")]
    EmptyResponse,

    #[error("Failed to parse structured data from the analysis. Please try again.")]
    NoStructuredBlock,

    #[error("The analysis data was malformed: {0}")]
    MalformedStructuredData(String),

    // =============================
    // Provider / Session Errors
    // =============================

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Request #{sequence} was superseded by a newer submission")]
    Superseded { sequence: u64 },
}

impl PriceScoutError {
    /// Stable machine-readable code for API clients
    pub fn kind(&self) -> &'static str {
        match self {
            PriceScoutError::EmptyQuery => "empty_query",
            PriceScoutError::MissingCredential => "missing_credential",
            PriceScoutError::EmptyResponse => "empty_response",
            PriceScoutError::NoStructuredBlock => "no_structured_block",
            PriceScoutError::MalformedStructuredData(_) => "malformed_structured_data",
            PriceScoutError::ProviderError(_) => "provider_error",
            PriceScoutError::Superseded { .. } => "superseded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert!(PriceScoutError::MissingCredential
            .to_string()
            .to_lowercase()
            .contains("api key"));
        assert_eq!(
            PriceScoutError::MalformedStructuredData("expected value".into()).to_string(),
            "The analysis data was malformed: expected value"
        );
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            PriceScoutError::EmptyQuery,
            PriceScoutError::MissingCredential,
            PriceScoutError::EmptyResponse,
            PriceScoutError::NoStructuredBlock,
            PriceScoutError::MalformedStructuredData(String::new()),
            PriceScoutError::ProviderError(String::new()),
            PriceScoutError::Superseded { sequence: 1 },
        ];
        let kinds: std::collections::HashSet<&str> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }
}
