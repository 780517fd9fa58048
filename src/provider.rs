//! Text-generation provider interface
//!
//! The analyzer only sees this trait. `GeminiClient` is the real
//! implementation; `MockProvider` keeps the system functional without
//! network access.

use crate::config::TEMPERATURE;
use crate::error::PriceScoutError;
use crate::models::SourceCitation;
use crate::prompt::Prompt;
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub system_instruction: String,
    pub user_instruction: String,
    pub search_enabled: bool,
    pub temperature: f32,
}

impl ProviderRequest {
    /// Search-grounded, low-temperature request for the given prompt
    pub fn from_prompt(model: impl Into<String>, prompt: Prompt) -> Self {
        Self {
            model: model.into(),
            system_instruction: prompt.system_instruction,
            user_instruction: prompt.user_instruction,
            search_enabled: true,
            temperature: TEMPERATURE,
        }
    }
}

/// Generated text plus any grounding citations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    pub text: Option<String>,
    pub citations: Vec<SourceCitation>,
}

/// Trait for a hosted text-generation service
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}

/// Canned provider for development & testing
pub struct MockProvider {
    outcome: std::result::Result<ProviderResponse, PriceScoutError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(response: ProviderResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(ProviderResponse {
            text: Some(text.into()),
            citations: vec![],
        })
    }

    pub fn failing(error: PriceScoutError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Sleep before answering, to simulate network latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().await.clone()
    }

    /// A plausible grounded reply, used by the CLI demo mode
    pub fn demo() -> Self {
        let text = r#"The Sony WH-1000XM5 has traded between ₹24,990 and ₹34,990 over the past year.
Prices usually dip during the Great Indian Festival and Big Billion Days.

```json
{
  "productName": "Sony WH-1000XM5",
  "currentPrice": 26990,
  "lowestPrice": 24990,
  "highestPrice": 34990,
  "bestTime": "Great Indian Festival (Sep-Oct)",
  "verdict": "WAIT",
  "reliableSources": ["Amazon.in", "Flipkart", "Croma"],
  "history": [
    { "month": "Nov", "price": 29990 },
    { "month": "Dec", "price": 28990 },
    { "month": "Jan", "price": 27990 },
    { "month": "Feb", "price": 29990 },
    { "month": "Mar", "price": 29490 },
    { "month": "Apr", "price": 29990 },
    { "month": "May", "price": 28990 },
    { "month": "Jun", "price": 27990 },
    { "month": "Jul", "price": 26990 },
    { "month": "Aug", "price": 26990 },
    { "month": "Sep", "price": 24990 },
    { "month": "Oct", "price": 26990 }
  ],
  "analysisText": "Current price is about 8% above the yearly low seen during festive sales. With the next sale weeks away, waiting is likely to save ₹2,000 or more."
}
```"#;

        Self::new(ProviderResponse {
            text: Some(text.to_string()),
            citations: vec![
                SourceCitation::new("https://www.amazon.in/dp/B09XS7JWHH", "Amazon.in"),
                SourceCitation::new("https://www.flipkart.com/sony-wh-1000xm5", ""),
                SourceCitation::new("https://www.amazon.in/dp/B09XS7JWHH", "Amazon.in"),
            ],
        })
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;

    #[test]
    fn test_request_from_prompt() {
        let request = ProviderRequest::from_prompt("gemini-2.5-flash", build_prompt("Pixel 8"));
        assert!(request.search_enabled);
        assert_eq!(request.temperature, TEMPERATURE);
        assert!(request.user_instruction.contains("Pixel 8"));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockProvider::with_text("hello");
        let request = ProviderRequest::from_prompt("m", build_prompt("kettle"));

        let response = mock.generate(&request).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("hello"));
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_request().await, Some(request));
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockProvider::failing(PriceScoutError::ProviderError("quota".into()));
        let request = ProviderRequest::from_prompt("m", build_prompt("kettle"));
        let result = tokio_test::block_on(mock.generate(&request));
        assert_eq!(result, Err(PriceScoutError::ProviderError("quota".into())));
    }
}
