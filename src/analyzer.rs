//! Price analysis pipeline
//!
//! QUERY → PROMPT → PROVIDER → EXTRACT → RESULT
//!
//! Each call is independent. The only shared state is the sequencer used
//! to discard superseded results.

use crate::error::PriceScoutError;
use crate::extract::extract_result;
use crate::models::AnalysisResult;
use crate::prompt::build_prompt;
use crate::provider::{AnalysisProvider, ProviderRequest};
use crate::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Ticket handed out when a session submits a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub session: Uuid,
    pub sequence: u64,
}

/// Hands out sequence numbers from one monotonic counter and remembers the
/// newest number per session. A session's entry is removed once its newest
/// ticket finishes, so the map only holds sessions with work in flight.
#[derive(Default)]
pub struct RequestSequencer {
    next: AtomicU64,
    latest: RwLock<HashMap<Uuid, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for a session, superseding earlier ones
    pub async fn issue(&self, session: Uuid) -> Ticket {
        let mut latest = self.latest.write().await;
        let sequence = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        latest.insert(session, sequence);
        Ticket { session, sequence }
    }

    pub async fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.read().await.get(&ticket.session) == Some(&ticket.sequence)
    }

    /// Settle a ticket. Returns whether it was still the session's newest;
    /// if so the session entry is dropped.
    pub async fn finish(&self, ticket: Ticket) -> bool {
        let mut latest = self.latest.write().await;
        if latest.get(&ticket.session) == Some(&ticket.sequence) {
            latest.remove(&ticket.session);
            true
        } else {
            false
        }
    }

    /// Sessions with an unfinished newest ticket
    pub async fn tracked_sessions(&self) -> usize {
        self.latest.read().await.len()
    }
}

pub struct PriceAnalyzer {
    provider: Arc<dyn AnalysisProvider>,
    model: String,
    sequencer: RequestSequencer,
}

impl PriceAnalyzer {
    pub fn new(provider: Arc<dyn AnalysisProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one analysis for a product name or link
    pub async fn analyze(&self, query: &str) -> Result<AnalysisResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PriceScoutError::EmptyQuery);
        }

        let started = Instant::now();
        info!(query = %query, provider = %self.provider.name(), "Starting price analysis");

        let request = ProviderRequest::from_prompt(self.model.clone(), build_prompt(query));

        let response = self.provider.generate(&request).await.map_err(|e| {
            error!("Provider call failed: {}", e);
            e
        })?;

        let result = extract_result(response.text.as_deref(), &response.citations)?;

        info!(
            product = %result.analysis.product_name,
            verdict = %result.analysis.verdict,
            history_points = result.analysis.history.len(),
            citations = result.citations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Price analysis complete"
        );

        if result.analysis.history.len() != 12 {
            warn!(
                points = result.analysis.history.len(),
                "Price history does not have 12 monthly points"
            );
        }

        Ok(result)
    }

    /// Like `analyze`, but only the session's latest submission may succeed.
    /// Earlier in-flight submissions resolve to `Superseded`.
    pub async fn analyze_in_session(
        &self,
        session: Uuid,
        query: &str,
    ) -> Result<(Ticket, AnalysisResult)> {
        let ticket = self.sequencer.issue(session).await;

        let outcome = self.analyze(query).await;

        if !self.sequencer.finish(ticket).await {
            warn!(
                session = %session,
                sequence = ticket.sequence,
                "Discarding superseded analysis"
            );
            return Err(PriceScoutError::Superseded {
                sequence: ticket.sequence,
            });
        }

        outcome.map(|result| (ticket, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceCitation, Verdict};
    use crate::provider::{MockProvider, ProviderResponse};
    use std::time::Duration;

    const REPLY: &str = "Prices fall in October.\n```json\n{\"productName\":\"Kettle\",\"currentPrice\":1499,\"lowestPrice\":1199,\"highestPrice\":1999,\"bestTime\":\"Diwali\",\"verdict\":\"BUY_NOW\",\"reliableSources\":[\"Croma\"],\"history\":[],\"analysisText\":\"Good deal.\"}\n```";

    fn analyzer(mock: Arc<MockProvider>) -> PriceAnalyzer {
        PriceAnalyzer::new(mock, "gemini-2.5-flash")
    }

    #[tokio::test]
    async fn test_end_to_end_with_mock() {
        let mock = Arc::new(MockProvider::new(ProviderResponse {
            text: Some(REPLY.to_string()),
            citations: vec![
                SourceCitation::new("https://croma.com/k", "Croma"),
                SourceCitation::new("https://croma.com/k", "Croma again"),
            ],
        }));
        let result = analyzer(mock.clone()).analyze("electric kettle").await.unwrap();

        assert_eq!(result.analysis.product_name, "Kettle");
        assert_eq!(result.analysis.verdict, Verdict::BuyNow);
        assert_eq!(result.citations.len(), 1);

        let sent = mock.last_request().await.unwrap();
        assert_eq!(sent.model, "gemini-2.5-flash");
        assert!(sent.search_enabled);
        assert!(sent.user_instruction.contains("electric kettle"));
    }

    #[tokio::test]
    async fn test_empty_query_never_calls_provider() {
        let mock = Arc::new(MockProvider::with_text(REPLY));
        let result = analyzer(mock.clone()).analyze("   ").await;
        assert_eq!(result, Err(PriceScoutError::EmptyQuery));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through() {
        let mock = Arc::new(MockProvider::failing(PriceScoutError::MissingCredential));
        let result = analyzer(mock).analyze("kettle").await;
        assert_eq!(result, Err(PriceScoutError::MissingCredential));
    }

    #[tokio::test]
    async fn test_empty_provider_text() {
        let mock = Arc::new(MockProvider::new(ProviderResponse::default()));
        let result = analyzer(mock).analyze("kettle").await;
        assert_eq!(result, Err(PriceScoutError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_sequencer_tracks_latest() {
        let sequencer = RequestSequencer::new();
        let session = Uuid::new_v4();
        let other = Uuid::new_v4();

        let first = sequencer.issue(session).await;
        let second = sequencer.issue(session).await;
        let independent = sequencer.issue(other).await;

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(!sequencer.is_current(first).await);
        assert!(sequencer.is_current(second).await);
        assert!(sequencer.is_current(independent).await);
        assert!(independent.sequence > second.sequence);
    }

    #[tokio::test]
    async fn test_finished_sessions_are_forgotten() {
        let sequencer = RequestSequencer::new();

        for _ in 0..1_000 {
            let ticket = sequencer.issue(Uuid::new_v4()).await;
            assert!(sequencer.finish(ticket).await);
        }
        assert_eq!(sequencer.tracked_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_stale_ticket_stays_stale_after_session_is_reused() {
        let sequencer = RequestSequencer::new();
        let session = Uuid::new_v4();

        let slow = sequencer.issue(session).await;
        let fast = sequencer.issue(session).await;
        assert!(sequencer.finish(fast).await);
        assert_eq!(sequencer.tracked_sessions().await, 0);

        let next = sequencer.issue(session).await;
        assert!(!sequencer.finish(slow).await);
        assert!(sequencer.is_current(next).await);
        assert!(sequencer.finish(next).await);
        assert_eq!(sequencer.tracked_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_superseded_result_is_discarded() {
        let mock = Arc::new(MockProvider::with_text(REPLY).with_delay(Duration::from_millis(50)));
        let analyzer = analyzer(mock.clone());
        let session = Uuid::new_v4();

        let (older, newer) = tokio::join!(
            analyzer.analyze_in_session(session, "kettle"),
            analyzer.analyze_in_session(session, "kettle 1.5L"),
        );

        assert_eq!(older, Err(PriceScoutError::Superseded { sequence: 1 }));
        let (ticket, result) = newer.unwrap();
        assert_eq!(ticket.sequence, 2);
        assert_eq!(result.analysis.product_name, "Kettle");
        assert_eq!(mock.calls(), 2);
        assert_eq!(analyzer.sequencer.tracked_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_failed_session_request_is_forgotten() {
        let mock = Arc::new(MockProvider::failing(PriceScoutError::EmptyResponse));
        let analyzer = analyzer(mock);

        let result = analyzer.analyze_in_session(Uuid::new_v4(), "kettle").await;
        assert_eq!(result, Err(PriceScoutError::EmptyResponse));
        assert_eq!(analyzer.sequencer.tracked_sessions().await, 0);
    }
}
