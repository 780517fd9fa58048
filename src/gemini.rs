//! Gemini API client
//!
//! Calls the `generateContent` endpoint with Google Search grounding enabled.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::Config;
use crate::error::PriceScoutError;
use crate::models::SourceCitation;
use crate::provider::{AnalysisProvider, ProviderRequest, ProviderResponse};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PriceScoutError::ProviderError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(PriceScoutError::MissingCredential),
        };

        let body = GeminiRequest::from_provider_request(request);

        info!(model = %request.model, search = request.search_enabled, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                PriceScoutError::ProviderError(format!("Gemini API error: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(PriceScoutError::ProviderError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            PriceScoutError::ProviderError(format!("Gemini parse error: {}", e.without_url()))
        })?;

        let parsed = into_provider_response(gemini_response);

        info!(
            text_len = parsed.text.as_ref().map(|t| t.len()).unwrap_or(0),
            citations = parsed.citations.len(),
            "Gemini response received"
        );

        Ok(parsed)
    }
}

/// Flatten the first candidate into text + citations
fn into_provider_response(response: GeminiResponse) -> ProviderResponse {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!(block_reason = %reason, "Gemini blocked the prompt");
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return ProviderResponse::default();
    };

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => {}
        Some(other) => warn!(finish_reason = %other, "Gemini candidate finished early"),
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    let citations: Vec<SourceCitation> = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .map(|web| SourceCitation {
            uri: web.uri,
            title: web.title,
        })
        .collect();

    debug!(chunks = citations.len(), "Grounding chunks collected");

    ProviderResponse {
        text: if text.is_empty() { None } else { Some(text) },
        citations,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

impl GeminiRequest {
    fn from_provider_request(request: &ProviderRequest) -> Self {
        let tools = if request.search_enabled {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            vec![]
        };

        Self {
            system_instruction: Content::text(None, &request.system_instruction),
            contents: vec![Content::text(Some("user"), &request.user_instruction)],
            tools,
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}
