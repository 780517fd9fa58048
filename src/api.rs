//! REST API Server for price analysis
//!
//! Exposes the analyzer via HTTP endpoints for the web frontend

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analyzer::PriceAnalyzer;
use crate::error::PriceScoutError;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalyzeRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            error_kind: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(err: &PriceScoutError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn internal(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            error_kind: Some("internal".to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub analyzer: Arc<PriceAnalyzer>,
}

/// =============================
/// Helpers
/// =============================

fn status_for(err: &PriceScoutError) -> StatusCode {
    match err {
        PriceScoutError::EmptyQuery => StatusCode::BAD_REQUEST,
        PriceScoutError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
        PriceScoutError::Superseded { .. } => StatusCode::CONFLICT,
        PriceScoutError::EmptyResponse
        | PriceScoutError::NoStructuredBlock
        | PriceScoutError::MalformedStructuredData(_)
        | PriceScoutError::ProviderError(_) => StatusCode::BAD_GATEWAY,
    }
}

fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

fn parse_session(value: Option<&str>) -> Option<uuid::Uuid> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Some(uuid::Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v)))
        }
        _ => None,
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Analysis Endpoint
/// =============================

async fn analyze_handler(
    State(state): State<ApiState>,
    Json(req): Json<AnalyzeRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received analysis request: {}", req.query);

    let outcome = match parse_session(req.session_id.as_deref()) {
        Some(session) => state
            .analyzer
            .analyze_in_session(session, &req.query)
            .await
            .map(|(ticket, result)| (Some(ticket.sequence), result)),
        None => state.analyzer.analyze(&req.query).await.map(|r| (None, r)),
    };

    match outcome {
        Ok((sequence, result)) => success_envelope(&result, sequence),
        Err(e) => (status_for(&e), Json(ApiResponse::error(&e))),
    }
}

fn success_envelope<T: Serialize>(
    data: &T,
    sequence: Option<u64>,
) -> (StatusCode, Json<ApiResponse>) {
    let mut data = match serde_json::to_value(data) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to serialize analysis result: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::internal(format!(
                    "Failed to serialize analysis result: {}",
                    e
                ))),
            );
        }
    };

    if let Some(sequence) = sequence {
        data["requestSequence"] = serde_json::json!(sequence);
    }
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// =============================
/// Router
/// =============================

pub fn create_router(analyzer: Arc<PriceAnalyzer>) -> Router {
    let state = ApiState { analyzer };

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    analyzer: Arc<PriceAnalyzer>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(analyzer);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
