//! REST API server for VoteChain
//!
//! HTTP surface over the voting coordinator and the voter registry:
//! registration, token validation, vote submission and read-only chain
//! inspection.

use axum::{
    extract::{Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::VoteChainError;
use crate::store::{CredentialStore, VoterRegistry};
use crate::voting::VotingService;

/// Shared handler state: the coordinator plus the concrete registry (the
/// registration endpoint needs more than the `CredentialStore` surface).
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VotingService>,
    pub registry: Arc<VoterRegistry>,
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(serde_json::json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

impl From<VoteChainError> for ApiError {
    fn from(err: VoteChainError) -> Self {
        match err {
            VoteChainError::DuplicateVoter => {
                ApiError::InvalidInput("Voter already registered.".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date_of_birth: String,
    #[serde(default)]
    address: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    success: bool,
    token: String,
    message: String,
}

#[derive(Deserialize)]
struct TokenRequest {
    #[serde(default)]
    token: String,
}

#[derive(Deserialize)]
struct VoteRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    selected_candidate: String,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware. Logs method, path, status and duration.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints (also used by tests).
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - allow all origins with credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/register", post(register))
        .route("/validate-token", post(validate_token))
        .route("/vote", post(vote))
        .route("/candidates", get(get_candidates))
        .route("/blockchain", get(get_blockchain))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(cors)
}

/// Run the API server. `PORT` in the environment overrides the configured
/// port.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(port);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if req.name.trim().is_empty()
        || req.date_of_birth.trim().is_empty()
        || req.address.trim().is_empty()
    {
        return Err(ApiError::InvalidInput(
            "All fields are required.".to_string(),
        ));
    }

    let token = state
        .registry
        .register_voter(&req.name, &req.date_of_birth, &req.address)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            token,
            message: "Registration successful. Please save your token.".to_string(),
        }),
    ))
}

async fn validate_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.token.trim().is_empty() {
        return Err(ApiError::InvalidInput("Token is required.".to_string()));
    }

    if state.registry.is_credential_valid(&req.token)? {
        Ok(Json(MessageResponse {
            success: true,
            message: "Token is valid. Proceed to vote.".to_string(),
        }))
    } else {
        Err(ApiError::InvalidInput(
            "Invalid or already used token.".to_string(),
        ))
    }
}

async fn vote(State(state): State<AppState>, Json(req): Json<VoteRequest>) -> Response {
    if req.selected_candidate.trim().is_empty() {
        return ApiError::InvalidInput("Candidate selection is required.".to_string())
            .into_response();
    }

    match state
        .service
        .cast_vote(&req.token, &req.selected_candidate)
        .await
    {
        Ok(outcome) => {
            let status = if outcome.success {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(outcome)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn get_candidates(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let candidates = state.registry.list_candidates()?;
    Ok(Json(serde_json::json!({
        "success": true,
        "candidates": candidates
    })))
}

async fn get_blockchain(State(state): State<AppState>) -> impl IntoResponse {
    let chain = state.service.snapshot().await;
    Json(serde_json::json!({
        "success": true,
        "length": chain.len(),
        "blockchain": chain
    }))
}
