//! HTTP surface for ragd.
//!
//! A thin JSON API over the knowledge pipelines:
//!
//! | Method | Path          | Description                        |
//! |--------|---------------|------------------------------------|
//! | `GET`  | `/health`     | Liveness check                     |
//! | `GET`  | `/ai/models`  | Configured model identifiers       |
//! | `POST` | `/ai/ask`     | Answer a question against the index|
//! | `POST` | `/ai/reindex` | Rebuild the index from the corpora |
//!
//! Error responses carry `{"error": {"code", "message"}}`. All origins
//! are permitted so browser frontends can call the API directly.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use ragd_core::{AppError, AppResult, RagConfig};
use ragd_knowledge::{EmbeddingProvider, OllamaEmbedder};
use ragd_llm::{LlmClient, OllamaClient};

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RagConfig>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmClient>,
}

/// Build the application router over the given state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ai/models", get(handle_models))
        .route("/ai/ask", post(handle_ask))
        .route("/ai/reindex", post(handle_reindex))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until the process is terminated.
///
/// Wires the Ollama-backed embedder and chat client from the
/// configuration and binds to `config.bind`.
pub async fn run_server(config: RagConfig) -> AppResult<()> {
    let embedder = OllamaEmbedder::new(
        &config.ollama_base_url,
        &config.embed_model,
        config.embedding_dim,
    )?;
    let llm = OllamaClient::with_base_url(&config.ollama_base_url)?;

    let bind = config.bind.clone();
    let state = AppState {
        config: Arc::new(config),
        embedder: Arc::new(embedder),
        llm: Arc::new(llm),
    };

    let app = router(state);

    info!("Listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| AppError::Other(format!("Failed to bind {}: {}", bind, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into an HTTP response.
struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(err: AppError) -> ApiError {
    error!("Request failed: {}", err);
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============ GET /ai/models ============

#[derive(Serialize)]
struct ModelsResponse {
    ollama_base_url: String,
    llm_model: String,
    embed_model: String,
}

async fn handle_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        ollama_base_url: state.config.ollama_base_url.clone(),
        llm_model: state.config.llm_model.clone(),
        embed_model: state.config.embed_model.clone(),
    })
}

// ============ POST /ai/ask ============

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<ragd_knowledge::Answer>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(bad_request("question is required"));
    }

    let answer = ragd_knowledge::ask(
        &state.config,
        state.embedder.as_ref(),
        state.llm.as_ref(),
        question,
    )
    .await
    .map_err(internal)?;

    Ok(Json(answer))
}

// ============ POST /ai/reindex ============

async fn handle_reindex(
    State(state): State<AppState>,
) -> Result<Json<ragd_knowledge::IndexSummary>, ApiError> {
    let summary = ragd_knowledge::reindex_all(&state.config, state.embedder.as_ref())
        .await
        .map_err(internal)?;

    Ok(Json(summary))
}
