//! HTTP API
//!
//! `POST /uploadfile/` stores a multipart `file` field, `POST /query/` answers
//! a question about an optional stored file, `GET /health` reports liveness.
//! Both trailing-slash spellings are routed.

use crate::agent::{Agent, UNSUPPORTED_FILE};
use crate::config::AgentConfig;
use crate::response::AnswerResponse;
use crate::uploads::UploadStore;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Instrument};

/// API State - Shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub uploads: Arc<UploadStore>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Store the multipart `file` field verbatim under its original name
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Uploaded file has no file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e)))?;

        let filename = state.uploads.save(&file_name, &bytes).map_err(|e| {
            error!("Failed to store upload {}: {}", file_name, e);
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;
        return Ok(Json(UploadResponse { filename }));
    }

    Err(api_error(StatusCode::BAD_REQUEST, "No file uploaded"))
}

/// Answer a question; always 200 with the four-field response
async fn query(State(state): State<AppState>, Json(request): Json<QueryRequest>) -> Json<AnswerResponse> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("query", %request_id);

    async move {
        info!("Received question (file: {:?})", request.filename);

        let filename = request
            .filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let answer = match filename {
            None => state.agent.answer(&request.question, None).await,
            Some(name) => match state.uploads.resolve(name) {
                Ok(path) => state.agent.answer(&request.question, Some(path.as_path())).await,
                Err(e) => {
                    warn!("Rejected file name {:?}: {}", name, e);
                    AnswerResponse::text(UNSUPPORTED_FILE)
                }
            },
        };

        Json(answer)
    }
    .instrument(span)
    .await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Create the API router
pub fn create_router(state: AppState, config: &AgentConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/uploadfile/", post(upload_file))
        .route("/uploadfile", post(upload_file))
        .route("/query/", post(query))
        .route("/query", post(query))
        .layer(DefaultBodyLimit::max(config.upload_body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Start the API server
pub async fn start_server(state: AppState, config: &AgentConfig) -> anyhow::Result<()> {
    let app = create_router(state, config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Data agent API listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_filename_is_optional() {
        let request: QueryRequest = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert_eq!(request.filename, None);

        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "hi", "filename": null}"#).unwrap();
        assert_eq!(request.filename, None);

        let request: QueryRequest =
            serde_json::from_str(r#"{"question": "hi", "filename": "a.csv"}"#).unwrap();
        assert_eq!(request.filename.as_deref(), Some("a.csv"));
    }
}
