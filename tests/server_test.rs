use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use data_agent::config::AgentConfig;
use data_agent::llm::{CompletionOptions, Embedder, LanguageModel};
use data_agent::search::{SearchHit, WebSearch};
use data_agent::server::{create_router, AppState};
use data_agent::uploads::UploadStore;
use data_agent::{Agent, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, _prompt: &str, options: CompletionOptions) -> Result<String> {
        if options.json_mode {
            Ok(json!({"summary": "table answer", "chartType": "NONE", "sql": "SELECT COUNT(*) AS n FROM data"})
                .to_string())
        } else {
            Ok("general answer".to_string())
        }
    }
}

struct NoEmbedder;

#[async_trait]
impl Embedder for NoEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0]).collect())
    }
}

struct NoSearch;

#[async_trait]
impl WebSearch for NoSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

fn app() -> (axum::Router, UploadStore) {
    let dir = std::env::temp_dir().join(format!("server-test-{}", uuid::Uuid::new_v4()));
    let uploads = UploadStore::new(dir).unwrap();
    let state = AppState {
        agent: Arc::new(Agent::new(Arc::new(EchoModel), Arc::new(NoEmbedder), Arc::new(NoSearch))),
        uploads: Arc::new(uploads.clone()),
    };
    (create_router(state, &AgentConfig::default()), uploads)
}

fn multipart_request(uri: &str, field: &str, file_name: &str, contents: &str) -> Request<Body> {
    let boundary = "X-DATA-AGENT-BOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn query_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_upload_stores_file_under_its_name() {
    let (app, uploads) = app();
    let response = app
        .oneshot(multipart_request("/uploadfile/", "file", "Sales.CSV", "region,sales\nNorth,10\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"filename": "Sales.CSV"}));
    let stored = std::fs::read_to_string(uploads.resolve("Sales.CSV").unwrap()).unwrap();
    assert_eq!(stored, "region,sales\nNorth,10\n");
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let (app, _) = app();
    let response = app
        .oneshot(multipart_request("/uploadfile", "attachment", "a.csv", "a\n1\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await.get("error").is_some());
}

#[tokio::test]
async fn test_query_without_file_returns_four_fields() {
    let (app, _) = app();
    let response = app
        .oneshot(query_request("/query/", json!({"question": "Hi", "filename": null})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"summary": "general answer", "chartType": "NONE", "chartData": null, "tableData": null})
    );
}

#[tokio::test]
async fn test_upload_then_query_spreadsheet() {
    let (app, _) = app();
    let response = app
        .clone()
        .oneshot(multipart_request("/uploadfile/", "file", "sales.csv", "region,sales\nNorth,10\nSouth,5\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(query_request("/query", json!({"question": "How many rows?", "filename": "sales.csv"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"], "table answer");
    assert_eq!(body["tableData"], json!({"headers": ["n"], "rows": [[2]]}));
}

#[tokio::test]
async fn test_query_unsupported_file() {
    let (app, _) = app();
    let response = app
        .oneshot(query_request("/query/", json!({"question": "q", "filename": "notes.txt"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["summary"], "Unsupported file type.");
}
