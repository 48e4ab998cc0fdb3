use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docqa::{
    api,
    config::Config,
    processing::{DocumentService, PipelineSettings},
};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "support/pdf.rs"]
mod pdf_support;

use pdf_support::sample_pdf;

const BOUNDARY: &str = "docqa-flow-boundary";

fn config_for(server: &MockServer, upload_dir: &std::path::Path) -> Config {
    let base_url = server.base_url();
    let upload_dir = upload_dir.display().to_string();
    Config::from_lookup(|key| match key {
        "GOOGLE_API_KEY" => Some("flow-key".to_string()),
        "GEMINI_BASE_URL" => Some(base_url.clone()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .expect("config")
}

fn upload_request(pdf: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"wall.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(pdf);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("upload request")
}

fn query_request(document_id: &str, query: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "document_id": document_id, "query": query }).to_string(),
        ))
        .expect("query request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn upload_then_query_round_trip_through_gemini() {
    let server = MockServer::start_async().await;
    let embed_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/embedding-001:embedContent")
                .header("x-goog-api-key", "flow-key");
            then.status(200)
                .json_body(json!({ "embedding": { "values": [0.6, 0.8] } }));
        })
        .await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent")
                .body_contains("The retaining wall is 4 metres high.")
                .body_contains("say that you don't know");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "The wall is 4 metres high." }]
                    },
                    "finishReason": "STOP"
                }]
            }));
        })
        .await;

    let upload_dir = tempfile::tempdir().expect("upload dir");
    let config = config_for(&server, upload_dir.path());
    assert_eq!(PipelineSettings::from(&config), PipelineSettings::default());
    let service = DocumentService::from_config(&config).expect("service");
    let app = api::create_router(Arc::new(service));

    let pdf = sample_pdf(&["The retaining wall is 4 metres high."]);
    let (status, upload) = send(&app, upload_request(&pdf)).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {upload}");
    let document_id = upload["document_id"].as_str().expect("id").to_string();
    assert_eq!(std::fs::read_dir(upload_dir.path()).expect("dir").count(), 0);

    let question = query_request(&document_id, "How high is the wall?");
    let (status, answer) = send(&app, question).await;
    assert_eq!(status, StatusCode::OK, "query failed: {answer}");
    assert_eq!(answer["answer"], "The wall is 4 metres high.");
    assert!(
        answer["source_text"]
            .as_str()
            .expect("source_text")
            .contains("The retaining wall is 4 metres high.")
    );

    embed_mock.assert_hits(2);
    generate_mock.assert();

    let metrics_request = Request::get("/metrics").body(Body::empty()).expect("request");
    let (status, metrics) = send(&app, metrics_request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["documents_indexed"], 1);
    assert_eq!(metrics["queries_answered"], 1);
}

#[tokio::test]
async fn provider_outage_fails_upload_without_leaving_files() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/embedding-001:embedContent");
            then.status(429).body("RESOURCE_EXHAUSTED");
        })
        .await;

    let upload_dir = tempfile::tempdir().expect("upload dir");
    let service = DocumentService::from_config(&config_for(&server, upload_dir.path()))
        .expect("service");
    let app = api::create_router(Arc::new(service));

    let pdf = sample_pdf(&["Piles are driven to refusal."]);
    let (status, body) = send(&app, upload_request(&pdf)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["detail"]
            .as_str()
            .expect("detail")
            .contains("RESOURCE_EXHAUSTED")
    );
    assert_eq!(std::fs::read_dir(upload_dir.path()).expect("dir").count(), 0);
}

#[tokio::test]
async fn query_for_unknown_document_is_404() {
    let server = MockServer::start_async().await;
    let upload_dir = tempfile::tempdir().expect("upload dir");
    let service = DocumentService::from_config(&config_for(&server, upload_dir.path()))
        .expect("service");
    let app = api::create_router(Arc::new(service));

    let (status, body) = send(
        &app,
        query_request("00000000-0000-4000-8000-000000000000", "Anything?"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Document not found." }));
}
