//! HTTP surface for docqa.
//!
//! - `POST /upload` – Multipart upload (field `file`) of a PDF. Extracts, chunks, embeds, and
//!   registers the document, returning `{ "document_id": "..." }`.
//! - `POST /api/query` – `{ "document_id", "query" }` → `{ "answer", "source_text" }`. Unknown
//!   documents yield 404 with `{ "detail": "Document not found." }`.
//! - `GET /metrics` – Ingestion and query counters since startup.
//! - `GET /` and `GET /items/{item_id}` – Demo endpoints.
//!
//! Errors are rendered as `{ "detail": "..." }` bodies.

use crate::processing::{DocumentApi, IngestError, QueryError};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";

/// Build the HTTP router exposing the document API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/", get(read_root))
        .route("/items/:item_id", get(read_item))
        .route("/upload", post(upload_file::<S>))
        .route("/api/query", post(query_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::disable())
        .with_state(service)
}

/// Success response for `POST /upload`.
#[derive(Serialize)]
struct UploadResponse {
    document_id: String,
}

/// Accept a multipart PDF upload and index it.
async fn upload_file<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError>
where
    S: DocumentApi,
{
    let mut multipart = multipart?;
    let mut bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            tracing::debug!(
                file_name = field.file_name().unwrap_or_default(),
                content_type = field.content_type().unwrap_or_default(),
                "Receiving upload"
            );
            bytes = Some(field.bytes().await?);
            break;
        }
    }

    let bytes = bytes.ok_or_else(|| {
        AppError::InvalidRequest(format!("Missing multipart field '{UPLOAD_FIELD}'"))
    })?;
    let outcome = service.upload_document(bytes.to_vec()).await?;
    tracing::info!(
        document_id = %outcome.document_id,
        pages = outcome.page_count,
        chunks = outcome.chunk_count,
        "Upload request completed"
    );

    Ok(Json(UploadResponse {
        document_id: outcome.document_id.to_string(),
    }))
}

/// Request body for `POST /api/query`.
#[derive(Deserialize)]
struct QueryRequest {
    document_id: String,
    query: String,
}

/// Success response for `POST /api/query`.
#[derive(Serialize)]
struct QueryResponse {
    answer: String,
    source_text: String,
}

/// Answer a question about a previously uploaded document.
async fn query_document<S>(
    State(service): State<Arc<S>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError>
where
    S: DocumentApi,
{
    let Json(QueryRequest { document_id, query }) = request?;
    let answer = service.query_document(&document_id, &query).await?;
    Ok(Json(QueryResponse {
        answer: answer.answer,
        source_text: answer.source_text,
    }))
}

/// Return ingestion and query counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

async fn read_root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

/// Optional query parameters for `GET /items/{item_id}`.
#[derive(Deserialize)]
struct ItemQuery {
    q: Option<String>,
}

#[derive(Serialize)]
struct ItemResponse {
    item_id: i64,
    q: Option<String>,
}

async fn read_item(
    item_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> Result<Json<ItemResponse>, AppError> {
    let Path(item_id) = item_id?;
    let Query(query) = query?;
    Ok(Json(ItemResponse {
        item_id,
        q: query.q,
    }))
}

enum AppError {
    Ingest(IngestError),
    Query(QueryError),
    InvalidRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Query(QueryError::DocumentNotFound) => {
                (StatusCode::NOT_FOUND, QueryError::DocumentNotFound.to_string())
            }
            AppError::InvalidRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            AppError::Ingest(error) => {
                tracing::error!(error = %error, "Upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            AppError::Query(error) => {
                tracing::error!(error = %error, "Query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

impl From<QueryError> for AppError {
    fn from(inner: QueryError) -> Self {
        Self::Query(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::InvalidRequest(inner.body_text())
    }
}

macro_rules! invalid_request_from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(inner: $rejection) -> Self {
                    tracing::debug!(status = %inner.status(), "Rejected request");
                    Self::InvalidRequest(inner.body_text())
                }
            }
        )+
    };
}

invalid_request_from_rejection!(JsonRejection, MultipartRejection, PathRejection, QueryRejection);
