//! HTTP surface for semantic core document operations.
//!
//! Routes, relative to wherever the router is mounted:
//!
//! - `POST /documents` – Register a document; returns `{ doc_id, upload_url, upload_method }`.
//! - `POST /documents/:doc_id/ingest` – Queue ingestion; returns `{ job_id, doc_id, queued }`.
//! - `GET /documents/:doc_id/content` – Extracted content (`page`, `mode` query params), passed
//!   through from the upstream unchanged.
//! - `GET /documents/:doc_id/search` – Search within a document (`query` required, `page` and
//!   `limit` optional), passed through unchanged.
//!
//! Failures answer with `{ "Error": message }`. Upstream rejections keep their 4xx/5xx status and
//! add `UpstreamStatusCode` and `UpstreamBodyText`; anything that never got a usable answer from
//! the upstream becomes a 502.

use crate::result::ResultExt;
use crate::semantic_core::dto::{
    ContentQueryParams, CreateDocumentRequest, CreateDocumentRequestJson, IngestRequest,
    IngestRequestJson, SearchQueryParams,
};
use crate::semantic_core::error::SemanticCoreError;
use crate::semantic_core::service::SemanticCoreApi;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Body returned when `GET .../search` is called without a `query`.
pub const MISSING_QUERY_MESSAGE: &str = "Missing required query param: query";

/// Build the router exposing the document endpoints.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SemanticCoreApi + 'static,
{
    Router::new()
        .route("/documents", post(create_document::<S>))
        .route("/documents/:doc_id/ingest", post(ingest_document::<S>))
        .route("/documents/:doc_id/content", get(get_document_content::<S>))
        .route("/documents/:doc_id/search", get(search_document::<S>))
        .with_state(service)
}

/// Query string accepted by `GET /documents/:doc_id/content`.
#[derive(Deserialize)]
struct ContentQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    mode: Option<String>,
}

/// Query string accepted by `GET /documents/:doc_id/search`.
#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

async fn create_document<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<CreateDocumentRequestJson>, JsonRejection>,
) -> Response
where
    S: SemanticCoreApi,
{
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let request = CreateDocumentRequest::from_wire(body);

    service.persist_document(request).await.fold(
        |response| {
            tracing::info!(doc_id = response.doc_id(), "Create document request completed");
            (StatusCode::OK, Json(response.to_wire())).into_response()
        },
        |error| AppError(error).into_response(),
    )
}

async fn ingest_document<S>(
    State(service): State<Arc<S>>,
    Path(doc_id): Path<String>,
    payload: Result<Json<IngestRequestJson>, JsonRejection>,
) -> Response
where
    S: SemanticCoreApi,
{
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let request = IngestRequest::from_wire(body);

    service.dispatch_ingest_job(&doc_id, request).await.fold(
        |response| {
            tracing::info!(
                doc_id = response.doc_id(),
                job_id = response.job_id(),
                queued = response.queued(),
                "Ingest request completed"
            );
            (StatusCode::OK, Json(response.to_wire())).into_response()
        },
        |error| AppError(error).into_response(),
    )
}

async fn get_document_content<S>(
    State(service): State<Arc<S>>,
    Path(doc_id): Path<String>,
    query: Result<Query<ContentQuery>, QueryRejection>,
) -> Response
where
    S: SemanticCoreApi,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let params = ContentQueryParams::new(parse_int_or_null(query.page.as_deref()), query.mode);

    service.fetch_document_content(&doc_id, params).await.fold(
        |content| (StatusCode::OK, Json(content)).into_response(),
        |error| AppError(error).into_response(),
    )
}

async fn search_document<S>(
    State(service): State<Arc<S>>,
    Path(doc_id): Path<String>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response
where
    S: SemanticCoreApi,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let Some(text) = query.query.filter(|text| !text.is_empty()) else {
        return rejection_response(StatusCode::BAD_REQUEST, MISSING_QUERY_MESSAGE.to_string());
    };
    let params = SearchQueryParams::new(
        text,
        parse_int_or_null(query.page.as_deref()),
        parse_int_or_null(query.limit.as_deref()),
    );

    service.search_document(&doc_id, params).await.fold(
        |results| (StatusCode::OK, Json(results)).into_response(),
        |error| AppError(error).into_response(),
    )
}

/// Leading-integer parse that never fails: `"2"` and `"2abc"` give `Some(2)`, `"abc"` gives `None`.
pub(crate) fn parse_int_or_null(raw: Option<&str>) -> Option<i64> {
    let trimmed = raw?.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// HTTP status for a failed call: upstream 4xx/5xx are reused, everything else is a 502.
pub fn status_for(error: &SemanticCoreError) -> StatusCode {
    match error.upstream_details() {
        Some((status, _)) if (400..=599).contains(&status) => {
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "Error": message }))).into_response()
}

struct AppError(SemanticCoreError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = match self.0.upstream_details() {
            Some((upstream_status, body_text)) => json!({
                "Error": self.0.to_string(),
                "UpstreamStatusCode": upstream_status,
                "UpstreamBodyText": body_text,
            }),
            None => json!({ "Error": self.0.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_core::dto::{
        CreateDocumentResponse, DocumentContent, IngestResponse, SearchResults,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use serde_json::Value;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Persist(CreateDocumentRequest),
        Ingest(String, IngestRequest),
        Content(String, ContentQueryParams),
        Search(String, SearchQueryParams),
    }

    #[derive(Default)]
    struct StubService {
        calls: Mutex<Vec<Call>>,
        fail_with: Option<SemanticCoreError>,
    }

    impl StubService {
        fn failing(error: SemanticCoreError) -> Self {
            Self {
                fail_with: Some(error),
                ..Self::default()
            }
        }

        async fn record(&self, call: Call) -> Result<(), SemanticCoreError> {
            self.calls.lock().await.push(call);
            self.fail_with.clone().map_or(Ok(()), Err)
        }

        async fn recorded_calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl SemanticCoreApi for StubService {
        async fn probe_health(&self) -> Result<String, SemanticCoreError> {
            Ok("OK".into())
        }

        async fn persist_document(
            &self,
            request: CreateDocumentRequest,
        ) -> Result<CreateDocumentResponse, SemanticCoreError> {
            self.record(Call::Persist(request))
                .await
                .map(|()| CreateDocumentResponse::new("d1", "https://u", "PUT"))
        }

        async fn dispatch_ingest_job(
            &self,
            doc_id: &str,
            request: IngestRequest,
        ) -> Result<IngestResponse, SemanticCoreError> {
            self.record(Call::Ingest(doc_id.to_string(), request))
                .await
                .map(|()| IngestResponse::new("j1", doc_id, true))
        }

        async fn fetch_document_content(
            &self,
            doc_id: &str,
            params: ContentQueryParams,
        ) -> Result<DocumentContent, SemanticCoreError> {
            self.record(Call::Content(doc_id.to_string(), params))
                .await
                .map(|()| json!({ "Any": "Thing", "nested": { "pages": [1, 2] } }))
        }

        async fn search_document(
            &self,
            doc_id: &str,
            params: SearchQueryParams,
        ) -> Result<SearchResults, SemanticCoreError> {
            self.record(Call::Search(doc_id.to_string(), params))
                .await
                .map(|()| json!({ "hits": [{ "score": 0.9 }] }))
        }
    }

    async fn send(
        service: Arc<StubService>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = create_router(service)
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[test]
    fn parse_int_or_null_fails_soft() {
        assert_eq!(parse_int_or_null(None), None);
        assert_eq!(parse_int_or_null(Some("")), None);
        assert_eq!(parse_int_or_null(Some("abc")), None);
        assert_eq!(parse_int_or_null(Some("2")), Some(2));
        assert_eq!(parse_int_or_null(Some(" 7px")), Some(7));
        assert_eq!(parse_int_or_null(Some("-3")), Some(-3));
        assert_eq!(parse_int_or_null(Some("99999999999999999999")), None);
    }

    #[test]
    fn status_mapping_keeps_upstream_http_errors_only() {
        let upstream = |status| SemanticCoreError::Upstream {
            status,
            body: String::new(),
        };
        assert_eq!(status_for(&upstream(404)), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&upstream(500)), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&upstream(302)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&SemanticCoreError::Timeout { timeout_ms: 1 }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SemanticCoreError::Network("refused".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SemanticCoreError::Parse("eof".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn create_document_returns_wire_response() {
        let service = Arc::new(StubService::default());
        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/documents",
            Some(json!({ "file_name": "10k.pdf", "mime_type": "application/pdf" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "doc_id": "d1", "upload_url": "https://u", "upload_method": "PUT" })
        );
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Persist(CreateDocumentRequest::new(
                "10k.pdf",
                "application/pdf",
                None
            ))]
        );
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_with_error_message() {
        let service = Arc::new(StubService::default());
        let response = create_router(service.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/documents")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&bytes).expect("json body");
        assert!(json["Error"].is_string());
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn ingest_decodes_path_identifier() {
        let service = Arc::new(StubService::default());
        let (status, body) = send(
            service.clone(),
            Method::POST,
            "/documents/d%2F1/ingest",
            Some(json!({ "unstructured_strategy": "fast" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "job_id": "j1", "doc_id": "d/1", "queued": true }));
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Ingest(
                "d/1".into(),
                IngestRequest::new(Some("fast".into()), None)
            )]
        );
    }

    #[tokio::test]
    async fn content_passes_upstream_json_through() {
        let service = Arc::new(StubService::default());
        let (status, body) = send(
            service.clone(),
            Method::GET,
            "/documents/d1/content?page=abc&mode=markdown",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "Any": "Thing", "nested": { "pages": [1, 2] } }));
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Content(
                "d1".into(),
                ContentQueryParams::new(None, Some("markdown".into()))
            )]
        );
    }

    #[tokio::test]
    async fn search_without_query_is_rejected_before_service() {
        for uri in ["/documents/d1/search", "/documents/d1/search?query=&page=2"] {
            let service = Arc::new(StubService::default());
            let (status, body) = send(service.clone(), Method::GET, uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "Error": MISSING_QUERY_MESSAGE }));
            assert!(service.recorded_calls().await.is_empty());
        }
    }

    #[tokio::test]
    async fn search_coerces_numeric_params() {
        let service = Arc::new(StubService::default());
        let (status, body) = send(
            service.clone(),
            Method::GET,
            "/documents/d1/search?query=revenue&page=2&limit=ten",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "hits": [{ "score": 0.9 }] }));
        assert_eq!(
            service.recorded_calls().await,
            vec![Call::Search(
                "d1".into(),
                SearchQueryParams::new("revenue", Some(2), None)
            )]
        );
    }

    #[tokio::test]
    async fn upstream_status_is_reused_with_diagnostics() {
        let service = Arc::new(StubService::failing(SemanticCoreError::Upstream {
            status: 500,
            body: "fail".into(),
        }));
        let (status, body) = send(service, Method::GET, "/documents/d1/content", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "Error": "Upstream HTTP 500",
                "UpstreamStatusCode": 500,
                "UpstreamBodyText": "fail"
            })
        );
    }

    #[tokio::test]
    async fn out_of_range_upstream_status_becomes_bad_gateway() {
        let service = Arc::new(StubService::failing(SemanticCoreError::Upstream {
            status: 302,
            body: "moved".into(),
        }));
        let (status, body) = send(
            service,
            Method::POST,
            "/documents/d1/ingest",
            Some(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["UpstreamStatusCode"], 302);
    }

    #[tokio::test]
    async fn transport_failures_become_bad_gateway() {
        let service = Arc::new(StubService::failing(SemanticCoreError::Timeout {
            timeout_ms: 250,
        }));
        let (status, body) = send(
            service,
            Method::GET,
            "/documents/d1/search?query=x",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({ "Error": "Request timed out after 250ms" }));
    }
}
