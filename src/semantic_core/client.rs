//! HTTP client wrapper for the semantic core service.

use crate::result::{catch_panic_async, panic_message};
use crate::semantic_core::dto::{
    ContentQueryParams, CreateDocumentRequest, CreateDocumentResponse, CreateDocumentResponseJson,
    DocumentContent, IngestRequest, IngestResponse, IngestResponseJson, SearchQueryParams,
    SearchResults,
};
use crate::semantic_core::error::SemanticCoreError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::{Url, form_urlencoded};

/// Default per-call deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default cap on buffered upstream bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const NO_BODY: Option<&()> = None;

/// Operations offered by the semantic core service, one network call each.
#[async_trait]
pub trait SemanticCoreGateway: Send + Sync {
    /// Check that the upstream is alive; returns its health text.
    async fn probe_health(&self) -> Result<String, SemanticCoreError>;

    /// Register a document and obtain its upload location.
    async fn persist_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, SemanticCoreError>;

    /// Queue an ingestion job for an uploaded document.
    async fn dispatch_ingest_job(
        &self,
        doc_id: &str,
        request: IngestRequest,
    ) -> Result<IngestResponse, SemanticCoreError>;

    /// Fetch extracted document content.
    async fn fetch_document_content(
        &self,
        doc_id: &str,
        params: ContentQueryParams,
    ) -> Result<DocumentContent, SemanticCoreError>;

    /// Run a search scoped to one document.
    async fn search_document(
        &self,
        doc_id: &str,
        params: SearchQueryParams,
    ) -> Result<SearchResults, SemanticCoreError>;
}

/// Successful upstream body, classified by content.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamPayload {
    /// 2xx with a zero-length body.
    Empty,
    /// 2xx with a JSON content type and a decodable body.
    Json(Value),
    /// 2xx with any other content type; body passed through verbatim.
    Text(String),
}

impl UpstreamPayload {
    /// Collapse into a JSON value: empty becomes `null`, text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    /// Collapse into text: JSON strings are unwrapped, other JSON is re-serialized.
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Json(Value::String(text)) => text,
            Self::Json(other) => other.to_string(),
            Self::Text(text) => text,
        }
    }

    /// Decode into a typed wire shape.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, SemanticCoreError> {
        match self {
            Self::Empty => Err(SemanticCoreError::Parse(
                "upstream returned an empty body".to_string(),
            )),
            Self::Json(value) => serde_json::from_value(value)
                .map_err(|err| SemanticCoreError::Parse(err.to_string())),
            Self::Text(text) => serde_json::from_str(&text)
                .map_err(|err| SemanticCoreError::Parse(err.to_string())),
        }
    }
}

/// Lightweight HTTP client for semantic core operations.
///
/// Holds only immutable configuration plus the pooled `reqwest` client, so a single instance is
/// shared by every request for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct SemanticCoreClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    max_body_bytes: usize,
}

impl SemanticCoreClient {
    /// Construct a client for `base_url` with a per-call deadline of `timeout_ms`.
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, SemanticCoreError> {
        let client = Client::builder().user_agent("semcore-proxy/0.1").build()?;
        let base_url = normalize_base_url(base_url).map_err(SemanticCoreError::InvalidUrl)?;
        tracing::debug!(url = %base_url, timeout_ms, "Initialized semantic core HTTP client");

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Override the maximum number of response bytes buffered per call.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Normalized upstream base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-call deadline in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Build an endpoint URL from raw path segments (each percent-encoded) and optional query pairs.
    pub fn endpoint(
        &self,
        segments: &[&str],
        query: &[(&str, Option<String>)],
    ) -> Result<Url, SemanticCoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SemanticCoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(query) = build_query(query).strip_prefix('?') {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<UpstreamPayload, SemanticCoreError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let timeout_ms = self.timeout_ms();
        tracing::debug!(%method, %url, "Calling semantic core");

        // Dropping the in-flight future on expiry tears the connection down.
        let call = catch_panic_async(self.send(method.clone(), url.clone(), body), |payload| {
            SemanticCoreError::Network(format!("transport panicked: {}", panic_message(&payload)))
        });
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.and_then(|inner| inner),
            Err(_) => Err(SemanticCoreError::Timeout { timeout_ms }),
        };

        if let Err(error) = &outcome {
            match error {
                SemanticCoreError::Upstream { status, .. } => {
                    tracing::warn!(%method, %url, status, error = %error, "Semantic core rejected request");
                }
                _ => tracing::error!(%method, %url, error = %error, "Semantic core request failed"),
            }
        }
        outcome
    }

    async fn send<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<UpstreamPayload, SemanticCoreError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let timeout_ms = self.timeout_ms();
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| classify_transport_error(err, timeout_ms))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let text = if (200..=299).contains(&status) {
            read_body_text(response, self.max_body_bytes, timeout_ms).await?
        } else {
            read_error_body_text(response, self.max_body_bytes, timeout_ms).await?
        };

        classify_response(status, content_type.as_deref(), text)
    }
}

#[async_trait]
impl SemanticCoreGateway for SemanticCoreClient {
    async fn probe_health(&self) -> Result<String, SemanticCoreError> {
        let url = self.endpoint(&["healthcheck"], &[])?;
        self.execute(Method::GET, url, NO_BODY)
            .await
            .map(UpstreamPayload::into_text)
    }

    async fn persist_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, SemanticCoreError> {
        let url = self.endpoint(&["v1", "documents"], &[])?;
        let response = self
            .execute(Method::POST, url, Some(&request.to_wire()))
            .await?
            .decode::<CreateDocumentResponseJson>()
            .map(CreateDocumentResponse::from_wire)?;
        tracing::debug!(
            doc_id = response.doc_id(),
            file_name = request.file_name(),
            "Document registered"
        );
        Ok(response)
    }

    async fn dispatch_ingest_job(
        &self,
        doc_id: &str,
        request: IngestRequest,
    ) -> Result<IngestResponse, SemanticCoreError> {
        let url = self.endpoint(&["v1", "documents", doc_id, "ingest"], &[])?;
        let response = self
            .execute(Method::POST, url, Some(&request.to_wire()))
            .await?
            .decode::<IngestResponseJson>()
            .map(IngestResponse::from_wire)?;
        tracing::debug!(
            doc_id,
            job_id = response.job_id(),
            queued = response.queued(),
            "Ingest job dispatched"
        );
        Ok(response)
    }

    async fn fetch_document_content(
        &self,
        doc_id: &str,
        params: ContentQueryParams,
    ) -> Result<DocumentContent, SemanticCoreError> {
        let url = self.endpoint(
            &["v1", "documents", doc_id, "content"],
            &[
                ("page", params.page().map(|page| page.to_string())),
                ("mode", params.mode().map(str::to_owned)),
            ],
        )?;
        self.execute(Method::GET, url, NO_BODY)
            .await
            .map(UpstreamPayload::into_value)
    }

    async fn search_document(
        &self,
        doc_id: &str,
        params: SearchQueryParams,
    ) -> Result<SearchResults, SemanticCoreError> {
        let url = self.endpoint(
            &["v1", "documents", doc_id, "search"],
            &[
                ("query", Some(params.query().to_owned())),
                ("page", params.page().map(|page| page.to_string())),
                ("limit", params.limit().map(|limit| limit.to_string())),
            ],
        )?;
        self.execute(Method::GET, url, NO_BODY)
            .await
            .map(UpstreamPayload::into_value)
    }
}

/// Form-encode the present pairs, returning `""` when none remain and `"?k=v&..."` otherwise.
pub fn build_query(pairs: &[(&str, Option<String>)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut appended = false;
    for (key, value) in pairs {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            appended = true;
        }
    }
    if appended {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

/// Classify a fully-read upstream response.
pub fn classify_response(
    status: u16,
    content_type: Option<&str>,
    body: String,
) -> Result<UpstreamPayload, SemanticCoreError> {
    if !(200..=299).contains(&status) {
        return Err(SemanticCoreError::Upstream { status, body });
    }
    if body.is_empty() {
        return Ok(UpstreamPayload::Empty);
    }
    let is_json = content_type
        .map(|value| value.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    if is_json {
        return serde_json::from_str(&body)
            .map(UpstreamPayload::Json)
            .map_err(|err| SemanticCoreError::Parse(err.to_string()));
    }
    Ok(UpstreamPayload::Text(body))
}

async fn read_body_text(
    mut response: reqwest::Response,
    limit: usize,
    timeout_ms: u64,
) -> Result<String, SemanticCoreError> {
    if let Some(length) = response.content_length()
        && length > limit as u64
    {
        return Err(SemanticCoreError::BodyTooLarge { limit });
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| classify_transport_error(err, timeout_ms))?
    {
        if buffer.len() + chunk.len() > limit {
            return Err(SemanticCoreError::BodyTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Read a rejection body, keeping at most `limit` bytes so the status always survives.
async fn read_error_body_text(
    mut response: reqwest::Response,
    limit: usize,
    timeout_ms: u64,
) -> Result<String, SemanticCoreError> {
    let mut buffer = Vec::new();
    while buffer.len() < limit
        && let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| classify_transport_error(err, timeout_ms))?
    {
        let remaining = limit - buffer.len();
        buffer.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn classify_transport_error(err: reqwest::Error, timeout_ms: u64) -> SemanticCoreError {
    if err.is_timeout() {
        SemanticCoreError::Timeout { timeout_ms }
    } else {
        SemanticCoreError::Network(err.to_string())
    }
}

fn normalize_base_url(url: &str) -> Result<Url, String> {
    let mut parsed = Url::parse(url.trim()).map_err(|err| format!("{url}: {err}"))?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url}: not a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}
