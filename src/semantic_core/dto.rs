//! Boundary value objects exchanged with the semantic core service.
//!
//! Each DTO pairs a serde wire shape (`*Json`, snake_case keys as they appear on the wire) with an
//! immutable internal value. `from_wire` defaults absent optional fields to `None`, `to_wire`
//! always emits the optional keys (as `null` when unset), and `new` applies the same defaulting for
//! values built in code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire body for `POST /v1/documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentRequestJson {
    /// Name of the file being registered.
    pub file_name: String,
    /// MIME type of the file.
    pub mime_type: String,
    /// Optional origin marker (for example `user`).
    #[serde(default)]
    pub source: Option<String>,
}

/// Request to register a new document upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDocumentRequest {
    file_name: String,
    mime_type: String,
    source: Option<String>,
}

impl CreateDocumentRequest {
    /// Build a request from internal values.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            source,
        }
    }

    /// Convert from the wire shape.
    pub fn from_wire(json: CreateDocumentRequestJson) -> Self {
        Self::new(json.file_name, json.mime_type, json.source)
    }

    /// Convert to the wire shape.
    pub fn to_wire(&self) -> CreateDocumentRequestJson {
        CreateDocumentRequestJson {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            source: self.source.clone(),
        }
    }

    /// Name of the file being registered.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type of the file.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Optional origin marker.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Wire body returned by `POST /v1/documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentResponseJson {
    /// Identifier assigned to the document.
    pub doc_id: String,
    /// Presigned URL the caller uploads the file to.
    pub upload_url: String,
    /// HTTP method to use against `upload_url`.
    pub upload_method: String,
}

/// Upstream acknowledgement of a registered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDocumentResponse {
    doc_id: String,
    upload_url: String,
    upload_method: String,
}

impl CreateDocumentResponse {
    /// Build a response from internal values.
    pub fn new(
        doc_id: impl Into<String>,
        upload_url: impl Into<String>,
        upload_method: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            upload_url: upload_url.into(),
            upload_method: upload_method.into(),
        }
    }

    /// Convert from the wire shape.
    pub fn from_wire(json: CreateDocumentResponseJson) -> Self {
        Self::new(json.doc_id, json.upload_url, json.upload_method)
    }

    /// Convert to the wire shape.
    pub fn to_wire(&self) -> CreateDocumentResponseJson {
        CreateDocumentResponseJson {
            doc_id: self.doc_id.clone(),
            upload_url: self.upload_url.clone(),
            upload_method: self.upload_method.clone(),
        }
    }

    /// Identifier assigned to the document.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Presigned upload URL.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// HTTP method for the upload.
    pub fn upload_method(&self) -> &str {
        &self.upload_method
    }
}

/// Wire body for `POST /v1/documents/{doc_id}/ingest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequestJson {
    /// Partitioning strategy hint (for example `fast` or `hi_res`).
    #[serde(default)]
    pub unstructured_strategy: Option<String>,
    /// Embedding model override.
    #[serde(default)]
    pub embedding_model: Option<String>,
}

/// Request to queue an ingestion job for an uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestRequest {
    unstructured_strategy: Option<String>,
    embedding_model: Option<String>,
}

impl IngestRequest {
    /// Build a request from internal values.
    pub fn new(unstructured_strategy: Option<String>, embedding_model: Option<String>) -> Self {
        Self {
            unstructured_strategy,
            embedding_model,
        }
    }

    /// Convert from the wire shape.
    pub fn from_wire(json: IngestRequestJson) -> Self {
        Self::new(json.unstructured_strategy, json.embedding_model)
    }

    /// Convert to the wire shape.
    pub fn to_wire(&self) -> IngestRequestJson {
        IngestRequestJson {
            unstructured_strategy: self.unstructured_strategy.clone(),
            embedding_model: self.embedding_model.clone(),
        }
    }

    /// Partitioning strategy hint.
    pub fn unstructured_strategy(&self) -> Option<&str> {
        self.unstructured_strategy.as_deref()
    }

    /// Embedding model override.
    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }
}

/// Wire body returned by the ingest endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponseJson {
    /// Identifier of the queued job.
    pub job_id: String,
    /// Document the job operates on.
    pub doc_id: String,
    /// Whether the job was accepted into the queue.
    pub queued: bool,
}

/// Upstream acknowledgement of a queued ingestion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResponse {
    job_id: String,
    doc_id: String,
    queued: bool,
}

impl IngestResponse {
    /// Build a response from internal values.
    pub fn new(job_id: impl Into<String>, doc_id: impl Into<String>, queued: bool) -> Self {
        Self {
            job_id: job_id.into(),
            doc_id: doc_id.into(),
            queued,
        }
    }

    /// Convert from the wire shape.
    pub fn from_wire(json: IngestResponseJson) -> Self {
        Self::new(json.job_id, json.doc_id, json.queued)
    }

    /// Convert to the wire shape.
    pub fn to_wire(&self) -> IngestResponseJson {
        IngestResponseJson {
            job_id: self.job_id.clone(),
            doc_id: self.doc_id.clone(),
            queued: self.queued,
        }
    }

    /// Identifier of the queued job.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Document the job operates on.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Whether the job was queued.
    pub fn queued(&self) -> bool {
        self.queued
    }
}

/// Query parameters for `GET /v1/documents/{doc_id}/content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQueryParams {
    page: Option<i64>,
    mode: Option<String>,
}

impl ContentQueryParams {
    /// Build content query parameters.
    pub fn new(page: Option<i64>, mode: Option<String>) -> Self {
        Self { page, mode }
    }

    /// Page to fetch.
    pub fn page(&self) -> Option<i64> {
        self.page
    }

    /// Rendering mode understood by the upstream.
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }
}

/// Query parameters for `GET /v1/documents/{doc_id}/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQueryParams {
    query: String,
    page: Option<i64>,
    limit: Option<i64>,
}

impl SearchQueryParams {
    /// Build search query parameters.
    pub fn new(query: impl Into<String>, page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            query: query.into(),
            page,
            limit,
        }
    }

    /// Free-text query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Page of results.
    pub fn page(&self) -> Option<i64> {
        self.page
    }

    /// Maximum number of hits.
    pub fn limit(&self) -> Option<i64> {
        self.limit
    }
}

/// Document content as returned by the upstream; its shape is upstream-defined.
pub type DocumentContent = Value;

/// Search results as returned by the upstream; its shape is upstream-defined.
pub type SearchResults = Value;
