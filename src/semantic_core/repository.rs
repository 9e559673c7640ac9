//! Repository seam in front of the semantic core client.
//!
//! Delegates every call to the gateway unchanged. Caching or rate limiting would live here.

use crate::semantic_core::client::SemanticCoreGateway;
use crate::semantic_core::dto::{
    ContentQueryParams, CreateDocumentRequest, CreateDocumentResponse, DocumentContent,
    IngestRequest, IngestResponse, SearchQueryParams, SearchResults,
};
use crate::semantic_core::error::SemanticCoreError;
use async_trait::async_trait;

/// Document operations consumed by the service layer.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Check upstream health.
    async fn probe_health(&self) -> Result<String, SemanticCoreError>;

    /// Register a document.
    async fn persist_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, SemanticCoreError>;

    /// Queue an ingestion job.
    async fn dispatch_ingest_job(
        &self,
        doc_id: &str,
        request: IngestRequest,
    ) -> Result<IngestResponse, SemanticCoreError>;

    /// Fetch document content.
    async fn fetch_document_content(
        &self,
        doc_id: &str,
        params: ContentQueryParams,
    ) -> Result<DocumentContent, SemanticCoreError>;

    /// Search within a document.
    async fn search_document(
        &self,
        doc_id: &str,
        params: SearchQueryParams,
    ) -> Result<SearchResults, SemanticCoreError>;
}

/// Repository backed by a [`SemanticCoreGateway`].
pub struct SemanticCoreRepository<C> {
    client: C,
}

impl<C> SemanticCoreRepository<C>
where
    C: SemanticCoreGateway,
{
    /// Wrap a gateway.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> DocumentRepository for SemanticCoreRepository<C>
where
    C: SemanticCoreGateway,
{
    async fn probe_health(&self) -> Result<String, SemanticCoreError> {
        self.client.probe_health().await
    }

    async fn persist_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, SemanticCoreError> {
        self.client.persist_document(request).await
    }

    async fn dispatch_ingest_job(
        &self,
        doc_id: &str,
        request: IngestRequest,
    ) -> Result<IngestResponse, SemanticCoreError> {
        self.client.dispatch_ingest_job(doc_id, request).await
    }

    async fn fetch_document_content(
        &self,
        doc_id: &str,
        params: ContentQueryParams,
    ) -> Result<DocumentContent, SemanticCoreError> {
        self.client.fetch_document_content(doc_id, params).await
    }

    async fn search_document(
        &self,
        doc_id: &str,
        params: SearchQueryParams,
    ) -> Result<SearchResults, SemanticCoreError> {
        self.client.search_document(doc_id, params).await
    }
}
