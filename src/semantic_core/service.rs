//! Service layer exposed to the HTTP adapter.

use crate::semantic_core::dto::{
    ContentQueryParams, CreateDocumentRequest, CreateDocumentResponse, DocumentContent,
    IngestRequest, IngestResponse, SearchQueryParams, SearchResults,
};
use crate::semantic_core::error::SemanticCoreError;
use crate::semantic_core::repository::DocumentRepository;
use async_trait::async_trait;

/// Public document operations consumed by external surfaces.
///
/// Business rules that span several upstream calls belong behind this trait; the HTTP adapter only
/// ever sees it, so tests can swap the whole backend for a stub.
#[async_trait]
pub trait SemanticCoreApi: Send + Sync {
    /// Check upstream health.
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

/// Default [`SemanticCoreApi`] implementation delegating to a [`DocumentRepository`].
pub struct SemanticCoreService<R> {
    repository: R,
}

impl<R> SemanticCoreService<R>
where
    R: DocumentRepository,
{
    /// Wrap a repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> SemanticCoreApi for SemanticCoreService<R>
where
    R: DocumentRepository,
{
    async fn probe_health(&self) -> Result<String, SemanticCoreError> {
        self.repository.probe_health().await
    }

    async fn persist_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse, SemanticCoreError> {
        self.repository.persist_document(request).await
    }

    async fn dispatch_ingest_job(
        &self,
        doc_id: &str,
        request: IngestRequest,
    ) -> Result<IngestResponse, SemanticCoreError> {
        self.repository.dispatch_ingest_job(doc_id, request).await
    }

    async fn fetch_document_content(
        &self,
        doc_id: &str,
        params: ContentQueryParams,
    ) -> Result<DocumentContent, SemanticCoreError> {
        self.repository.fetch_document_content(doc_id, params).await
    }

    async fn search_document(
        &self,
        doc_id: &str,
        params: SearchQueryParams,
    ) -> Result<SearchResults, SemanticCoreError> {
        self.repository.search_document(doc_id, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubRepository {
        outcome: Result<serde_json::Value, SemanticCoreError>,
    }

    #[async_trait]
    impl DocumentRepository for StubRepository {
        async fn probe_health(&self) -> Result<String, SemanticCoreError> {
            Ok("healthy".into())
        }

        async fn persist_document(
            &self,
            request: CreateDocumentRequest,
        ) -> Result<CreateDocumentResponse, SemanticCoreError> {
            Ok(CreateDocumentResponse::new(
                format!("id-{}", request.file_name()),
                "https://upload",
                "PUT",
            ))
        }

        async fn dispatch_ingest_job(
            &self,
            doc_id: &str,
            request: IngestRequest,
        ) -> Result<IngestResponse, SemanticCoreError> {
            Ok(IngestResponse::new(
                request.unstructured_strategy().unwrap_or("default"),
                doc_id,
                true,
            ))
        }

        async fn fetch_document_content(
            &self,
            _doc_id: &str,
            _params: ContentQueryParams,
        ) -> Result<DocumentContent, SemanticCoreError> {
            self.outcome.clone()
        }

        async fn search_document(
            &self,
            _doc_id: &str,
            _params: SearchQueryParams,
        ) -> Result<SearchResults, SemanticCoreError> {
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn forwards_repository_results() {
        let service = SemanticCoreService::new(StubRepository {
            outcome: Ok(json!({ "text": "page one" })),
        });

        assert_eq!(service.probe_health().await, Ok("healthy".to_string()));
        let created = service
            .persist_document(CreateDocumentRequest::new("10k.pdf", "application/pdf", None))
            .await
            .expect("created");
        assert_eq!(created.doc_id(), "id-10k.pdf");
        let queued = service
            .dispatch_ingest_job("d1", IngestRequest::new(Some("fast".into()), None))
            .await
            .expect("queued");
        assert_eq!(queued.job_id(), "fast");
        assert_eq!(
            service
                .fetch_document_content("d1", ContentQueryParams::default())
                .await,
            Ok(json!({ "text": "page one" }))
        );
    }

    #[tokio::test]
    async fn forwards_repository_failures_unchanged() {
        let service = SemanticCoreService::new(StubRepository {
            outcome: Err(SemanticCoreError::Timeout { timeout_ms: 10 }),
        });

        let err = service
            .search_document("d1", SearchQueryParams::new("q", None, None))
            .await
            .expect_err("timeout");
        assert_eq!(err, SemanticCoreError::Timeout { timeout_ms: 10 });
    }
}
