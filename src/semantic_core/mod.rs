//! Semantic core integration: outbound client, seams, HTTP adapter and composition root.

pub mod client;
pub mod dto;
pub mod error;
pub mod http;
pub mod module;
pub mod repository;
pub mod service;

pub use client::{SemanticCoreClient, SemanticCoreGateway, UpstreamPayload};
pub use dto::{
    ContentQueryParams, CreateDocumentRequest, CreateDocumentRequestJson, CreateDocumentResponse,
    CreateDocumentResponseJson, DocumentContent, IngestRequest, IngestRequestJson, IngestResponse,
    IngestResponseJson, SearchQueryParams, SearchResults,
};
pub use error::SemanticCoreError;
pub use module::{DefaultSemanticCoreService, SemanticCoreModule, SemanticCoreModuleConfig};
pub use repository::{DocumentRepository, SemanticCoreRepository};
pub use service::{SemanticCoreApi, SemanticCoreService};
