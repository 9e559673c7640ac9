//! Composition root for the semantic core proxy.
//!
//! Builds client -> repository -> service -> HTTP adapter once at startup and mounts the adapter's
//! routes on a caller-supplied router, optionally under a path prefix.

use crate::config::Config;
use crate::semantic_core::client::{DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT_MS, SemanticCoreClient};
use crate::semantic_core::error::SemanticCoreError;
use crate::semantic_core::http::create_router;
use crate::semantic_core::repository::SemanticCoreRepository;
use crate::semantic_core::service::{SemanticCoreApi, SemanticCoreService};
use axum::Router;
use std::sync::Arc;

/// Service graph produced by [`SemanticCoreModule::create`].
pub type DefaultSemanticCoreService = SemanticCoreService<SemanticCoreRepository<SemanticCoreClient>>;

/// Settings needed to wire the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticCoreModuleConfig {
    /// Upstream base URL.
    pub base_url: String,
    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
    /// Mount point for the routes; `None` or empty mounts at the router root.
    pub route_prefix: Option<String>,
    /// Cap on buffered upstream response bodies.
    pub max_body_bytes: usize,
}

impl SemanticCoreModuleConfig {
    /// Settings for `base_url` with default timeout and body cap, mounted at the root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            route_prefix: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Mount routes under `prefix`.
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(prefix.into());
        self
    }
}

impl From<&Config> for SemanticCoreModuleConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.semantic_core_base_url.clone(),
            timeout_ms: config.semantic_core_timeout_ms,
            route_prefix: config.semantic_core_route_prefix.clone(),
            max_body_bytes: config.semantic_core_max_body_bytes,
        }
    }
}

/// Wired semantic core service plus its mount point.
pub struct SemanticCoreModule<S = DefaultSemanticCoreService> {
    service: Arc<S>,
    route_prefix: Option<String>,
}

impl SemanticCoreModule {
    /// Build the full object graph from configuration.
    pub fn create(config: &SemanticCoreModuleConfig) -> Result<Self, SemanticCoreError> {
        let client = SemanticCoreClient::new(&config.base_url, config.timeout_ms)?
            .with_max_body_bytes(config.max_body_bytes);
        let repository = SemanticCoreRepository::new(client);
        let service = SemanticCoreService::new(repository);
        tracing::info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            route_prefix = ?config.route_prefix,
            "Semantic core module created"
        );

        Ok(Self::from_service(
            Arc::new(service),
            config.route_prefix.clone(),
        ))
    }
}

impl<S> SemanticCoreModule<S>
where
    S: SemanticCoreApi + 'static,
{
    /// Wrap an already-built service.
    pub fn from_service(service: Arc<S>, route_prefix: Option<String>) -> Self {
        Self {
            service,
            route_prefix: normalize_prefix(route_prefix.as_deref()),
        }
    }

    /// Shared handle to the service.
    pub fn service(&self) -> Arc<S> {
        Arc::clone(&self.service)
    }

    /// Normalized mount point, `None` for the router root.
    pub fn route_prefix(&self) -> Option<&str> {
        self.route_prefix.as_deref()
    }

    /// Mount the document routes on `app`.
    ///
    /// Without a prefix the routes are merged into `app` directly; with one they live on their own
    /// router nested at the prefix, so they cannot collide with unrelated routes on `app`.
    pub fn register(&self, app: Router) -> Router {
        let routes = create_router(self.service());
        match self.route_prefix.as_deref() {
            None => app.merge(routes),
            Some(prefix) => {
                tracing::debug!(prefix, "Mounting semantic core routes");
                app.nest(prefix, routes)
            }
        }
    }
}

fn normalize_prefix(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}
