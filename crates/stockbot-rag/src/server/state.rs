//! Application state for the HTTP server

use std::sync::Arc;

use crate::agent::{AgentGraph, GraphBuilder};
use crate::config::{AppConfig, Secrets};
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::providers::{ChatModel, EmbeddingProvider, VectorStoreProvider};

/// Providers used instead of the hosted services
#[derive(Default, Clone)]
pub struct ProviderOverrides {
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub vector_store: Option<Arc<dyn VectorStoreProvider>>,
    pub chat_model: Option<Arc<dyn ChatModel>>,
}

/// Shared application state
///
/// Immutable after startup; pipelines and agents are built per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    secrets: Secrets,
    overrides: ProviderOverrides,
}

impl AppState {
    pub fn new(config: AppConfig, secrets: Secrets) -> Self {
        Self::with_overrides(config, secrets, ProviderOverrides::default())
    }

    pub fn with_overrides(config: AppConfig, secrets: Secrets, overrides: ProviderOverrides) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                secrets,
                overrides,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Build an ingestion pipeline for one upload
    pub fn ingestion(&self) -> Result<DataIngestion> {
        let overrides = &self.inner.overrides;
        match (&overrides.embedder, &overrides.vector_store) {
            (Some(embedder), Some(store)) => Ok(DataIngestion::with_providers(
                &self.inner.config,
                Arc::clone(embedder),
                Arc::clone(store),
            )),
            _ => DataIngestion::new(&self.inner.config, &self.inner.secrets),
        }
    }

    /// Build an agent for one query
    pub fn agent(&self) -> Result<AgentGraph> {
        let mut builder = GraphBuilder::new(self.inner.config.clone(), self.inner.secrets.clone());
        if let Some(model) = &self.inner.overrides.chat_model {
            builder = builder.with_model(Arc::clone(model));
        }
        builder.build()
    }
}
