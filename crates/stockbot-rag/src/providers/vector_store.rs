//! Vector store provider trait for the remote vector index

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::VectorDbConfig;
use crate::error::Result;

/// Parameters used when creating an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl From<&VectorDbConfig> for IndexSpec {
    fn from(config: &VectorDbConfig) -> Self {
        Self {
            name: config.index_name.clone(),
            dimension: config.dimension,
            metric: config.metric.clone(),
            cloud: config.cloud.clone(),
            region: config.region.clone(),
        }
    }
}

/// A vector written to the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// A raw match returned by the index
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    /// Raw score as reported by the index (cosine similarity for cosine indexes)
    pub score: f32,
    pub metadata: Map<String, Value>,
}

/// Trait for the remote vector index service
///
/// Implementations:
/// - `PineconeClient`: Pinecone serverless indexes
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Check whether an index exists
    async fn has_index(&self, name: &str) -> Result<bool>;

    /// Create an index and wait until it accepts writes
    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    /// Upsert records, returning how many were written
    async fn upsert(&self, index: &str, namespace: &str, records: &[VectorRecord]) -> Result<usize>;

    /// Nearest-neighbour query returning up to `top_k` matches with metadata
    async fn query(
        &self,
        index: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorMatch>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
