//! Configuration for the chatbot backend
//!
//! Tunables live in an optional TOML file; every section falls back to its
//! defaults so a partial file (or no file at all) is valid. API keys never
//! live in the file: they are read from the environment into [`Secrets`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "STOCKBOT_CONFIG";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Embedding model configuration
    pub embedding_model: EmbeddingConfig,
    /// Chat model configuration
    pub llm: LlmConfig,
    /// Retriever configuration
    pub retriever: RetrieverConfig,
    /// External tool configuration
    pub tools: ToolsConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` if given, else from `$STOCKBOT_CONFIG`, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Directory holding the static chat UI
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_size: 100 * 1024 * 1024, // 100MB
            static_dir: "static".to_string(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Pinecone index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Index name
    pub index_name: String,
    /// Vector dimensionality used when the index is created
    pub dimension: usize,
    /// Distance metric used when the index is created
    pub metric: String,
    /// Serverless cloud provider
    pub cloud: String,
    /// Serverless region
    pub region: String,
    /// Namespace within the index (empty = default namespace)
    pub namespace: String,
    /// Control-plane base URL
    pub control_plane_url: String,
    /// Vectors per upsert request
    pub upsert_batch_size: usize,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            index_name: "stock-market-bot".to_string(),
            dimension: 768,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            namespace: String::new(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            upsert_batch_size: 100,
        }
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name (Google Generative Language API)
    pub model_name: String,
    /// API base URL
    pub base_url: String,
    /// Texts per batch request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "models/text-embedding-004".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            batch_size: 100,
        }
    }
}

/// Chat model (Groq) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Model name
    pub model_name: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on model turns per query
    pub max_steps: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model_name: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
            max_steps: 8,
        }
    }
}

/// Retriever configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Maximum number of matches returned
    pub top_k: usize,
    /// Minimum relevance score (0.0 to 1.0)
    pub score_threshold: f32,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            score_threshold: 0.5,
        }
    }
}

/// External tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tavily web search
    pub tavily: TavilyConfig,
    /// Polygon financials
    pub polygon: PolygonConfig,
}

/// Tavily search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TavilyConfig {
    /// API base URL
    pub base_url: String,
    /// Maximum results per search
    pub max_results: usize,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
        }
    }
}

/// Polygon financials configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonConfig {
    /// API base URL
    pub base_url: String,
    /// Number of financial statements fetched per ticker
    pub limit: usize,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.polygon.io".to_string(),
            limit: 4,
        }
    }
}

/// API keys read from the environment
#[derive(Clone, Default)]
pub struct Secrets {
    pub pinecone_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("pinecone_api_key", &mask(&self.pinecone_api_key))
            .field("google_api_key", &mask(&self.google_api_key))
            .field("groq_api_key", &mask(&self.groq_api_key))
            .field("tavily_api_key", &mask(&self.tavily_api_key))
            .field("polygon_api_key", &mask(&self.polygon_api_key))
            .finish()
    }
}

impl Secrets {
    pub const PINECONE: &'static str = "PINECONE_API_KEY";
    pub const GOOGLE: &'static str = "GOOGLE_API_KEY";
    pub const GROQ: &'static str = "GROQ_API_KEY";
    pub const TAVILY: &'static str = "TAVILY_API_KEY";
    pub const POLYGON: &'static str = "POLYGON_API_KEY";

    /// Read keys from the process environment, treating blank values as unset
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read keys through an arbitrary lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            pinecone_api_key: get(Self::PINECONE),
            google_api_key: get(Self::GOOGLE),
            groq_api_key: get(Self::GROQ),
            tavily_api_key: get(Self::TAVILY),
            polygon_api_key: get(Self::POLYGON),
        }
    }

    /// Names of the variables that are not set
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (Self::PINECONE, &self.pinecone_api_key),
            (Self::GOOGLE, &self.google_api_key),
            (Self::GROQ, &self.groq_api_key),
            (Self::TAVILY, &self.tavily_api_key),
            (Self::POLYGON, &self.polygon_api_key),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Fail with a config error if any of `required` is unset
    pub fn require(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = self
            .missing()
            .into_iter()
            .filter(|name| required.contains(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Missing environment variables: {:?}",
                missing
            )))
        }
    }

    /// Pinecone and Google keys, both needed for any vector index work
    pub fn rag_keys(&self) -> Result<(&str, &str)> {
        self.require(&[Self::PINECONE, Self::GOOGLE])?;
        match (self.pinecone_api_key.as_deref(), self.google_api_key.as_deref()) {
            (Some(pinecone), Some(google)) => Ok((pinecone, google)),
            _ => Err(Error::Config("Pinecone and Google API keys are required".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.vector_db.dimension, 768);
        assert_eq!(config.vector_db.metric, "cosine");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [vector_db]
            index_name = "nifty-docs"

            [retriever]
            top_k = 5
            score_threshold = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.vector_db.index_name, "nifty-docs");
        assert_eq!(config.vector_db.dimension, 768);
        assert_eq!(config.retriever.top_k, 5);
        assert!((config.retriever.score_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.chunking.chunk_size, 1000);
    }

    #[test]
    fn test_example_config_parses() {
        let config =
            AppConfig::from_toml_str(include_str!("../../../stockbot.example.toml")).unwrap();
        assert_eq!(config.vector_db.index_name, "stock-market-bot");
        assert_eq!(config.tools.polygon.limit, 4);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[retriever]\ntop_k = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_secrets_blank_values_are_unset() {
        let secrets = Secrets::from_lookup(|name| match name {
            "PINECONE_API_KEY" => Some("pc-key".to_string()),
            "GOOGLE_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(secrets.pinecone_api_key.as_deref(), Some("pc-key"));
        assert!(secrets.google_api_key.is_none());
        assert!(secrets.require(&[Secrets::PINECONE]).is_ok());

        let err = secrets
            .require(&[Secrets::PINECONE, Secrets::GOOGLE])
            .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
        assert!(!err.to_string().contains("PINECONE_API_KEY"));
    }

    #[test]
    fn test_secrets_debug_masks_values() {
        let secrets = Secrets::from_lookup(|_| Some("super-secret".to_string()));
        let rendered = format!("{:?}", secrets);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<set>"));
    }
}
