//! Retriever: embed the question, query the index, threshold by relevance

use std::sync::Arc;

use crate::config::{AppConfig, Secrets};
use crate::error::Result;
use crate::providers::{EmbeddingProvider, GoogleEmbedder, PineconeClient, VectorStoreProvider};
use crate::types::Chunk;

/// A retrieved chunk with its relevance
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Relevance score (0.0-1.0, higher is better)
    pub score: f32,
}

/// Map a raw cosine similarity in [-1, 1] to a relevance score in [0, 1]
pub fn relevance_score(cosine: f32) -> f32 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Similarity search with a score threshold
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    index_name: String,
    namespace: String,
    top_k: usize,
    score_threshold: f32,
}

impl Retriever {
    /// Build a retriever backed by Google embeddings and Pinecone
    pub fn new(config: &AppConfig, secrets: &Secrets) -> Result<Self> {
        let (pinecone_key, google_key) = secrets.rag_keys()?;

        Ok(Self::with_providers(
            config,
            Arc::new(GoogleEmbedder::new(&config.embedding_model, google_key)),
            Arc::new(PineconeClient::new(&config.vector_db, pinecone_key)),
        ))
    }

    /// Build a retriever over explicit providers
    pub fn with_providers(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            embedder,
            store,
            index_name: config.vector_db.index_name.clone(),
            namespace: config.vector_db.namespace.clone(),
            top_k: config.retriever.top_k,
            score_threshold: config.retriever.score_threshold,
        }
    }

    /// Retrieve at most `top_k` chunks whose relevance meets the threshold,
    /// best first
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed_query(question).await?;

        let matches = self
            .store
            .query(&self.index_name, &self.namespace, &query_embedding, self.top_k)
            .await?;

        let mut results: Vec<ScoredChunk> = matches
            .into_iter()
            .filter_map(|m| {
                let score = relevance_score(m.score);
                if score < self.score_threshold {
                    return None;
                }
                match Chunk::from_vector_metadata(&m.id, &m.metadata) {
                    Some(chunk) => Some(ScoredChunk { chunk, score }),
                    None => {
                        tracing::debug!("Match {} has no text metadata, skipping", m.id);
                        None
                    }
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(self.top_k);

        tracing::debug!(
            "Retrieved {} chunks above {:.2} for question ({} chars)",
            results.len(),
            self.score_threshold,
            question.len()
        );

        Ok(results)
    }

    /// Render retrieved chunks as context text for the model
    pub fn format_results(results: &[ScoredChunk]) -> String {
        if results.is_empty() {
            return "No relevant documents found.".to_string();
        }

        let mut out = String::new();
        for (i, result) in results.iter().enumerate() {
            out.push_str(&format!(
                "[{}] Source: {} (relevance {:.2})\n{}\n\n",
                i + 1,
                result.chunk.source.format_citation(),
                result.score,
                result.chunk.content.trim()
            ));
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::testing::{FakeEmbedder, InMemoryVectorStore};
    use crate::providers::VectorMatch;
    use crate::types::DocumentSource;
    use serde_json::{json, Map, Value};

    fn matched(id: &str, score: f32, text: Option<&str>) -> VectorMatch {
        let mut metadata: Map<String, Value> = Map::new();
        if let Some(text) = text {
            metadata.insert("text".to_string(), json!(text));
        }
        metadata.insert("source".to_string(), json!("annual.pdf"));
        metadata.insert("file_type".to_string(), json!("pdf"));
        metadata.insert("page".to_string(), json!(2));
        VectorMatch {
            id: id.to_string(),
            score,
            metadata,
        }
    }

    fn retriever(matches: Vec<VectorMatch>) -> Retriever {
        Retriever::with_providers(
            &AppConfig::default(),
            Arc::new(FakeEmbedder::default()),
            Arc::new(InMemoryVectorStore::with_matches(matches)),
        )
    }

    #[test]
    fn test_relevance_score_normalisation() {
        assert_eq!(relevance_score(1.0), 1.0);
        assert_eq!(relevance_score(0.0), 0.5);
        assert_eq!(relevance_score(-1.0), 0.0);
        assert_eq!(relevance_score(1.5), 1.0);
    }

    #[tokio::test]
    async fn test_below_threshold_yields_nothing() {
        // relevance (-0.2 + 1) / 2 = 0.4 < 0.5
        let results = retriever(vec![matched("a", -0.2, Some("weak"))])
            .retrieve("dividend policy")
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_and_ordering() {
        let results = retriever(vec![
            matched("a", 0.1, Some("moderate")),
            matched("b", 0.9, Some("strong")),
            matched("c", -0.5, Some("weak")),
        ])
        .retrieve("dividend policy")
        .await
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "strong");
        assert!((results[0].score - 0.95).abs() < 1e-6);
        assert_eq!(results[1].chunk.content, "moderate");
        assert_eq!(results[0].chunk.source, DocumentSource::pdf_page("annual.pdf", 2));
    }

    #[tokio::test]
    async fn test_matches_without_text_are_dropped() {
        let results = retriever(vec![matched("a", 0.9, None)])
            .retrieve("q")
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let retriever = Retriever::with_providers(
            &AppConfig::default(),
            Arc::new(FakeEmbedder::default()),
            Arc::new(InMemoryVectorStore {
                fail_query: true,
                ..InMemoryVectorStore::default()
            }),
        );
        let err = retriever.retrieve("q").await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
    }

    #[test]
    fn test_format_results() {
        assert_eq!(Retriever::format_results(&[]), "No relevant documents found.");

        let chunk = Chunk::new(
            "Net profit rose 8%.".to_string(),
            DocumentSource::pdf_page("annual.pdf", 2),
            0,
            0,
        );
        let text = Retriever::format_results(&[ScoredChunk { chunk, score: 0.91 }]);
        assert_eq!(text, "[1] Source: annual.pdf, Page 3 (relevance 0.91)\nNet profit rose 8%.");
    }
}
