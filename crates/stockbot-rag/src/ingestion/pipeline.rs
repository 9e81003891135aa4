//! Ingestion pipeline orchestration

use std::sync::Arc;

use crate::config::{AppConfig, Secrets};
use crate::error::{Error, Result};
use crate::providers::{
    EmbeddingProvider, GoogleEmbedder, IndexSpec, PineconeClient, VectorRecord,
    VectorStoreProvider,
};
use crate::types::{Document, SkippedFile, UploadedFile};

use super::chunker::TextChunker;
use super::loader::DocumentLoader;

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    /// Documents produced by the loaders
    pub documents_loaded: usize,
    /// Files that produced no documents
    pub skipped: Vec<SkippedFile>,
    /// Ids of the stored chunks (empty if storing failed)
    pub ids: Vec<String>,
}

/// Load → chunk → ensure index → embed → upsert
pub struct DataIngestion {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    index: IndexSpec,
    namespace: String,
}

impl DataIngestion {
    /// Build a pipeline backed by Google embeddings and Pinecone
    ///
    /// Fails if `PINECONE_API_KEY` or `GOOGLE_API_KEY` is unset.
    pub fn new(config: &AppConfig, secrets: &Secrets) -> Result<Self> {
        let (pinecone_key, google_key) = secrets.rag_keys()?;

        let embedder = Arc::new(GoogleEmbedder::new(&config.embedding_model, google_key));
        let store = Arc::new(PineconeClient::new(&config.vector_db, pinecone_key));
        Ok(Self::with_providers(config, embedder, store))
    }

    /// Build a pipeline over explicit providers
    pub fn with_providers(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap),
            embedder,
            store,
            index: IndexSpec::from(&config.vector_db),
            namespace: config.vector_db.namespace.clone(),
        }
    }

    /// Load every file, skipping unsupported or unreadable ones
    pub async fn load_documents(&self, files: Vec<UploadedFile>) -> (Vec<Document>, Vec<SkippedFile>) {
        Self::load_with(files, DocumentLoader::load).await
    }

    async fn load_with(
        files: Vec<UploadedFile>,
        loader: fn(&UploadedFile) -> Result<Vec<Document>>,
    ) -> (Vec<Document>, Vec<SkippedFile>) {
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            let filename = file.filename.clone();
            let size = file.size();
            let loaded = tokio::task::spawn_blocking(move || loader(&file))
                .await
                .map_err(|e| Error::internal(format!("Loader task failed: {}", e)))
                .and_then(|result| result);

            match loaded {
                Ok(docs) => {
                    tracing::info!("Loaded {} ({} bytes): {} documents", filename, size, docs.len());
                    documents.extend(docs);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", filename, e);
                    skipped.push(SkippedFile {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (documents, skipped)
    }

    /// Chunk, embed, and upsert documents
    ///
    /// Returns the ids of the stored chunks, or an empty list if any step
    /// failed.
    pub async fn store_in_vector_db(&self, documents: &[Document]) -> Vec<String> {
        match self.try_store(documents).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!("Failed to store documents in '{}': {}", self.index.name, e);
                Vec::new()
            }
        }
    }

    async fn try_store(&self, documents: &[Document]) -> Result<Vec<String>> {
        let chunks = self.chunker.chunk_documents(documents);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        if !self.store.has_index(&self.index.name).await? {
            self.store.create_index(&self.index).await?;
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| VectorRecord {
                id: chunk.id.to_string(),
                values,
                metadata: chunk.to_vector_metadata(),
            })
            .collect();

        self.store
            .upsert(&self.index.name, &self.namespace, &records)
            .await?;

        tracing::info!(
            "Stored {} chunks from {} documents in '{}' via {}/{}",
            records.len(),
            documents.len(),
            self.index.name,
            self.embedder.name(),
            self.store.name()
        );

        Ok(records.into_iter().map(|r| r.id).collect())
    }

    /// Full ingestion of an upload batch
    ///
    /// Short-circuits before touching the vector index when no documents
    /// were loaded.
    pub async fn run_pipeline(&self, files: Vec<UploadedFile>) -> IngestionReport {
        let (documents, skipped) = self.load_documents(files).await;

        if documents.is_empty() {
            tracing::warn!("No valid documents found");
            return IngestionReport {
                documents_loaded: 0,
                skipped,
                ids: Vec::new(),
            };
        }

        let ids = self.store_in_vector_db(&documents).await;
        IngestionReport {
            documents_loaded: documents.len(),
            skipped,
            ids,
        }
    }
}
