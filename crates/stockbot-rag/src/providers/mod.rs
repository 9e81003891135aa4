//! Provider abstractions for embeddings, vector storage, and chat models
//!
//! Each hosted service sits behind an async trait so the ingestion pipeline,
//! the retriever and the agent can be exercised without network access.

pub mod embedding;
pub mod google;
pub mod groq;
pub mod llm;
pub mod pinecone;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use embedding::EmbeddingProvider;
pub use google::GoogleEmbedder;
pub use groq::GroqChat;
pub use llm::{ChatMessage, ChatModel, Role, ToolCall, ToolSpec};
pub use pinecone::PineconeClient;
pub use vector_store::{IndexSpec, VectorMatch, VectorRecord, VectorStoreProvider};

