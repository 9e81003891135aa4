//! Similarity search over the vector index

mod search;

pub use search::{relevance_score, Retriever, ScoredChunk};
