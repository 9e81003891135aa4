//! Document ingestion: loading, chunking, and storage in the vector index

mod chunker;
mod loader;
mod pipeline;

pub use chunker::TextChunker;
pub use loader::DocumentLoader;
pub use pipeline::{DataIngestion, IngestionReport};
