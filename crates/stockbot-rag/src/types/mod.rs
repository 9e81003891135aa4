//! Core types for documents, queries, and responses

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, DocumentSource, FileType};
pub use query::{QueryRequest, UploadedFile};
pub use response::{AgentResult, QueryResponse, SkippedFile, ToolCallTrace, UploadResponse};
