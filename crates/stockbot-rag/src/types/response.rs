//! Response types for uploads and queries

use serde::{Deserialize, Serialize};

/// Response from `/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable status
    pub message: String,
    /// Number of documents (PDF pages or DOCX files) loaded
    pub documents_loaded: usize,
    /// Number of chunks written to the vector index
    pub chunks_stored: usize,
    /// Files that produced no documents
    pub skipped: Vec<SkippedFile>,
}

/// A file skipped during loading, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Response from `/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The agent's final answer
    pub answer: String,
}

/// One tool invocation made by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallTrace {
    /// Tool name as requested by the model
    pub tool: String,
    /// Raw JSON arguments from the model
    pub arguments: String,
    /// Text returned to the model
    pub output: String,
}

/// Outcome of a single agent run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResult {
    /// Content of the last message produced
    pub answer: String,
    /// Tool calls in the order they were made
    pub tool_calls: Vec<ToolCallTrace>,
    /// Number of model turns taken
    pub steps: usize,
}
