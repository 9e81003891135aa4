//! stockbot-rag: stock-market document chatbot
//!
//! Uploaded PDF and DOCX files are split into overlapping chunks, embedded with
//! Google's embedding model and stored in a Pinecone index. Questions are
//! answered by a tool-calling agent (Groq) that can search those documents,
//! the web (Tavily) and company financials (Polygon).

pub mod agent;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod tools;
pub mod types;

pub use config::{AppConfig, Secrets};
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, DocumentSource, FileType},
    query::{QueryRequest, UploadedFile},
    response::{AgentResult, QueryResponse, UploadResponse},
};
