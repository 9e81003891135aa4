//! Document retrieval exposed as a tool

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{AppConfig, Secrets};
use crate::error::Result;
use crate::retrieval::Retriever;

use super::{string_arg, Tool};

/// Returned instead of results when no Pinecone key is configured
pub const RAG_DISABLED_MESSAGE: &str = "Pinecone API key not configured. RAG features disabled.";

enum Backend {
    Disabled,
    Unavailable(String),
    Ready(Retriever),
}

/// Retrieves relevant chunks from the uploaded documents
///
/// Never fails: a missing key yields a diagnostic and any other error is
/// rendered into the output.
pub struct RetrieverTool {
    backend: Backend,
}

impl RetrieverTool {
    pub fn from_config(config: &AppConfig, secrets: &Secrets) -> Self {
        let backend = if secrets.pinecone_api_key.is_none() {
            tracing::warn!("{} not set, RAG features disabled", Secrets::PINECONE);
            Backend::Disabled
        } else {
            match Retriever::new(config, secrets) {
                Ok(retriever) => Backend::Ready(retriever),
                Err(e) => Backend::Unavailable(e.to_string()),
            }
        };
        Self { backend }
    }

    pub fn new(retriever: Retriever) -> Self {
        Self {
            backend: Backend::Ready(retriever),
        }
    }

    async fn search(&self, args: &Value) -> Result<String> {
        let Backend::Ready(retriever) = &self.backend else {
            return Ok(RAG_DISABLED_MESSAGE.to_string());
        };
        let question = string_arg(self.name(), args, "question")?;
        let results = retriever.retrieve(&question).await?;
        Ok(Retriever::format_results(&results))
    }
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        "retriever_tool"
    }

    fn description(&self) -> &str {
        "Retrieve relevant passages from the uploaded stock-market documents (PDF/DOCX) stored in the vector database"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question to search the documents for"
                }
            },
            "required": ["question"]
        })
    }

    async fn call(&self, args: &Value) -> Result<String> {
        if let Backend::Unavailable(message) = &self.backend {
            return Ok(format!("Error in RAG tool: {}", message));
        }

        match self.search(args).await {
            Ok(output) => Ok(output),
            Err(e) => Ok(format!("Error in RAG tool: {}", e)),
        }
    }
}
