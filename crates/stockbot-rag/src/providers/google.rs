//! Google Generative Language embedding provider (text-embedding-004)
//!
//! Queries and documents are embedded with different task types so the
//! model can optimise each side of the retrieval pair.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

/// Google embedding provider
pub struct GoogleEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Fully qualified model name, e.g. `models/text-embedding-004`
    model: String,
    batch_size: usize,
}

impl GoogleEmbedder {
    /// Create a new embedder from config and API key
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>) -> Self {
        let model = if config.model_name.starts_with("models/") {
            config.model_name.clone()
        } else {
            format!("models/{}", config.model_name)
        };

        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model,
            batch_size: config.batch_size.max(1),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, self.model, method)
    }

    fn request(&self, text: &str, task_type: &'static str) -> EmbedRequest {
        EmbedRequest {
            model: self.model.clone(),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GoogleEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.endpoint("embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request(text, "RETRIEVAL_QUERY"))
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Google embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Google embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        Ok(embed_response.embedding.values)
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|t| self.request(t, "RETRIEVAL_DOCUMENT"))
                    .collect(),
            };

            let response = self
                .client
                .post(self.endpoint("batchEmbedContents"))
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Embedding(format!("Google batch request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Embedding(format!(
                    "Google batch embedding failed ({}): {}",
                    status, body
                )));
            }

            let batch_response: BatchEmbedResponse = response.json().await.map_err(|e| {
                Error::Embedding(format!("Failed to parse batch embedding response: {}", e))
            })?;

            if batch_response.embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    batch_response.embeddings.len()
                )));
            }

            all_embeddings.extend(batch_response.embeddings.into_iter().map(|e| e.values));
        }

        tracing::debug!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(all_embeddings)
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer, batch_size: usize) -> GoogleEmbedder {
        let config = EmbeddingConfig {
            model_name: "text-embedding-004".to_string(),
            base_url: server.uri(),
            batch_size,
        };
        GoogleEmbedder::new(&config, "test-key")
    }

    #[tokio::test]
    async fn test_embed_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({"taskType": "RETRIEVAL_QUERY"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": {"values": [0.1, 0.2, 0.3]}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let vector = embedder(&mock_server, 100).embed_query("What is EPS?").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_documents_in_batches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:batchEmbedContents"))
            .and(body_partial_json(json!({"requests": [{"taskType": "RETRIEVAL_DOCUMENT"}]})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embeddings": [{"values": [1.0]}]})),
            )
            .expect(3)
            .mount(&mock_server)
            .await;

        let texts: Vec<String> = (0..3).map(|i| format!("chunk {}", i)).collect();
        let vectors = embedder(&mock_server, 1).embed_documents(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
    }

    #[tokio::test]
    async fn test_error_status_is_embedding_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let err = embedder(&mock_server, 100).embed_query("x").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let vectors = embedder(&mock_server, 100).embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
