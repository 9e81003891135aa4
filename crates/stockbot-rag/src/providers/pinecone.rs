//! Pinecone serverless vector index provider
//!
//! Index management goes through the control plane; reads and writes go to
//! the per-index host that the control plane reports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::providers::vector_store::{IndexSpec, VectorMatch, VectorRecord, VectorStoreProvider};

/// REST API version sent with every request
const API_VERSION: &str = "2024-07";

/// Pinecone client
pub struct PineconeClient {
    client: reqwest::Client,
    api_key: String,
    control_plane_url: String,
    upsert_batch_size: usize,
    ready_poll_interval: Duration,
    ready_poll_attempts: u32,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl PineconeClient {
    /// Create a new client
    pub fn new(config: &VectorDbConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
            upsert_batch_size: config.upsert_batch_size.max(1),
            ready_poll_interval: Duration::from_secs(1),
            ready_poll_attempts: 60,
        }
    }

    /// Override how long `create_index` waits for the index to become ready
    pub fn with_ready_poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.ready_poll_interval = interval;
        self.ready_poll_attempts = attempts.max(1);
        self
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    /// Describe an index; `None` if it does not exist
    async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>> {
        let response = self
            .get(format!("{}/indexes/{}", self.control_plane_url, name))
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Pinecone describe request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Pinecone describe index failed ({}): {}",
                status, body
            )));
        }

        let description = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse index description: {}", e)))?;

        Ok(Some(description))
    }

    /// Resolve the data-plane base URL of an index
    async fn index_url(&self, name: &str) -> Result<String> {
        let description = self
            .describe_index(name)
            .await?
            .ok_or_else(|| Error::VectorDb(format!("Index '{}' does not exist", name)))?;

        let host = description.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            Ok(host.to_string())
        } else {
            Ok(format!("https://{}", host))
        }
    }

    async fn upsert_batch(&self, url: &str, namespace: &str, batch: &[VectorRecord]) -> Result<usize> {
        let response = self
            .post(format!("{}/vectors/upsert", url))
            .json(&UpsertRequest {
                vectors: batch,
                namespace,
            })
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Pinecone upsert request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Pinecone upsert failed ({}): {}",
                status, body
            )));
        }

        let upsert: UpsertResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse upsert response: {}", e)))?;

        Ok(upsert.upserted_count)
    }
}

#[async_trait]
impl VectorStoreProvider for PineconeClient {
    async fn has_index(&self, name: &str) -> Result<bool> {
        Ok(self.describe_index(name).await?.is_some())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        tracing::info!(
            "Creating Pinecone index '{}' ({} dims, {}, {}/{})",
            spec.name,
            spec.dimension,
            spec.metric,
            spec.cloud,
            spec.region
        );

        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": {
                "serverless": {
                    "cloud": spec.cloud,
                    "region": spec.region,
                }
            }
        });

        let response = self
            .post(format!("{}/indexes", self.control_plane_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Pinecone create request failed: {}", e)))?;

        // 409: created concurrently by another request
        if !response.status().is_success() && response.status() != reqwest::StatusCode::CONFLICT {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Pinecone create index failed ({}): {}",
                status, body
            )));
        }

        for _ in 0..self.ready_poll_attempts {
            if let Some(description) = self.describe_index(&spec.name).await? {
                if description.status.map(|s| s.ready).unwrap_or(false) {
                    return Ok(());
                }
            }
            tokio::time::sleep(self.ready_poll_interval).await;
        }

        Err(Error::VectorDb(format!(
            "Index '{}' was not ready after {} checks",
            spec.name, self.ready_poll_attempts
        )))
    }

    async fn upsert(&self, index: &str, namespace: &str, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let url = self.index_url(index).await?;
        let mut written = 0;
        for batch in records.chunks(self.upsert_batch_size) {
            written += self.upsert_batch(&url, namespace, batch).await?;
        }

        tracing::debug!("Upserted {} vectors into '{}'", written, index);
        Ok(written)
    }

    async fn query(
        &self,
        index: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorMatch>> {
        let url = self.index_url(index).await?;

        let response = self
            .post(format!("{}/query", url))
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
                namespace,
            })
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Pinecone query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Pinecone query failed ({}): {}",
                status, body
            )));
        }

        let query: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse query response: {}", e)))?;

        Ok(query
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, batch_size: usize) -> PineconeClient {
        let config = VectorDbConfig {
            control_plane_url: server.uri(),
            upsert_batch_size: batch_size,
            ..VectorDbConfig::default()
        };
        PineconeClient::new(&config, "pc-key").with_ready_poll(Duration::from_millis(1), 3)
    }

    async fn mount_describe(server: &MockServer, ready: bool) {
        let state = if ready { "Ready" } else { "Initializing" };
        Mock::given(method("GET"))
            .and(path("/indexes/stock-market-bot"))
            .and(header("Api-Key", "pc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "stock-market-bot",
                "dimension": 768,
                "metric": "cosine",
                "host": server.uri(),
                "status": {"ready": ready, "state": state}
            })))
            .mount(server)
            .await;
    }

    fn record(id: &str) -> VectorRecord {
        let mut metadata = Map::new();
        metadata.insert("text".to_string(), json!("Revenue rose"));
        VectorRecord {
            id: id.to_string(),
            values: vec![0.5; 4],
            metadata,
        }
    }

    #[tokio::test]
    async fn test_has_index() {
        let mock_server = MockServer::start().await;
        mount_describe(&mock_server, true).await;
        Mock::given(method("GET"))
            .and(path("/indexes/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server, 100);
        assert!(client.has_index("stock-market-bot").await.unwrap());
        assert!(!client.has_index("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_index_sends_serverless_spec() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .and(body_partial_json(json!({
                "name": "stock-market-bot",
                "dimension": 768,
                "metric": "cosine",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_describe(&mock_server, true).await;

        let spec = IndexSpec::from(&VectorDbConfig::default());
        client(&mock_server, 100).create_index(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_index_times_out_when_never_ready() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&mock_server)
            .await;
        mount_describe(&mock_server, false).await;

        let spec = IndexSpec::from(&VectorDbConfig::default());
        let err = client(&mock_server, 100).create_index(&spec).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
    }

    #[tokio::test]
    async fn test_upsert_is_batched() {
        let mock_server = MockServer::start().await;
        mount_describe(&mock_server, true).await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 2})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let records: Vec<VectorRecord> = (0..4).map(|i| record(&format!("id-{}", i))).collect();
        let written = client(&mock_server, 2)
            .upsert("stock-market-bot", "", &records)
            .await
            .unwrap();
        assert_eq!(written, 4);
    }

    #[tokio::test]
    async fn test_upsert_failure_is_error() {
        let mock_server = MockServer::start().await;
        mount_describe(&mock_server, true).await;
        Mock::given(method("POST"))
            .and(path("/vectors/upsert"))
            .respond_with(ResponseTemplate::new(400).set_body_string("dimension mismatch"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server, 100)
            .upsert("stock-market-bot", "", &[record("a")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[tokio::test]
    async fn test_query_returns_matches_with_metadata() {
        let mock_server = MockServer::start().await;
        mount_describe(&mock_server, true).await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({"topK": 3, "includeMetadata": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    {"id": "a", "score": 0.92, "metadata": {"text": "Revenue rose", "source": "q3.pdf"}},
                    {"id": "b", "score": 0.41}
                ],
                "namespace": ""
            })))
            .mount(&mock_server)
            .await;

        let matches = client(&mock_server, 100)
            .query("stock-market-bot", "", &[0.1, 0.2], 3)
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[0].metadata["source"], "q3.pdf");
        assert!(matches[1].metadata.is_empty());
    }
}
