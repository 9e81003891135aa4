//! Tavily web search tool

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TavilyConfig;
use crate::error::{Error, Result};

use super::{string_arg, Tool};

/// Raw page content is cut to this many characters per result
const RAW_CONTENT_MAX_CHARS: usize = 2000;

/// Searches the web through Tavily
pub struct TavilySearchTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl TavilySearchTool {
    pub fn new(config: &TavilyConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_raw_content: bool,
    include_answer: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize, Serialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_content: Option<String>,
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search_results_json"
    }

    fn description(&self) -> &str {
        "Search the web for current news, prices and market events. Input should be a search query."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Value) -> Result<String> {
        let query = string_arg(self.name(), args, "query")?;

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key: &self.api_key,
                query: &query,
                max_results: self.max_results,
                search_depth: "advanced",
                include_raw_content: true,
                include_answer: true,
            })
            .send()
            .await
            .map_err(|e| Error::tool(self.name(), format!("Tavily request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::tool(
                self.name(),
                format!("Tavily search failed ({}): {}", status, body),
            ));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::tool(self.name(), format!("Failed to parse Tavily response: {}", e)))?;

        tracing::debug!("Tavily returned {} results for '{}'", search.results.len(), query);

        let results: Vec<SearchHit> = search
            .results
            .into_iter()
            .map(|mut hit| {
                hit.raw_content = hit
                    .raw_content
                    .map(|raw| truncate_chars(&raw, RAW_CONTENT_MAX_CHARS));
                hit
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json!({
            "answer": search.answer,
            "results": results,
        }))?)
    }
}
