//! Polygon company financials tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::PolygonConfig;
use crate::error::{Error, Result};

use super::{string_arg, Tool};

/// Fetches reported financial statements for a ticker from Polygon
pub struct PolygonFinancialsTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limit: usize,
}

impl PolygonFinancialsTool {
    pub fn new(config: &PolygonConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        }
    }
}

#[derive(Deserialize)]
struct FinancialsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
}

#[async_trait]
impl Tool for PolygonFinancialsTool {
    fn name(&self) -> &str {
        "polygon_financials"
    }

    fn description(&self) -> &str {
        "Get fundamental financial data (income statement, balance sheet, cash flow) for a company. Input should be a stock ticker symbol such as AAPL."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Stock ticker symbol"
                }
            },
            "required": ["ticker"]
        })
    }

    async fn call(&self, args: &Value) -> Result<String> {
        let ticker = string_arg(self.name(), args, "ticker")?.to_uppercase();
        let limit = self.limit.to_string();

        let response = self
            .client
            .get(format!("{}/vX/reference/financials", self.base_url))
            .query(&[
                ("ticker", ticker.as_str()),
                ("limit", limit.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::tool(self.name(), format!("Polygon request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::tool(
                self.name(),
                format!("Polygon financials failed ({}): {}", status, body),
            ));
        }

        let financials: FinancialsResponse = response.json().await.map_err(|e| {
            Error::tool(self.name(), format!("Failed to parse Polygon response: {}", e))
        })?;

        tracing::debug!(
            "Polygon returned {} statements for {} (status {:?})",
            financials.results.len(),
            ticker,
            financials.status
        );

        if financials.results.is_empty() {
            return Ok(format!("No financial data found for {}", ticker));
        }

        Ok(serde_json::to_string(&financials.results)?)
    }
}
