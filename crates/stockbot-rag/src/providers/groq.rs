//! Groq chat model over the OpenAI-compatible chat completions API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::llm::{ChatMessage, ChatModel, Role, ToolCall, ToolSpec};

/// Groq chat completions client
pub struct GroqChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GroqChat {
    /// Create a new client from config and API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model_name.clone(),
            temperature: config.temperature,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let tool_calls = if message.tool_calls.is_empty() {
            None
        } else {
            Some(
                message
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        kind: function_type(),
                        function: WireFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect(),
            )
        };

        // Assistant turns that only call tools carry no content
        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        };

        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<WireMessage> for ChatMessage {
    fn from(message: WireMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.unwrap_or_default(),
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
            tool_call_id: message.tool_call_id,
        }
    }
}

#[async_trait]
impl ChatModel for GroqChat {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        let request = CompletionRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools
                .iter()
                .map(|spec| WireTool {
                    kind: "function",
                    function: spec,
                })
                .collect(),
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Groq request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Groq chat completion failed ({}): {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse Groq response: {}", e)))?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| ChatMessage::from(choice.message))
            .ok_or_else(|| Error::Llm("No choices in Groq response".to_string()))?;

        tracing::debug!(
            "Groq replied with {} chars and {} tool calls",
            message.content.len(),
            message.tool_calls.len()
        );

        Ok(message)
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(server: &MockServer) -> GroqChat {
        let config = LlmConfig {
            base_url: server.uri(),
            ..LlmConfig::default()
        };
        GroqChat::new(&config, "gsk-test")
    }

    fn lookup_tool() -> ToolSpec {
        ToolSpec {
            name: "retriever".to_string(),
            description: "Search uploaded documents".to_string(),
            parameters: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }
    }

    #[tokio::test]
    async fn test_parses_tool_calls() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "retriever"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "retriever", "arguments": "{\"query\":\"EPS\"}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&mock_server)
            .await;

        let reply = chat(&mock_server)
            .chat(&[ChatMessage::user("What was EPS?")], &[lookup_tool()])
            .await
            .unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.is_empty());
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name, "retriever");
        assert_eq!(reply.tool_calls[0].arguments, "{\"query\":\"EPS\"}");
    }

    #[tokio::test]
    async fn test_sends_tool_results_back() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "What was EPS?"},
                    {"role": "assistant", "tool_calls": [{"id": "call_1", "type": "function"}]},
                    {"role": "tool", "tool_call_id": "call_1", "content": "EPS was 4.2"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "EPS was 4.2."}}]
            })))
            .mount(&mock_server)
            .await;

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "retriever".to_string(),
            arguments: "{}".to_string(),
        };
        let messages = vec![
            ChatMessage::user("What was EPS?"),
            ChatMessage::assistant_with_tools("", vec![call]),
            ChatMessage::tool("call_1", "EPS was 4.2"),
        ];

        let reply = chat(&mock_server).chat(&messages, &[]).await.unwrap();
        assert_eq!(reply.content, "EPS was 4.2.");
        assert!(!reply.has_tool_calls());
    }

    #[tokio::test]
    async fn test_error_status_is_llm_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let err = chat(&mock_server)
            .chat(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
        assert!(err.to_string().contains("rate limited"));
    }
}
