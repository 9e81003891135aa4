//! Agent graph: a bounded loop between the chat model and the tools

use std::sync::Arc;

use crate::config::{AppConfig, Secrets};
use crate::error::{Error, Result};
use crate::providers::{ChatMessage, ChatModel, GroqChat};
use crate::tools::ToolRegistry;
use crate::types::{AgentResult, ToolCallTrace};

use super::prompt::system_prompt_for;

/// Builds an [`AgentGraph`] for one request
pub struct GraphBuilder {
    config: AppConfig,
    secrets: Secrets,
    model: Option<Arc<dyn ChatModel>>,
    tools: Option<ToolRegistry>,
}

impl GraphBuilder {
    pub fn new(config: AppConfig, secrets: Secrets) -> Self {
        Self {
            config,
            secrets,
            model: None,
            tools: None,
        }
    }

    /// Use this chat model instead of Groq
    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Use these tools instead of the configured set
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Bind the model and tools
    ///
    /// Fails if no model was supplied and `GROQ_API_KEY` is unset.
    pub fn build(self) -> Result<AgentGraph> {
        let model = match self.model {
            Some(model) => model,
            None => {
                let key = self
                    .secrets
                    .groq_api_key
                    .as_deref()
                    .ok_or_else(|| Error::Config(format!("{} not configured", Secrets::GROQ)))?;
                Arc::new(GroqChat::new(&self.config.llm, key))
            }
        };

        let tools = match self.tools {
            Some(tools) => tools,
            None => ToolRegistry::from_config(&self.config, &self.secrets),
        };

        tracing::debug!(
            "Agent built with {}/{} and tools [{}]",
            model.name(),
            model.model(),
            tools.names().join(", ")
        );

        Ok(AgentGraph {
            system_prompt: system_prompt_for(&tools.names()),
            model,
            tools,
            max_steps: self.config.llm.max_steps.max(1),
        })
    }
}

/// A model bound to its tools
pub struct AgentGraph {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: String,
    max_steps: usize,
}

impl AgentGraph {
    /// Answer one question
    ///
    /// Each model turn either calls tools, whose results are appended to the
    /// conversation, or ends the run with its content as the answer. After
    /// `max_steps` turns the last assistant content is returned.
    pub async fn invoke(&self, question: &str) -> Result<AgentResult> {
        let specs = self.tools.specs();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(question),
        ];
        let mut result = AgentResult::default();

        for step in 0..self.max_steps {
            let reply = self.model.chat(&messages, &specs).await?;
            result.steps = step + 1;
            result.answer = reply.content.clone();

            if !reply.has_tool_calls() {
                return Ok(result);
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in calls {
                tracing::info!("Step {}: calling tool '{}'", step + 1, call.name);
                let output = self.tools.execute(&call.name, &call.arguments).await;
                messages.push(ChatMessage::tool(call.id.clone(), output.clone()));
                result.tool_calls.push(ToolCallTrace {
                    tool: call.name,
                    arguments: call.arguments,
                    output,
                });
            }
        }

        tracing::warn!(
            "Agent stopped after {} steps without a final answer",
            self.max_steps
        );
        Ok(result)
    }
}
