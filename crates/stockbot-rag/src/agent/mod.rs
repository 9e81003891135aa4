//! Tool-calling agent that answers questions about the uploaded documents and markets

mod prompt;
mod workflow;

pub use prompt::{system_prompt_for, SYSTEM_PROMPT};
pub use workflow::{AgentGraph, GraphBuilder};
