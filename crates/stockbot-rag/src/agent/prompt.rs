//! System prompt for the trading assistant

/// Instructions sent as the first message of every conversation
pub const SYSTEM_PROMPT: &str = r#"You are a helpful stock market assistant for traders and investors.

You can use the following kinds of tools:
- retriever_tool: search the documents the user has uploaded (annual reports, research notes, filings). Use it first for any question that may be answered by those documents.
- tavily_search_results_json: search the web for recent news, prices and market events.
- polygon_financials: fetch reported financial statements for a ticker.

Guidelines:
1. Prefer facts from the uploaded documents and cite them as [Source: filename, Page X].
2. Use web search or financial data only when the documents do not answer the question or the question is about current events.
3. If no tool returns useful information, say so plainly instead of guessing.
4. Keep answers concise and mention figures with their period and currency.
5. Do not give personalised investment advice."#;

/// Prompt listing only the tools actually bound to the agent
pub fn system_prompt_for(tool_names: &[&str]) -> String {
    if tool_names.is_empty() {
        return format!("{}\n\nNo tools are available for this conversation.", SYSTEM_PROMPT);
    }
    format!("{}\n\nTools available now: {}.", SYSTEM_PROMPT, tool_names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_bound_tools() {
        let prompt = system_prompt_for(&["retriever_tool"]);
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("Tools available now: retriever_tool."));
        assert!(system_prompt_for(&[]).contains("No tools are available"));
    }
}
