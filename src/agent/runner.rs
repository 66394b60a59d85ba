// file: src/agent/runner.rs
// description: decide-act loop dispatching between search and risk tools
// reference: OpenAI function-calling agent pattern

use crate::agent::{risk, tools};
use crate::agent::tools::{RiskCheckArgs, SearchToolArgs};
use crate::error::{RagError, Result};
use crate::models::{ChatMessage, SearchHit, ToolCall};
use crate::rag::RagEngine;
use crate::utils::Validator;
use tracing::{debug, info, warn};

const AGENT_SYSTEM_PROMPT: &str = "\
You are a contract analysis agent for statement-of-work (SOW) documents.
Use the search_sow_documents tool to find relevant passages before answering.
Use the check_sow_risks tool to assess contractual risks in retrieved content.
Only state facts supported by tool output. If the documents do not contain an \
answer, say so.";

/// Final agent result with a trace of the tools it touched.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: usize,
    pub tools_used: Vec<String>,
}

pub struct ContractAgent<'a> {
    engine: &'a RagEngine,
}

impl<'a> ContractAgent<'a> {
    pub fn new(engine: &'a RagEngine) -> Self {
        Self { engine }
    }

    /// Run the decide-act loop: each step the model either calls tools or
    /// produces the final answer. Tool failures are reported back to the
    /// model as tool output so it can recover or answer without them.
    pub async fn run(&self, question: &str) -> Result<AgentOutcome> {
        Validator::validate_question_not_empty(question)?;

        let agent_config = &self.engine.config().agent;
        let tool_defs = tools::tool_definitions()?;
        let mut messages = vec![
            ChatMessage::system(AGENT_SYSTEM_PROMPT),
            ChatMessage::user(question),
        ];
        let mut tools_used = Vec::new();

        for step in 1..=agent_config.max_steps {
            let outcome = self
                .engine
                .openai_client()
                .chat(&messages, Some(&tool_defs), 0.0)
                .await?;

            if !outcome.wants_tools() {
                let answer = outcome.content.unwrap_or_default();
                if answer.is_empty() {
                    return Err(RagError::Agent(
                        "Model returned neither content nor tool calls".to_string(),
                    ));
                }
                info!("Agent answered after {} step(s)", step);
                return Ok(AgentOutcome {
                    answer,
                    steps: step,
                    tools_used,
                });
            }

            messages.push(ChatMessage::assistant(
                outcome.content.clone(),
                outcome.tool_calls.clone(),
            ));

            for call in &outcome.tool_calls {
                debug!(tool = %call.function.name, "executing tool call");
                tools_used.push(call.function.name.clone());
                let output = self.execute_tool(call).await;
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }

        // Step budget exhausted: force a final answer from the gathered
        // context by withholding the tools.
        warn!(
            "Agent hit the {}-step budget; requesting a final answer",
            agent_config.max_steps
        );
        let outcome = self
            .engine
            .openai_client()
            .chat(&messages, None, 0.0)
            .await?;

        Ok(AgentOutcome {
            answer: outcome.content.unwrap_or_else(|| {
                "The agent could not produce an answer within its step budget.".to_string()
            }),
            steps: agent_config.max_steps,
            tools_used,
        })
    }

    /// Execute one tool call. Errors become tool output strings rather than
    /// loop failures, matching how tool-calling models expect feedback.
    async fn execute_tool(&self, call: &ToolCall) -> String {
        match call.function.name.as_str() {
            tools::SEARCH_TOOL => match serde_json::from_str::<SearchToolArgs>(&call.function.arguments) {
                Ok(args) => self.run_search_tool(&args.query).await,
                Err(e) => format!("Invalid arguments for {}: {}", tools::SEARCH_TOOL, e),
            },
            tools::RISK_TOOL => match serde_json::from_str::<RiskCheckArgs>(&call.function.arguments) {
                Ok(args) => risk::render_findings(&risk::assess(&args.content)),
                Err(e) => format!("Invalid arguments for {}: {}", tools::RISK_TOOL, e),
            },
            other => format!("Unknown tool: {}", other),
        }
    }

    async fn run_search_tool(&self, query: &str) -> String {
        let agent_config = &self.engine.config().agent;
        match self
            .engine
            .search_documents(query, agent_config.search_top_k)
            .await
        {
            Ok(hits) if hits.is_empty() => "No documents found".to_string(),
            Ok(hits) => render_tool_hits(&hits, agent_config.snippet_chars),
            Err(e) => format!("Search failed: {}", e),
        }
    }
}

fn render_tool_hits(hits: &[SearchHit], snippet_chars: usize) -> String {
    hits.iter()
        .map(|hit| hit.format_snippet(snippet_chars))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, chunk: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            chunk: chunk.to_string(),
            score: 1.0,
            reranker_score: None,
        }
    }

    #[test]
    fn test_render_tool_hits_joins_snippets() {
        let hits = vec![
            hit("a.pdf", "First passage."),
            hit("b.pdf", "Second passage."),
        ];
        let rendered = render_tool_hits(&hits, 300);
        assert_eq!(rendered, "a.pdf: First passage.\n\nb.pdf: Second passage.");
    }

    #[test]
    fn test_render_tool_hits_truncates_long_chunks() {
        let long_chunk = "x".repeat(500);
        let hits = vec![hit("a.pdf", &long_chunk)];
        let rendered = render_tool_hits(&hits, 300);
        assert!(rendered.len() < 500);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn test_system_prompt_names_both_tools() {
        assert!(AGENT_SYSTEM_PROMPT.contains(tools::SEARCH_TOOL));
        assert!(AGENT_SYSTEM_PROMPT.contains(tools::RISK_TOOL));
    }
}
