// file: src/rag/answer.rs
// description: hybrid retrieval and grounded answer generation
// reference: retrieve-then-read RAG pattern over Azure AI Search

use crate::config::Config;
use crate::error::Result;
use crate::models::{ChatMessage, SearchHit};
use crate::openai::AzureOpenAiClient;
use crate::search::{SearchClient, SearchRequest, VectorQuery};
use crate::utils::Validator;
use tracing::info;

pub const GROUNDED_PROMPT: &str = "\
You are an AI assistant that helps users learn from the information found in the source material.
Answer the query using only the sources provided below.
Use bullets if the answer has multiple points.
If the answer is longer than 3 sentences, provide a summary.
Answer ONLY with the facts listed in the list of sources below. Cite your source when you answer the question.
If there isn't enough information below, say you don't know.
Do not generate answers that don't use the sources below.
Query: {query}
Sources:
{sources}";

const ANSWER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that helps people find information.";

/// Retrieval and answer orchestration over the managed search index and the
/// chat deployment. Both halves are plain REST calls; the only local work is
/// prompt assembly.
pub struct RagEngine {
    search: SearchClient,
    openai: AzureOpenAiClient,
    config: Config,
}

impl RagEngine {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            search: SearchClient::from_config(&config)?,
            openai: AzureOpenAiClient::from_config(&config)?,
            config,
        })
    }

    pub fn search_client(&self) -> &SearchClient {
        &self.search
    }

    pub fn openai_client(&self) -> &AzureOpenAiClient {
        &self.openai
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hybrid semantic search over the SOW index. With integrated
    /// vectorization the service embeds the query text; otherwise the query
    /// embedding is computed here first.
    pub async fn search_documents(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        Validator::validate_question_not_empty(query)?;

        let vector_query = if self.config.search.use_integrated_vectorization {
            VectorQuery::text(query, top_k)
        } else {
            info!("Embedding query client-side");
            let embedding = self.openai.embed(query).await?;
            VectorQuery::vector(embedding, top_k)
        };

        let request = SearchRequest::semantic(
            query,
            &self.config.search.semantic_configuration,
            vector_query,
            top_k,
        );

        self.search
            .hybrid_search(&self.config.search.index_name, &request)
            .await
    }

    /// Simple RAG: retrieve, assemble the grounded prompt, and ask the chat
    /// deployment for an answer restricted to the retrieved sources.
    pub async fn generate_answer(&self, query: &str, top_k: usize) -> Result<String> {
        let hits = self.search_documents(query, top_k).await?;
        info!("Grounding answer on {} sources", hits.len());

        let prompt = build_grounded_prompt(query, &hits);
        let messages = vec![
            ChatMessage::system(ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        let outcome = self
            .openai
            .chat(&messages, None, self.config.answer.temperature)
            .await?;

        Ok(outcome.content.unwrap_or_default())
    }
}

pub fn format_sources(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(SearchHit::format_source)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_grounded_prompt(query: &str, hits: &[SearchHit]) -> String {
    GROUNDED_PROMPT
        .replace("{query}", query)
        .replace("{sources}", &format_sources(hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(title: &str, chunk: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            chunk: chunk.to_string(),
            score: 1.0,
            reranker_score: None,
        }
    }

    #[test]
    fn test_format_sources() {
        let hits = vec![
            hit("acme-sow.pdf", "Milestone one is due in March."),
            hit("widget-sow.pdf", "All work is provided with no warranty."),
        ];
        assert_eq!(
            format_sources(&hits),
            "- Milestone one is due in March. (Source: acme-sow.pdf)\n\
             - All work is provided with no warranty. (Source: widget-sow.pdf)"
        );
    }

    #[test]
    fn test_build_grounded_prompt_substitutes_placeholders() {
        let hits = vec![hit("acme-sow.pdf", "Payment net 30.")];
        let prompt = build_grounded_prompt("what are the payment terms?", &hits);

        assert!(prompt.contains("Query: what are the payment terms?"));
        assert!(prompt.contains("- Payment net 30. (Source: acme-sow.pdf)"));
        assert!(!prompt.contains("{query}"));
        assert!(!prompt.contains("{sources}"));
    }

    #[test]
    fn test_build_grounded_prompt_with_no_sources() {
        let prompt = build_grounded_prompt("anything", &[]);
        assert!(prompt.ends_with("Sources:\n"));
    }
}
