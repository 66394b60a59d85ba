// file: src/openai/client.rs
// description: Azure OpenAI chat completion and embedding client
// reference: https://learn.microsoft.com/azure/ai-services/openai/reference

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::models::{ChatMessage, ToolCall, ToolDef};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SERVICE: &str = "Azure OpenAI";

#[derive(Clone)]
pub struct AzureOpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    chat_deployment: String,
    embedding_deployment: String,
    embedding_dimensions: usize,
}

/// Parsed first choice of a chat completion: final text, tool requests, or both.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatOutcome {
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDef]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: Vec<String>,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl AzureOpenAiClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            endpoint: config.openai.endpoint.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key()?.to_string(),
            api_version: config.openai.api_version.clone(),
            chat_deployment: config.openai.chat_deployment.clone(),
            embedding_deployment: config.openai.embedding_deployment.clone(),
            embedding_dimensions: config.openai.embedding_dimensions,
        })
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment, operation, self.api_version
        )
    }

    /// Non-streaming chat completion. When tools are supplied, tool choice is
    /// left to the model (`auto`).
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDef]>,
        temperature: f32,
    ) -> Result<ChatOutcome> {
        let request = ChatCompletionRequest {
            messages,
            temperature,
            tools,
            tool_choice: tools.map(|_| "auto"),
        };

        let url = self.deployment_url(&self.chat_deployment, "chat/completions");
        debug!(
            deployment = %self.chat_deployment,
            messages = messages.len(),
            tools = tools.map_or(0, <[ToolDef]>::len),
            "sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Agent("Chat completion returned no choices".to_string()))?;

        debug!(
            content_len = choice.message.content.as_deref().map_or(0, str::len),
            tool_calls = choice.message.tool_calls.len(),
            "chat completion received"
        );

        Ok(ChatOutcome {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls,
        })
    }

    /// Embed a single text through the embeddings deployment.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: vec![text.to_string()],
            dimensions: self.embedding_dimensions,
        };

        let url = self.deployment_url(&self.embedding_deployment, "embeddings");
        debug!("Requesting embedding for {} chars", text.len());

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                RagError::Validation("No embedding data returned from Azure OpenAI".to_string())
            })?;

        if embedding.len() != self.embedding_dimensions {
            warn!(
                "Embedding dimension {} does not match configured {}",
                embedding.len(),
                self.embedding_dimensions
            );
        }

        Ok(embedding)
    }

    pub fn chat_deployment(&self) -> &str {
        &self.chat_deployment
    }

    pub fn embedding_deployment(&self) -> &str {
        &self.embedding_deployment
    }
}
