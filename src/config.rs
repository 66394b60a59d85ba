// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RagError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub search: SearchConfig,
    pub openai: OpenAiConfig,
    pub storage: StorageConfig,
    pub agent: AgentConfig,
    pub answer: AnswerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub index_name: String,
    pub data_source_name: String,
    pub skillset_name: String,
    pub indexer_name: String,
    pub semantic_configuration: String,
    pub vector_profile: String,
    pub vector_algorithm: String,
    pub vectorizer_name: String,
    pub use_integrated_vectorization: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub chat_deployment: String,
    pub embedding_deployment: String,
    pub embedding_dimensions: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub connection_string: Option<String>,
    pub container: String,
    pub max_file_size_mb: usize,
    pub skip_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub max_steps: usize,
    pub search_top_k: usize,
    pub snippet_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerConfig {
    pub top_k: usize,
    pub temperature: f32,
}

impl Config {
    /// Layered load: built-in defaults, then the config file (optional, so
    /// env-only deployments work without one), then `SOW_RAG__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| RagError::Config(e.to_string()))?;

        let file = path.unwrap_or_else(|| Path::new("config/default.toml"));

        let builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix("SOW_RAG")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| RagError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            search: SearchConfig {
                endpoint: "https://example.search.windows.net".to_string(),
                api_key: None,
                api_version: "2024-07-01".to_string(),
                index_name: "sow-index".to_string(),
                data_source_name: "sow-datasource".to_string(),
                skillset_name: "statement-of-work-skillset".to_string(),
                indexer_name: "sow-indexer".to_string(),
                semantic_configuration: "sow-semantic-config".to_string(),
                vector_profile: "sow-hnsw-profile".to_string(),
                vector_algorithm: "sow-hnsw".to_string(),
                vectorizer_name: "sow-openai-vectorizer".to_string(),
                use_integrated_vectorization: true,
            },
            openai: OpenAiConfig {
                endpoint: "https://example.openai.azure.com".to_string(),
                api_key: None,
                api_version: "2025-01-01-preview".to_string(),
                chat_deployment: "gpt-4o".to_string(),
                embedding_deployment: "text-embedding-3-large".to_string(),
                embedding_dimensions: 3072,
            },
            storage: StorageConfig {
                connection_string: None,
                container: "sow-container".to_string(),
                max_file_size_mb: 50,
                skip_patterns: vec![
                    "*.zip".to_string(),
                    ".git/*".to_string(),
                    "*.tmp".to_string(),
                ],
            },
            agent: AgentConfig {
                max_steps: 6,
                search_top_k: 3,
                snippet_chars: 300,
            },
            answer: AnswerConfig {
                top_k: 5,
                temperature: 0.0,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        crate::utils::Validator::validate_url(&self.search.endpoint)?;
        crate::utils::Validator::validate_url(&self.openai.endpoint)?;

        if self.answer.top_k == 0 {
            return Err(RagError::Config(
                "answer.top_k must be greater than 0".to_string(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(RagError::Config(
                "agent.max_steps must be greater than 0".to_string(),
            ));
        }

        if self.agent.search_top_k == 0 {
            return Err(RagError::Config(
                "agent.search_top_k must be greater than 0".to_string(),
            ));
        }

        if self.openai.embedding_dimensions == 0 {
            return Err(RagError::Config(
                "openai.embedding_dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn search_api_key(&self) -> Result<&str> {
        self.search
            .api_key
            .as_deref()
            .ok_or_else(|| RagError::Config("search.api_key is not configured".to_string()))
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .ok_or_else(|| RagError::Config("openai.api_key is not configured".to_string()))
    }

    pub fn storage_connection_string(&self) -> Result<&str> {
        self.storage
            .connection_string
            .as_deref()
            .ok_or_else(|| RagError::Config("storage.connection_string is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = Config::default_config();
        config.answer.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let mut config = Config::default_config();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut config = Config::default_config();
        config.search.endpoint = "example.search.windows.net".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/sow.toml"))).unwrap();
        assert_eq!(config.search.index_name, "sow-index");
        assert_eq!(config.answer.top_k, 5);
    }

    #[test]
    fn test_load_partial_file_overlays_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[answer]\ntop_k = 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.answer.top_k, 7);
        // Unset sections keep their defaults
        assert_eq!(config.search.index_name, "sow-index");
        assert_eq!(config.agent.max_steps, 6);
    }

    #[test]
    fn test_missing_keys_reported() {
        let config = Config::default_config();
        assert!(config.search_api_key().is_err());
        assert!(config.openai_api_key().is_err());
        assert!(config.storage_connection_string().is_err());
    }
}
