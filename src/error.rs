// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} request failed with status {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Input error: {0}")]
    Input(String),
}

impl RagError {
    /// Build an Api error from a non-success REST response, consuming the body.
    pub async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Self::Api {
            service,
            status,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = RagError::Api {
            service: "Azure AI Search",
            status: 403,
            message: "Forbidden".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Azure AI Search"));
        assert!(rendered.contains("403"));
        assert!(rendered.contains("Forbidden"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = RagError::Validation("query is empty".to_string());
        assert_eq!(err.to_string(), "Validation error: query is empty");
    }
}
