// file: src/search/client.rs
// description: Azure AI Search REST client with hybrid query support
// reference: https://learn.microsoft.com/rest/api/searchservice

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::models::SearchHit;
use crate::search::index::IndexDefinition;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERVICE: &str = "Azure AI Search";

#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search: String,
    pub query_type: String,
    pub semantic_configuration: String,
    pub vector_queries: Vec<VectorQuery>,
    pub select: String,
    pub top: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    pub k: usize,
    pub fields: String,
}

impl VectorQuery {
    /// Vectorizable text query: the service embeds the query through the
    /// index vectorizer.
    pub fn text(query: &str, k: usize) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(query.to_string()),
            vector: None,
            k,
            fields: "text_vector".to_string(),
        }
    }

    /// Raw vector query for a query embedding computed client-side.
    pub fn vector(embedding: Vec<f32>, k: usize) -> Self {
        Self {
            kind: "vector".to_string(),
            text: None,
            vector: Some(embedding),
            k,
            fields: "text_vector".to_string(),
        }
    }
}

impl SearchRequest {
    pub fn semantic(query: &str, semantic_configuration: &str, vector_query: VectorQuery, top: usize) -> Self {
        Self {
            search: query.to_string(),
            query_type: "semantic".to_string(),
            semantic_configuration: semantic_configuration.to_string(),
            vector_queries: vec![vector_query],
            select: "title,chunk".to_string(),
            top,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchHit>,
}

impl SearchClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            endpoint: config.search.endpoint.trim_end_matches('/').to_string(),
            api_key: config.search_api_key()?.to_string(),
            api_version: config.search.api_version.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.endpoint, path, self.api_version
        )
    }

    pub(crate) async fn put_json<T: Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let url = self.url(path);
        debug!("PUT {}", url);

        let response = self
            .http
            .put(&url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }
        Ok(())
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Content-Length", "0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }
        Ok(())
    }

    pub(crate) async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }
        Ok(response.json().await?)
    }

    /// Delete a service object; a missing object is not an error.
    pub(crate) async fn delete_object(&self, path: &str) -> Result<bool> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(RagError::from_response(SERVICE, response).await),
        }
    }

    pub async fn create_or_update_index(&self, definition: &IndexDefinition) -> Result<()> {
        info!("Creating or updating index: {}", definition.name);
        self.put_json(&format!("indexes/{}", definition.name), definition)
            .await
    }

    pub async fn index_exists(&self, index_name: &str) -> Result<bool> {
        let url = self.url(&format!("indexes/{}", index_name));

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(RagError::from_response(SERVICE, response).await),
        }
    }

    pub async fn delete_index(&self, index_name: &str) -> Result<bool> {
        info!("Deleting index: {}", index_name);
        self.delete_object(&format!("indexes/{}", index_name)).await
    }

    pub async fn document_count(&self, index_name: &str) -> Result<u64> {
        let url = self.url(&format!("indexes/{}/docs/$count", index_name));

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }

        // The $count endpoint returns a bare integer body
        let body = response.text().await?;
        body.trim()
            .trim_start_matches('\u{feff}')
            .parse::<u64>()
            .map_err(|e| RagError::Validation(format!("Unexpected document count response: {}", e)))
    }

    /// Run a hybrid query: keyword search, vector similarity, and semantic
    /// reranking in a single request. The ranking itself is entirely
    /// service-side.
    pub async fn hybrid_search(&self, index_name: &str, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let url = self.url(&format!("indexes/{}/docs/search", index_name));
        info!("Hybrid search (top {}): {}", request.top, request.search);

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }

        let parsed: SearchResponse = response.json().await?;
        info!("Hybrid search returned {} hits", parsed.value.len());
        Ok(parsed.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_semantic_request_body_shape() {
        let request = SearchRequest::semantic(
            "termination clause",
            "sow-semantic-config",
            VectorQuery::text("termination clause", 5),
            5,
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "search": "termination clause",
                "queryType": "semantic",
                "semanticConfiguration": "sow-semantic-config",
                "vectorQueries": [{
                    "kind": "text",
                    "text": "termination clause",
                    "k": 5,
                    "fields": "text_vector"
                }],
                "select": "title,chunk",
                "top": 5
            })
        );
    }

    #[test]
    fn test_vector_query_omits_unused_variant_fields() {
        let query = VectorQuery::vector(vec![0.1, 0.2], 3);
        let json = serde_json::to_value(&query).unwrap();

        assert_eq!(json["kind"], "vector");
        // f32 components widen to f64 in the JSON number
        assert_eq!(json["vector"][1], 0.2f32 as f64);
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_search_response_parsing() {
        let raw = r#"{
            "@odata.count": 2,
            "value": [
                {"@search.score": 0.03, "@search.rerankerScore": 2.4, "title": "a.pdf", "chunk": "alpha"},
                {"@search.score": 0.02, "title": "b.pdf", "chunk": "beta"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value[0].title, "a.pdf");
        assert_eq!(parsed.value[1].reranker_score, None);
    }

    #[test]
    fn test_client_url_construction() {
        let mut config = Config::default_config();
        config.search.api_key = Some("test-key".to_string());
        config.search.endpoint = "https://svc.search.windows.net/".to_string();

        let client = SearchClient::from_config(&config).unwrap();
        assert_eq!(
            client.url("indexes/sow-index"),
            "https://svc.search.windows.net/indexes/sow-index?api-version=2024-07-01"
        );
    }
}
