// file: src/search/index.rs
// description: search index definition with vector and semantic configuration
// reference: https://learn.microsoft.com/rest/api/searchservice/indexes/create-or-update

use crate::config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub vector_search: VectorSearchSettings,
    pub semantic: SemanticSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facetable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    /// REST property is `dimensions`, not `vectorSearchDimensions`
    #[serde(rename = "dimensions", skip_serializing_if = "Option::is_none")]
    pub vector_search_dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_profile: Option<String>,
}

impl FieldDefinition {
    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: "Edm.String".to_string(),
            key: None,
            searchable: None,
            filterable: None,
            sortable: None,
            facetable: None,
            analyzer: None,
            vector_search_dimensions: None,
            vector_search_profile: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorSearchSettings {
    pub algorithms: Vec<VectorAlgorithm>,
    pub profiles: Vec<VectorProfile>,
    pub vectorizers: Vec<Vectorizer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorAlgorithm {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorProfile {
    pub name: String,
    pub algorithm: String,
    pub vectorizer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vectorizer {
    pub name: String,
    pub kind: String,
    #[serde(rename = "azureOpenAIParameters")]
    pub azure_openai_parameters: AzureOpenAiParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOpenAiParameters {
    pub resource_uri: String,
    pub deployment_id: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSettings {
    pub configurations: Vec<SemanticConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticConfiguration {
    pub name: String,
    pub prioritized_fields: PrioritizedFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedFields {
    pub title_field: SemanticField,
    pub prioritized_content_fields: Vec<SemanticField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticField {
    pub field_name: String,
}

impl IndexDefinition {
    /// Build the SOW chunk index: parent id, title, keyed chunk id, chunk text,
    /// and the embedding vector wired to an HNSW profile with integrated
    /// Azure OpenAI vectorization.
    pub fn sow_index(config: &Config) -> Self {
        let search = &config.search;
        let openai = &config.openai;

        let fields = vec![
            FieldDefinition::string("id"),
            FieldDefinition::string("title"),
            FieldDefinition {
                key: Some(true),
                sortable: Some(true),
                filterable: Some(true),
                facetable: Some(true),
                analyzer: Some("keyword".to_string()),
                ..FieldDefinition::string("chunk_id")
            },
            FieldDefinition {
                sortable: Some(false),
                filterable: Some(false),
                facetable: Some(false),
                ..FieldDefinition::string("chunk")
            },
            FieldDefinition {
                name: "text_vector".to_string(),
                field_type: "Collection(Edm.Single)".to_string(),
                vector_search_dimensions: Some(openai.embedding_dimensions),
                vector_search_profile: Some(search.vector_profile.clone()),
                ..FieldDefinition::string("text_vector")
            },
        ];

        let vector_search = VectorSearchSettings {
            algorithms: vec![VectorAlgorithm {
                name: search.vector_algorithm.clone(),
                kind: "hnsw".to_string(),
            }],
            profiles: vec![VectorProfile {
                name: search.vector_profile.clone(),
                algorithm: search.vector_algorithm.clone(),
                vectorizer: search.vectorizer_name.clone(),
            }],
            vectorizers: vec![Vectorizer {
                name: search.vectorizer_name.clone(),
                kind: "azureOpenAI".to_string(),
                azure_openai_parameters: AzureOpenAiParameters {
                    resource_uri: openai.endpoint.clone(),
                    deployment_id: openai.embedding_deployment.clone(),
                    model_name: openai.embedding_deployment.clone(),
                    api_key: openai.api_key.clone(),
                },
            }],
        };

        let semantic = SemanticSettings {
            configurations: vec![SemanticConfiguration {
                name: search.semantic_configuration.clone(),
                prioritized_fields: PrioritizedFields {
                    title_field: SemanticField {
                        field_name: "title".to_string(),
                    },
                    prioritized_content_fields: vec![SemanticField {
                        field_name: "chunk".to_string(),
                    }],
                },
            }],
        };

        Self {
            name: search.index_name.clone(),
            fields,
            vector_search,
            semantic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sow_index_field_layout() {
        let config = Config::default_config();
        let index = IndexDefinition::sow_index(&config);

        assert_eq!(index.name, "sow-index");
        let names: Vec<&str> = index.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "chunk_id", "chunk", "text_vector"]);

        let key_field = &index.fields[2];
        assert_eq!(key_field.key, Some(true));
        assert_eq!(key_field.analyzer.as_deref(), Some("keyword"));
    }

    #[test]
    fn test_vector_field_serialization() {
        let config = Config::default_config();
        let index = IndexDefinition::sow_index(&config);
        let json = serde_json::to_value(&index).unwrap();

        let vector_field = &json["fields"][4];
        assert_eq!(vector_field["type"], "Collection(Edm.Single)");
        assert_eq!(vector_field["dimensions"], 3072);
        assert_eq!(vector_field["vectorSearchProfile"], "sow-hnsw-profile");
        // The service rejects the SDK-style property name
        assert!(vector_field.get("vectorSearchDimensions").is_none());
        // Non-vector fields must not carry vector attributes
        assert!(json["fields"][0].get("dimensions").is_none());
    }

    #[test]
    fn test_profile_binds_algorithm_and_vectorizer() {
        let config = Config::default_config();
        let index = IndexDefinition::sow_index(&config);
        let json = serde_json::to_value(&index).unwrap();

        assert_eq!(json["vectorSearch"]["algorithms"][0]["kind"], "hnsw");
        assert_eq!(
            json["vectorSearch"]["profiles"][0]["algorithm"],
            json["vectorSearch"]["algorithms"][0]["name"]
        );
        assert_eq!(
            json["vectorSearch"]["profiles"][0]["vectorizer"],
            json["vectorSearch"]["vectorizers"][0]["name"]
        );
        assert_eq!(json["vectorSearch"]["vectorizers"][0]["kind"], "azureOpenAI");
        assert_eq!(
            json["vectorSearch"]["vectorizers"][0]["azureOpenAIParameters"]["deploymentId"],
            "text-embedding-3-large"
        );
    }

    #[test]
    fn test_semantic_configuration_prioritizes_title_and_chunk() {
        let config = Config::default_config();
        let index = IndexDefinition::sow_index(&config);
        let json = serde_json::to_value(&index).unwrap();

        let semantic = &json["semantic"]["configurations"][0];
        assert_eq!(semantic["name"], "sow-semantic-config");
        assert_eq!(semantic["prioritizedFields"]["titleField"]["fieldName"], "title");
        assert_eq!(
            semantic["prioritizedFields"]["prioritizedContentFields"][0]["fieldName"],
            "chunk"
        );
    }
}
