// file: src/search/indexer.rs
// description: managed ingestion objects - data source, skillset, indexer
// reference: https://learn.microsoft.com/rest/api/searchservice/skillsets/create-or-update

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::search::client::SearchClient;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const SPLIT_MAX_PAGE_LENGTH: usize = 2_000;
const SPLIT_PAGE_OVERLAP: usize = 500;
const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub credentials: DataSourceCredentials,
    pub container: DataSourceContainer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCredentials {
    pub connection_string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceContainer {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsetDefinition {
    pub name: String,
    pub description: String,
    pub skills: Vec<Skill>,
    pub index_projections: IndexProjections,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "@odata.type")]
pub enum Skill {
    #[serde(rename = "#Microsoft.Skills.Text.SplitSkill")]
    #[serde(rename_all = "camelCase")]
    Split {
        name: String,
        description: String,
        context: String,
        text_split_mode: String,
        maximum_page_length: usize,
        page_overlap_length: usize,
        inputs: Vec<SkillInput>,
        outputs: Vec<SkillOutput>,
    },
    #[serde(rename = "#Microsoft.Skills.Text.AzureOpenAIEmbeddingSkill")]
    #[serde(rename_all = "camelCase")]
    AzureOpenAiEmbedding {
        name: String,
        description: String,
        context: String,
        resource_uri: String,
        deployment_id: String,
        model_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        inputs: Vec<SkillInput>,
        outputs: Vec<SkillOutput>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutput {
    pub name: String,
    pub target_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProjections {
    pub selectors: Vec<ProjectionSelector>,
    pub parameters: ProjectionParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSelector {
    pub target_index_name: String,
    pub parent_key_field_name: String,
    pub source_context: String,
    pub mappings: Vec<SkillInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParameters {
    pub projection_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerDefinition {
    pub name: String,
    pub description: String,
    pub data_source_name: String,
    pub skillset_name: String,
    pub target_index_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    #[serde(default)]
    pub status: String,
    pub last_result: Option<IndexerRunSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerRunSummary {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub items_failed: u64,
    pub error_message: Option<String>,
}

impl IndexerRunSummary {
    /// A run is terminal once it is no longer queued or executing.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status.as_str(), "inProgress" | "")
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

impl DataSourceDefinition {
    pub fn sow_blob_source(config: &Config) -> Result<Self> {
        Ok(Self {
            name: config.search.data_source_name.clone(),
            source_type: "azureblob".to_string(),
            credentials: DataSourceCredentials {
                connection_string: config.storage_connection_string()?.to_string(),
            },
            container: DataSourceContainer {
                name: config.storage.container.clone(),
            },
        })
    }
}

impl SkillsetDefinition {
    /// Chunk-and-embed skillset: the split skill pages each document, the
    /// embedding skill vectorizes every page, and index projections write one
    /// search document per chunk (parents are skipped).
    pub fn sow_skillset(config: &Config) -> Self {
        let split = Skill::Split {
            name: "split-skill".to_string(),
            description: "Splits documents into overlapping pages".to_string(),
            context: "/document".to_string(),
            text_split_mode: "pages".to_string(),
            maximum_page_length: SPLIT_MAX_PAGE_LENGTH,
            page_overlap_length: SPLIT_PAGE_OVERLAP,
            inputs: vec![SkillInput {
                name: "text".to_string(),
                source: "/document/content".to_string(),
            }],
            outputs: vec![SkillOutput {
                name: "textItems".to_string(),
                target_name: "pages".to_string(),
            }],
        };

        let embedding = Skill::AzureOpenAiEmbedding {
            name: "azure-openai-embedding-skill".to_string(),
            description: "Generates embeddings for text chunks".to_string(),
            context: "/document/pages/*".to_string(),
            resource_uri: config.openai.endpoint.clone(),
            deployment_id: config.openai.embedding_deployment.clone(),
            model_name: config.openai.embedding_deployment.clone(),
            api_key: config.openai.api_key.clone(),
            inputs: vec![SkillInput {
                name: "text".to_string(),
                source: "/document/pages/*".to_string(),
            }],
            outputs: vec![SkillOutput {
                name: "embedding".to_string(),
                target_name: "text_vector".to_string(),
            }],
        };

        let projections = IndexProjections {
            selectors: vec![ProjectionSelector {
                target_index_name: config.search.index_name.clone(),
                parent_key_field_name: "id".to_string(),
                source_context: "/document/pages/*".to_string(),
                mappings: vec![
                    SkillInput {
                        name: "chunk".to_string(),
                        source: "/document/pages/*".to_string(),
                    },
                    SkillInput {
                        name: "text_vector".to_string(),
                        source: "/document/pages/*/text_vector".to_string(),
                    },
                    SkillInput {
                        name: "title".to_string(),
                        source: "/document/metadata_storage_name".to_string(),
                    },
                ],
            }],
            parameters: ProjectionParameters {
                projection_mode: "skipIndexingParentDocuments".to_string(),
            },
        };

        Self {
            name: config.search.skillset_name.clone(),
            description: "Skillset for processing statement of work documents".to_string(),
            skills: vec![split, embedding],
            index_projections: projections,
        }
    }
}

impl IndexerDefinition {
    pub fn sow_indexer(config: &Config) -> Self {
        Self {
            name: config.search.indexer_name.clone(),
            description: "Indexer for statement of work documents".to_string(),
            data_source_name: config.search.data_source_name.clone(),
            skillset_name: config.search.skillset_name.clone(),
            target_index_name: config.search.index_name.clone(),
        }
    }
}

pub struct IndexerManager<'a> {
    client: &'a SearchClient,
    config: &'a Config,
}

impl<'a> IndexerManager<'a> {
    pub fn new(client: &'a SearchClient, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// Create or update the data source, skillset, and indexer. The index
    /// itself is provisioned separately through the client.
    pub async fn provision(&self) -> Result<()> {
        let data_source = DataSourceDefinition::sow_blob_source(self.config)?;
        info!("Creating or updating data source: {}", data_source.name);
        self.client
            .put_json(&format!("datasources/{}", data_source.name), &data_source)
            .await?;

        let skillset = SkillsetDefinition::sow_skillset(self.config);
        info!("Creating or updating skillset: {}", skillset.name);
        self.client
            .put_json(&format!("skillsets/{}", skillset.name), &skillset)
            .await?;

        let indexer = IndexerDefinition::sow_indexer(self.config);
        info!("Creating or updating indexer: {}", indexer.name);
        self.client
            .put_json(&format!("indexers/{}", indexer.name), &indexer)
            .await?;

        Ok(())
    }

    pub async fn run(&self) -> Result<()> {
        let name = &self.config.search.indexer_name;
        info!("Requesting indexer run: {}", name);
        self.client.post_empty(&format!("indexers/{}/run", name)).await
    }

    pub async fn status(&self) -> Result<IndexerStatus> {
        let name = &self.config.search.indexer_name;
        self.client
            .get_json(&format!("indexers/{}/status", name))
            .await
    }

    /// Poll the indexer until its latest run reaches a terminal state.
    pub async fn wait_for_completion(&self) -> Result<IndexerRunSummary> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));

        loop {
            let status = self.status().await?;

            match status.last_result {
                Some(run) if run.is_terminal() => {
                    spinner.finish_and_clear();
                    if run.is_success() {
                        info!(
                            "Indexer run complete: {} items processed, {} failed",
                            run.items_processed, run.items_failed
                        );
                    } else {
                        warn!(
                            "Indexer run ended with status '{}': {}",
                            run.status,
                            run.error_message.as_deref().unwrap_or("no error message")
                        );
                    }
                    return Ok(run);
                }
                Some(run) => {
                    spinner.set_message(format!(
                        "Indexer running: {} items processed",
                        run.items_processed
                    ));
                }
                None => {
                    spinner.set_message("Waiting for first indexer run to start".to_string());
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Tear down the ingestion objects (indexer first, then skillset and
    /// data source) so a fresh provision starts clean.
    pub async fn teardown(&self) -> Result<()> {
        let search = &self.config.search;
        self.client
            .delete_object(&format!("indexers/{}", search.indexer_name))
            .await?;
        self.client
            .delete_object(&format!("skillsets/{}", search.skillset_name))
            .await?;
        self.client
            .delete_object(&format!("datasources/{}", search.data_source_name))
            .await?;
        Ok(())
    }
}
