// file: src/models/search_result.rs
// description: Search hit model with hybrid ranking scores
// reference: Azure AI Search document search response shape

use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source document title (blob file name projected by the indexer)
    #[serde(default)]
    pub title: String,

    /// Chunk text produced by the split skill
    #[serde(default)]
    pub chunk: String,

    /// Hybrid relevance score
    #[serde(rename = "@search.score", default)]
    pub score: f64,

    /// Semantic reranker score, present for semantic queries only
    #[serde(rename = "@search.rerankerScore", skip_serializing_if = "Option::is_none")]
    pub reranker_score: Option<f64>,
}

impl SearchHit {
    /// Format as a grounding source line for the answer prompt.
    pub fn format_source(&self) -> String {
        format!("- {} (Source: {})", self.chunk, self.title)
    }

    /// Format as a `title: snippet` block for agent tool output.
    pub fn format_snippet(&self, max_chars: usize) -> String {
        format!("{}: {}", self.title, Validator::truncate_text(&self.chunk, max_chars))
    }

    /// Format as a display summary for CLI output.
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let preview = Validator::truncate_text(&self.chunk, max_content_len);
        match self.reranker_score {
            Some(reranker) => format!(
                "Score: {:.4} | Reranker: {:.4} | {}\n{}\n",
                self.score, reranker, self.title, preview
            ),
            None => format!("Score: {:.4} | {}\n{}\n", self.score, self.title, preview),
        }
    }
}
