// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod openai;
pub mod rag;
pub mod repl;
pub mod search;
pub mod storage;
pub mod utils;

pub use agent::{AgentOutcome, ContractAgent};
pub use config::{AgentConfig, AnswerConfig, Config, OpenAiConfig, SearchConfig, StorageConfig};
pub use error::{RagError, Result};
pub use models::{ChatMessage, SearchHit, ToolCall, ToolDef};
pub use openai::AzureOpenAiClient;
pub use rag::{RagEngine, GROUNDED_PROMPT};
pub use repl::{ChatMode, ChatSession};
pub use search::{IndexDefinition, IndexerManager, SearchClient};
pub use storage::{BlobClient, StorageAccount, UploadStats};
pub use utils::Validator;
