// file: src/search/mod.rs
// description: Azure AI Search REST surface - index schema, client, indexer pipeline

pub mod client;
pub mod index;
pub mod indexer;

pub use client::{SearchClient, SearchRequest, VectorQuery};
pub use index::IndexDefinition;
pub use indexer::{IndexerManager, IndexerRunSummary};
