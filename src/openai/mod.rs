// file: src/openai/mod.rs
// description: Azure OpenAI REST client exports

pub mod client;

pub use client::{AzureOpenAiClient, ChatOutcome};
