// file: src/models/mod.rs
// description: data model exports

pub mod chat;
pub mod search_result;

pub use chat::{ChatMessage, FunctionCall, FunctionDef, ToolCall, ToolDef};
pub use search_result::SearchHit;
