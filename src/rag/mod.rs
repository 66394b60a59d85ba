// file: src/rag/mod.rs
// description: retrieval-augmented answer generation exports

pub mod answer;

pub use answer::{build_grounded_prompt, format_sources, RagEngine, GROUNDED_PROMPT};
