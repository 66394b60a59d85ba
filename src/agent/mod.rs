// file: src/agent/mod.rs
// description: contract agent tool loop exports

pub mod risk;
pub mod runner;
pub mod tools;

pub use risk::{assess, render_findings, RiskFinding};
pub use runner::{AgentOutcome, ContractAgent};
