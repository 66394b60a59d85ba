// file: src/repl/mod.rs
// description: interactive question loop with simple-RAG and agent modes
// reference: https://docs.rs/rustyline

use crate::agent::ContractAgent;
use crate::error::{RagError, Result};
use crate::rag::RagEngine;
use crate::utils::logging::{format_error, format_warning};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

const HISTORY_FILE: &str = ".sow_rag_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Simple,
    Agent,
}

impl FromStr for ChatMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "rag" => Ok(Self::Simple),
            "agent" | "contract" => Ok(Self::Agent),
            other => Err(RagError::Input(format!(
                "Unknown mode '{}' (expected 'simple' or 'agent')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

pub struct ChatSession {
    engine: RagEngine,
    mode: ChatMode,
}

impl ChatSession {
    pub fn new(engine: RagEngine, mode: ChatMode) -> Self {
        Self { engine, mode }
    }

    pub async fn run(&mut self) -> Result<()> {
        let session_id = Uuid::new_v4();
        info!(%session_id, mode = %self.mode, "starting chat session");

        let mut editor =
            DefaultEditor::new().map_err(|e| RagError::Input(e.to_string()))?;
        let history_path = PathBuf::from(HISTORY_FILE);
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        println!("Talk to your SOW documents ({} mode)", self.mode);
        println!("Type :help for commands, :quit to exit\n");

        loop {
            let line = match editor.readline("sow> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(RagError::Input(e.to_string())),
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(input);

            if let Some(command) = input.strip_prefix(':') {
                if !self.handle_command(command) {
                    break;
                }
                continue;
            }

            match self.answer(input).await {
                Ok(answer) => {
                    println!("\n{}", "-".repeat(72));
                    println!("{}", answer);
                    println!("{}\n", "-".repeat(72));
                }
                Err(e) => println!("{}", format_error(&e.to_string())),
            }
        }

        let _ = editor.save_history(&history_path);
        info!(%session_id, "chat session ended");
        Ok(())
    }

    async fn answer(&self, question: &str) -> Result<String> {
        match self.mode {
            ChatMode::Simple => {
                let top_k = self.engine.config().answer.top_k;
                self.engine.generate_answer(question, top_k).await
            }
            ChatMode::Agent => {
                let agent = ContractAgent::new(&self.engine);
                let outcome = agent.run(question).await?;
                info!(
                    steps = outcome.steps,
                    tools = ?outcome.tools_used,
                    "agent run complete"
                );
                Ok(outcome.answer)
            }
        }
    }

    /// Handle a `:command` line; returns false when the session should end.
    fn handle_command(&mut self, command: &str) -> bool {
        let mut parts = command.split_whitespace();
        match parts.next() {
            Some("quit") | Some("exit") | Some("q") => return false,
            Some("mode") => match parts.next() {
                Some(mode) => match ChatMode::from_str(mode) {
                    Ok(mode) => {
                        self.mode = mode;
                        println!("Switched to {} mode", self.mode.to_string().cyan());
                    }
                    Err(e) => println!("{}", format_warning(&e.to_string())),
                },
                None => println!("Current mode: {}", self.mode),
            },
            Some("help") => print_help(),
            Some(other) => println!(
                "{}",
                format_warning(&format!("Unknown command ':{}' (try :help)", other))
            ),
            None => {}
        }
        true
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :mode            show the active answer mode");
    println!("  :mode simple     answer with grounded RAG only");
    println!("  :mode agent      answer with the contract agent (search + risk check)");
    println!("  :help            show this help");
    println!("  :quit            exit the session");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(ChatMode::from_str("simple").unwrap(), ChatMode::Simple);
        assert_eq!(ChatMode::from_str("RAG").unwrap(), ChatMode::Simple);
        assert_eq!(ChatMode::from_str("agent").unwrap(), ChatMode::Agent);
        assert_eq!(ChatMode::from_str(" Contract ").unwrap(), ChatMode::Agent);
        assert!(ChatMode::from_str("other").is_err());
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [ChatMode::Simple, ChatMode::Agent] {
            assert_eq!(ChatMode::from_str(&mode.to_string()).unwrap(), mode);
        }
    }
}
