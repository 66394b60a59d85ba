// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{RagError, Result};
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RagError::Validation(format!("Invalid URL format: {}", url)));
        }
        Ok(())
    }

    pub fn validate_question_not_empty(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(RagError::Validation("Question is empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(RagError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(RagError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Document formats the managed indexer can crack and chunk.
    pub fn validate_document_extension(path: &Path) -> Result<()> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") | Some("docx") | Some("txt") | Some("md") | Some("html") => Ok(()),
            _ => Err(RagError::Validation(format!(
                "Unsupported document format: {}",
                path.display()
            ))),
        }
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_length).collect();
            format!("{}...", truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.search.windows.net").is_ok());
        assert!(Validator::validate_url("http://localhost:8080").is_ok());
        assert!(Validator::validate_url("example.com").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_question_not_empty() {
        assert!(Validator::validate_question_not_empty("what are the payment terms?").is_ok());
        assert!(Validator::validate_question_not_empty("").is_err());
        assert!(Validator::validate_question_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_document_extension() {
        assert!(Validator::validate_document_extension(Path::new("sow.pdf")).is_ok());
        assert!(Validator::validate_document_extension(Path::new("SOW.PDF")).is_ok());
        assert!(Validator::validate_document_extension(Path::new("sow.docx")).is_ok());
        assert!(Validator::validate_document_extension(Path::new("notes.md")).is_ok());
        assert!(Validator::validate_document_extension(Path::new("archive.zip")).is_err());
        assert!(Validator::validate_document_extension(Path::new("noext")).is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
    }

    #[test]
    fn test_truncate_text_multibyte() {
        // Must not split inside a UTF-8 sequence
        let truncated = Validator::truncate_text("héllo wörld", 6);
        assert_eq!(truncated, "héllo ...");
    }
}
