// file: src/storage/blob.rs
// description: blob container and upload operations for SOW source documents
// reference: https://learn.microsoft.com/rest/api/storageservices/put-blob

use crate::config::{Config, StorageConfig};
use crate::error::{RagError, Result};
use crate::storage::auth::{string_to_sign, StorageAccount};
use crate::utils::Validator;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const SERVICE: &str = "Azure Blob Storage";
const STORAGE_API_VERSION: &str = "2021-08-06";

#[derive(Debug, Clone, Default)]
pub struct UploadStats {
    pub files_uploaded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub bytes_uploaded: u64,
}

impl UploadStats {
    pub fn success_rate(&self) -> f64 {
        let attempted = self.files_uploaded + self.files_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.files_uploaded as f64 / attempted as f64) * 100.0
    }
}

pub struct BlobClient {
    http: Client,
    account: StorageAccount,
    container: String,
    config: StorageConfig,
}

impl BlobClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let account = StorageAccount::from_connection_string(config.storage_connection_string()?)?;
        Ok(Self {
            http: Client::new(),
            account,
            container: config.storage.container.clone(),
            config: config.storage.clone(),
        })
    }

    fn rfc1123_now() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Create the container if it does not already exist. Returns true when a
    /// new container was created.
    pub async fn ensure_container(&self) -> Result<bool> {
        let date = Self::rfc1123_now();
        let headers = [
            ("x-ms-date", date.as_str()),
            ("x-ms-version", STORAGE_API_VERSION),
        ];
        let resource =
            self.account
                .canonical_resource(&self.container, None, &[("restype", "container")]);
        let authorization = self
            .account
            .authorization_header(&string_to_sign("PUT", 0, "", &headers, &resource))?;

        let url = format!(
            "{}/{}?restype=container",
            self.account.blob_endpoint, self.container
        );
        debug!("PUT {}", url);

        let response = self
            .http
            .put(&url)
            .header("Authorization", authorization)
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("Content-Length", "0")
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                info!("Created container: {}", self.container);
                Ok(true)
            }
            StatusCode::CONFLICT => {
                debug!("Container already exists: {}", self.container);
                Ok(false)
            }
            _ => Err(RagError::from_response(SERVICE, response).await),
        }
    }

    /// Upload a single document as a block blob named after the file.
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        Validator::validate_document_extension(path)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RagError::Storage(format!("Invalid file name: {}", path.display())))?;
        let blob_name = sanitize_blob_name(file_name);
        let content_type = content_type_for(path);

        let bytes = tokio::fs::read(path).await?;
        let content_length = bytes.len() as u64;

        let date = Self::rfc1123_now();
        let headers = [
            ("x-ms-blob-type", "BlockBlob"),
            ("x-ms-date", date.as_str()),
            ("x-ms-version", STORAGE_API_VERSION),
        ];
        let resource = self
            .account
            .canonical_resource(&self.container, Some(&blob_name), &[]);
        let authorization = self.account.authorization_header(&string_to_sign(
            "PUT",
            content_length,
            content_type,
            &headers,
            &resource,
        ))?;

        let url = format!(
            "{}/{}/{}",
            self.account.blob_endpoint, self.container, blob_name
        );
        info!("Uploading {} ({} bytes)", blob_name, content_length);

        let response = self
            .http
            .put(&url)
            .header("Authorization", authorization)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RagError::from_response(SERVICE, response).await);
        }

        Ok(blob_name)
    }

    /// Upload every supported document under a directory, one at a time.
    /// Unsupported formats, oversized files, and skip-pattern matches are
    /// counted as skipped; upload failures do not abort the batch.
    pub async fn upload_directory(&self, root: &Path, recursive: bool) -> Result<UploadStats> {
        Validator::validate_directory(root)?;
        info!("Scanning {} for SOW documents", root.display());

        let max_depth = if recursive { usize::MAX } else { 1 };
        let max_size = (self.config.max_file_size_mb * 1024 * 1024) as u64;
        let mut stats = UploadStats::default();

        for entry in WalkDir::new(root)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                stats.files_skipped += 1;
                continue;
            }

            if Validator::validate_document_extension(path).is_err() {
                debug!("Skipping unsupported format: {}", path.display());
                stats.files_skipped += 1;
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > max_size {
                warn!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                stats.files_skipped += 1;
                continue;
            }

            match self.upload_file(path).await {
                Ok(blob_name) => {
                    stats.files_uploaded += 1;
                    stats.bytes_uploaded += size;
                    info!("Uploaded: {}", blob_name);
                }
                Err(e) => {
                    stats.files_failed += 1;
                    warn!("Failed to upload {}: {}", path.display(), e);
                }
            }
        }

        info!(
            "Upload complete: {} uploaded, {} skipped, {} failed",
            stats.files_uploaded, stats.files_skipped, stats.files_failed
        );
        Ok(stats)
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.config.skip_patterns {
            if let Some(suffix) = pattern.strip_prefix("*.") {
                if path_str.ends_with(&format!(".{}", suffix)) {
                    return true;
                }
            } else if let Some(dir) = pattern.strip_suffix("/*") {
                if path_str.starts_with(&format!("{}/", dir))
                    || path_str.contains(&format!("/{}/", dir))
                {
                    return true;
                }
            } else if path_str.contains(pattern.as_str()) {
                return true;
            }
        }

        false
    }
}

/// Blob names come straight from file names; whitespace is the one thing that
/// would break the unescaped request path.
fn sanitize_blob_name(file_name: &str) -> String {
    file_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("html") => "text/html",
        Some("md") | Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
