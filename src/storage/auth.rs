// file: src/storage/auth.rs
// description: storage connection string parsing and shared key request signing
// reference: https://learn.microsoft.com/rest/api/storageservices/authorize-with-shared-key

use crate::error::{RagError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

#[derive(Debug, Clone)]
pub struct StorageAccount {
    pub account_name: String,
    account_key: Vec<u8>,
    pub blob_endpoint: String,
}

impl StorageAccount {
    /// Parse an `AccountName`/`AccountKey` connection string. SAS-style
    /// connection strings cannot be used for shared key signing and are
    /// rejected outright.
    pub fn from_connection_string(raw: &str) -> Result<Self> {
        let mut account_name = None;
        let mut account_key = None;
        let mut protocol = "https".to_string();
        let mut endpoint_suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();
        let mut blob_endpoint = None;

        for part in raw.split(';').filter(|p| !p.trim().is_empty()) {
            // AccountKey is base64 and may contain '='; split on the first one only
            let (key, value) = part.split_once('=').ok_or_else(|| {
                RagError::Storage(format!("Malformed connection string segment: {}", part))
            })?;

            match key.trim() {
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => endpoint_suffix = value.to_string(),
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "SharedAccessSignature" => {
                    return Err(RagError::Storage(
                        "SAS connection strings are not supported; use an account key".to_string(),
                    ))
                }
                _ => {}
            }
        }

        let account_name = account_name
            .ok_or_else(|| RagError::Storage("Connection string is missing AccountName".to_string()))?;
        let raw_key = account_key
            .ok_or_else(|| RagError::Storage("Connection string is missing AccountKey".to_string()))?;

        let account_key = STANDARD
            .decode(raw_key.as_bytes())
            .map_err(|e| RagError::Storage(format!("AccountKey is not valid base64: {}", e)))?;

        let blob_endpoint = blob_endpoint
            .unwrap_or_else(|| format!("{}://{}.blob.{}", protocol, account_name, endpoint_suffix));

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }

    /// Canonicalized resource: `/{account}/{container}[/{blob}]` followed by
    /// sorted lowercase query parameters, one per line.
    pub fn canonical_resource(
        &self,
        container: &str,
        blob: Option<&str>,
        query: &[(&str, &str)],
    ) -> String {
        let mut resource = format!("/{}/{}", self.account_name, container);
        if let Some(blob) = blob {
            resource.push('/');
            resource.push_str(blob);
        }

        let mut params: Vec<(&str, &str)> = query.to_vec();
        params.sort_by_key(|(k, _)| *k);
        for (key, value) in params {
            resource.push('\n');
            resource.push_str(&key.to_ascii_lowercase());
            resource.push(':');
            resource.push_str(value);
        }

        resource
    }

    pub fn sign(&self, string_to_sign: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.account_key)
            .map_err(|e| RagError::Storage(format!("Invalid account key length: {}", e)))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    pub fn authorization_header(&self, string_to_sign: &str) -> Result<String> {
        Ok(format!(
            "SharedKey {}:{}",
            self.account_name,
            self.sign(string_to_sign)?
        ))
    }
}

/// Shared key string-to-sign for blob requests. Only the headers this client
/// actually sends participate; everything else stays an empty line.
pub fn string_to_sign(
    verb: &str,
    content_length: u64,
    content_type: &str,
    x_ms_headers: &[(&str, &str)],
    canonical_resource: &str,
) -> String {
    let mut headers: Vec<(&str, &str)> = x_ms_headers.to_vec();
    headers.sort_by_key(|(k, _)| *k);
    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k.to_ascii_lowercase(), v.trim()))
        .collect();

    // Zero content length is represented as an empty line
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    format!(
        "{}\n\n\n{}\n\n{}\n\n\n\n\n\n\n{}{}",
        verb, length, content_type, canonical_headers, canonical_resource
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONNECTION: &str = "DefaultEndpointsProtocol=https;AccountName=sowdocs;\
        AccountKey=c2VjcmV0LWtleQ==;EndpointSuffix=core.windows.net";

    #[test]
    fn test_parse_connection_string() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        assert_eq!(account.account_name, "sowdocs");
        assert_eq!(account.blob_endpoint, "https://sowdocs.blob.core.windows.net");
        assert_eq!(account.account_key, b"secret-key");
    }

    #[test]
    fn test_parse_connection_string_with_blob_endpoint_override() {
        let raw = format!("{};BlobEndpoint=http://127.0.0.1:10000/sowdocs/", CONNECTION);
        let account = StorageAccount::from_connection_string(&raw).unwrap();
        assert_eq!(account.blob_endpoint, "http://127.0.0.1:10000/sowdocs");
    }

    #[test]
    fn test_missing_account_key_rejected() {
        let result = StorageAccount::from_connection_string("AccountName=sowdocs");
        assert!(result.is_err());
    }

    #[test]
    fn test_sas_connection_string_rejected() {
        let raw = "BlobEndpoint=https://sowdocs.blob.core.windows.net;\
            SharedAccessSignature=sv=2021-08-06&sig=abc";
        let err = StorageAccount::from_connection_string(raw).unwrap_err();
        assert!(err.to_string().contains("SAS"));
    }

    #[test]
    fn test_invalid_base64_key_rejected() {
        let result =
            StorageAccount::from_connection_string("AccountName=sowdocs;AccountKey=!!notb64!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_canonical_resource_without_query() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        assert_eq!(
            account.canonical_resource("sow-container", Some("acme-sow.pdf"), &[]),
            "/sowdocs/sow-container/acme-sow.pdf"
        );
    }

    #[test]
    fn test_canonical_resource_sorts_query_parameters() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        assert_eq!(
            account.canonical_resource("sow-container", None, &[("restype", "container"), ("comp", "list")]),
            "/sowdocs/sow-container\ncomp:list\nrestype:container"
        );
    }

    #[test]
    fn test_string_to_sign_layout() {
        let sts = string_to_sign(
            "PUT",
            1024,
            "application/pdf",
            &[
                ("x-ms-version", "2021-08-06"),
                ("x-ms-date", "Sat, 30 Aug 2025 12:00:00 GMT"),
                ("x-ms-blob-type", "BlockBlob"),
            ],
            "/sowdocs/sow-container/acme-sow.pdf",
        );

        assert_eq!(
            sts,
            "PUT\n\n\n1024\n\napplication/pdf\n\n\n\n\n\n\n\
             x-ms-blob-type:BlockBlob\n\
             x-ms-date:Sat, 30 Aug 2025 12:00:00 GMT\n\
             x-ms-version:2021-08-06\n\
             /sowdocs/sow-container/acme-sow.pdf"
        );
    }

    #[test]
    fn test_string_to_sign_zero_length_is_empty_line() {
        let sts = string_to_sign("PUT", 0, "", &[], "/sowdocs/sow-container");
        assert!(sts.starts_with("PUT\n\n\n\n\n"));
    }

    #[test]
    fn test_signature_is_base64_hmac_sha256() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        let signature = account.sign("PUT\n\ntest").unwrap();
        let decoded = STANDARD.decode(signature).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        assert_eq!(
            account.sign("same input").unwrap(),
            account.sign("same input").unwrap()
        );
    }

    #[test]
    fn test_authorization_header_format() {
        let account = StorageAccount::from_connection_string(CONNECTION).unwrap();
        let header = account.authorization_header("PUT\n\ntest").unwrap();
        assert!(header.starts_with("SharedKey sowdocs:"));
    }
}
