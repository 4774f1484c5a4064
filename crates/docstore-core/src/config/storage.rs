//! Blob storage and upload validation configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration shared by the blob store and the document service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every stored blob.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Declared content types accepted for upload.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Accepted filename extensions, lowercase without the dot.
    /// Empty means the extension is not checked.
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    /// Minimum age before an unreferenced blob may be pruned.
    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
            allowed_content_types: default_allowed_content_types(),
            allowed_extensions: Vec::new(),
            orphan_grace_seconds: default_orphan_grace(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    10_485_760 // 10 MB
}

fn default_allowed_content_types() -> Vec<String> {
    vec!["application/pdf".to_string()]
}

fn default_orphan_grace() -> u64 {
    3600
}
