use std::path::PathBuf;

use serde::Deserialize;

/// Which blob store backend to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// Blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Largest accepted object in bytes. Default: 10 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    /// Prefix of every public object URL. Default: "/api/images".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub filesystem: FilesystemStorageConfig,
    /// Required when `backend = "s3"`.
    #[serde(default)]
    pub s3: Option<S3StorageConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemStorageConfig {
    /// Root directory of stored objects. Default: "./data/blobs".
    #[serde(default = "default_filesystem_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3StorageConfig {
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

fn default_max_blob_size() -> u64 {
    10 * 1024 * 1024
}
fn default_public_base_url() -> String {
    "/api/images".into()
}
fn default_filesystem_path() -> PathBuf {
    PathBuf::from("./data/blobs")
}
fn default_s3_region() -> String {
    "us-east-1".into()
}

impl Default for FilesystemStorageConfig {
    fn default() -> Self {
        Self {
            path: default_filesystem_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            max_blob_size: default_max_blob_size(),
            public_base_url: default_public_base_url(),
            filesystem: FilesystemStorageConfig::default(),
            s3: None,
        }
    }
}
