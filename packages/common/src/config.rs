use std::path::PathBuf;

use serde::Deserialize;

/// Where blob content lives.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Chunked storage in the application database.
    #[default]
    Database,
    /// Sharded directory on local disk.
    Filesystem,
}

/// App-level blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Which blob store to open at startup. Default: database.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Base directory for the filesystem backend. Default: "./data/blobs".
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Chunk size in bytes for the database backend. Default: 255 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Maximum size of a single blob in bytes. Default: 64 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/blobs")
}
fn default_chunk_size() -> u32 {
    255 * 1024
}
fn default_max_blob_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            chunk_size: default_chunk_size(),
            max_blob_size: default_max_blob_size(),
        }
    }
}
