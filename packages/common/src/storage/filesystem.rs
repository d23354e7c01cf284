use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use super::error::StorageError;
use super::id::BlobId;
use super::info::{BlobInfo, NewBlob};
use super::traits::{BlobStore, BoxReader};

const TMP_DIR: &str = ".tmp";
const INFO_EXT: &str = "json";

/// Filesystem-backed blob store.
///
/// Blobs are stored in a sharded directory layout keyed by identifier:
/// `{base_path}/{shard}/{id}` holds the content and
/// `{base_path}/{shard}/{id}.json` holds the [`BlobInfo`].
/// The info file is written last, so a blob is only visible once its content
/// is complete.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(TMP_DIR)).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn shard_dir(&self, id: &BlobId) -> PathBuf {
        self.base_path.join(id.shard_prefix())
    }

    fn blob_path(&self, id: &BlobId) -> PathBuf {
        self.shard_dir(id).join(id.to_string())
    }

    fn info_path(&self, id: &BlobId) -> PathBuf {
        self.shard_dir(id).join(format!("{id}.{INFO_EXT}"))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(TMP_DIR)
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn read_info(path: &Path) -> Result<BlobInfo, StorageError> {
        let raw = fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_info(&self, info: &BlobInfo) -> Result<(), StorageError> {
        let temp_path = self.temp_path();
        let raw = serde_json::to_vec(info)?;
        if let Err(e) = fs::write(&temp_path, raw).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, self.info_path(&info.id)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Read an info file found while listing a shard.
    ///
    /// A concurrent delete can remove the file after it was listed; that
    /// entry is skipped.
    async fn read_listed_info(path: &Path) -> Result<Option<BlobInfo>, StorageError> {
        match Self::read_info(path).await {
            Ok(info) => Ok(Some(info)),
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Blob info removed during scan");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Read every info file in the store.
    async fn scan(&self) -> Result<Vec<BlobInfo>, StorageError> {
        let mut infos = Vec::new();
        let mut shards = fs::read_dir(&self.base_path).await?;
        while let Some(shard) = shards.next_entry().await? {
            if shard.file_name() == TMP_DIR || !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut entries = fs::read_dir(shard.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some(INFO_EXT) {
                    infos.extend(Self::read_listed_info(&path).await?);
                }
            }
        }
        Ok(infos)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn upload_stream(
        &self,
        blob: NewBlob,
        mut reader: BoxReader,
    ) -> Result<BlobInfo, StorageError> {
        let id = BlobId::generate();
        let temp_path = self.temp_path();
        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            hasher.update(&buf[..n]);
            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        fs::create_dir_all(self.shard_dir(&id)).await?;

        if let Err(e) = fs::rename(&temp_path, self.blob_path(&id)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let info = BlobInfo {
            id,
            filename: blob.filename,
            length: total_bytes,
            content_type: blob.content_type,
            sha256: hex::encode(hasher.finalize()),
            upload_date: Utc::now(),
            metadata: blob.metadata,
        };

        if let Err(e) = self.write_info(&info).await {
            if let Err(cleanup) = fs::remove_file(self.blob_path(&id)).await {
                warn!(%id, error = %cleanup, "Failed to remove orphaned blob content");
            }
            return Err(e);
        }

        Ok(info)
    }

    async fn info(&self, id: &BlobId) -> Result<BlobInfo, StorageError> {
        match Self::read_info(&self.info_path(id)).await {
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn find_by_name(
        &self,
        name: &str,
        application_number: Option<&str>,
    ) -> Result<Option<BlobInfo>, StorageError> {
        Ok(self
            .scan()
            .await?
            .into_iter()
            .filter(|info| info.filename == name)
            .filter(|info| {
                application_number.is_none_or(|n| info.metadata.application_number == n)
            })
            .max_by_key(|info| (info.upload_date, info.id)))
    }

    async fn list_for_application(
        &self,
        application_number: &str,
    ) -> Result<Vec<BlobInfo>, StorageError> {
        let mut infos: Vec<_> = self
            .scan()
            .await?
            .into_iter()
            .filter(|info| info.metadata.application_number == application_number)
            .collect();
        infos.sort_by_key(|info| (info.upload_date, info.id));
        Ok(infos)
    }

    async fn open_download_stream(&self, id: &BlobId) -> Result<BoxReader, StorageError> {
        if !fs::try_exists(self.info_path(id)).await? {
            return Err(StorageError::NotFound(id.to_string()));
        }
        match fs::File::open(self.blob_path(id)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &BlobId) -> Result<bool, StorageError> {
        match fs::remove_file(self.info_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        match fs::remove_file(self.blob_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}
