use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::id::BlobId;
use super::info::{BlobInfo, NewBlob};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Blob storage addressed by generated identifiers.
///
/// Names are display metadata only: several blobs may share one.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return the new blob's info.
    async fn upload(&self, blob: NewBlob, data: &[u8]) -> Result<BlobInfo, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.upload_stream(blob, reader).await
    }

    /// Store data from an async reader and return the new blob's info.
    async fn upload_stream(
        &self,
        blob: NewBlob,
        reader: BoxReader,
    ) -> Result<BlobInfo, StorageError>;

    /// Look up a blob by identifier.
    async fn info(&self, id: &BlobId) -> Result<BlobInfo, StorageError>;

    /// Find the most recently uploaded blob with the given display name,
    /// optionally restricted to one application number.
    async fn find_by_name(
        &self,
        name: &str,
        application_number: Option<&str>,
    ) -> Result<Option<BlobInfo>, StorageError>;

    /// All blobs uploaded for an application number, oldest first.
    async fn list_for_application(
        &self,
        application_number: &str,
    ) -> Result<Vec<BlobInfo>, StorageError>;

    /// Stream a blob's content.
    async fn open_download_stream(&self, id: &BlobId) -> Result<BoxReader, StorageError>;

    /// Retrieve all bytes of a blob.
    async fn download(&self, id: &BlobId) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.open_download_stream(id).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, id: &BlobId) -> Result<bool, StorageError>;
}
