use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use common::storage::{BlobId, BlobInfo, BlobMetadata, BlobStore, BoxReader, NewBlob, StorageError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::entity::{file_chunk, stored_file};

/// Blob store kept inside the application database.
///
/// Content is split into fixed-size rows of `file_chunk`; `stored_file` holds
/// one descriptor per blob. A blob and all of its chunks are written in one
/// transaction, so a failed upload leaves nothing behind.
pub struct DatabaseBlobStore {
    db: DatabaseConnection,
    chunk_size: usize,
    max_size: u64,
}

impl DatabaseBlobStore {
    pub fn new(db: DatabaseConnection, chunk_size: u32, max_size: u64) -> Self {
        Self {
            db,
            chunk_size: chunk_size.max(1) as usize,
            max_size,
        }
    }

    async fn find_file(&self, id: &BlobId) -> Result<stored_file::Model, StorageError> {
        stored_file::Entity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(backend)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}

fn backend(err: DbErr) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn to_info(model: stored_file::Model) -> BlobInfo {
    BlobInfo {
        id: BlobId::from_uuid(model.id),
        filename: model.filename,
        length: u64::try_from(model.length).unwrap_or_default(),
        content_type: model.content_type,
        sha256: model.sha256,
        upload_date: model.upload_date,
        metadata: BlobMetadata {
            application_number: model.application_number,
            field_tag: model.field_tag,
        },
    }
}

/// Number of chunk rows a blob of `length` bytes occupies.
fn chunk_count(length: i64, chunk_size: i32) -> i32 {
    if length <= 0 || chunk_size <= 0 {
        return 0;
    }
    i32::try_from((length + i64::from(chunk_size) - 1) / i64::from(chunk_size)).unwrap_or(i32::MAX)
}

/// Read until `buf` is full or the reader is exhausted.
async fn read_chunk(reader: &mut BoxReader, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[async_trait]
impl BlobStore for DatabaseBlobStore {
    async fn upload_stream(
        &self,
        blob: NewBlob,
        mut reader: BoxReader,
    ) -> Result<BlobInfo, StorageError> {
        let id = BlobId::generate();
        let chunk_size = i32::try_from(self.chunk_size).unwrap_or(i32::MAX);
        let txn = self.db.begin().await.map_err(backend)?;

        // The descriptor goes in first so chunk rows can reference it; length
        // and hash are filled in once the content has been read.
        let file = stored_file::ActiveModel {
            id: Set(id.as_uuid()),
            filename: Set(blob.filename),
            length: Set(0),
            chunk_size: Set(chunk_size),
            upload_date: Set(Utc::now()),
            content_type: Set(blob.content_type),
            sha256: Set(String::new()),
            application_number: Set(blob.metadata.application_number),
            field_tag: Set(blob.metadata.field_tag),
        }
        .insert(&txn)
        .await
        .map_err(backend)?;

        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;
        let mut buf = vec![0u8; self.chunk_size];
        let mut n: i32 = 0;

        loop {
            let read = read_chunk(&mut reader, &mut buf).await?;
            if read == 0 {
                break;
            }

            total_bytes += read as u64;
            if total_bytes > self.max_size {
                // Dropping the transaction rolls back the rows written so far.
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            hasher.update(&buf[..read]);
            file_chunk::ActiveModel {
                files_id: Set(id.as_uuid()),
                n: Set(n),
                data: Set(buf[..read].to_vec()),
            }
            .insert(&txn)
            .await
            .map_err(backend)?;
            n += 1;
        }

        let mut file: stored_file::ActiveModel = file.into();
        file.length = Set(i64::try_from(total_bytes).unwrap_or(i64::MAX));
        file.sha256 = Set(hex::encode(hasher.finalize()));
        let file = file.update(&txn).await.map_err(backend)?;

        txn.commit().await.map_err(backend)?;
        debug!(blob_id = %id, chunks = n, bytes = total_bytes, "Stored blob in database");

        Ok(to_info(file))
    }

    async fn info(&self, id: &BlobId) -> Result<BlobInfo, StorageError> {
        self.find_file(id).await.map(to_info)
    }

    async fn find_by_name(
        &self,
        name: &str,
        application_number: Option<&str>,
    ) -> Result<Option<BlobInfo>, StorageError> {
        let mut select = stored_file::Entity::find().filter(stored_file::Column::Filename.eq(name));
        if let Some(application_number) = application_number {
            select = select.filter(stored_file::Column::ApplicationNumber.eq(application_number));
        }

        let latest = select
            .order_by_desc(stored_file::Column::UploadDate)
            .order_by_desc(stored_file::Column::Id)
            .one(&self.db)
            .await
            .map_err(backend)?;

        Ok(latest.map(to_info))
    }

    async fn list_for_application(
        &self,
        application_number: &str,
    ) -> Result<Vec<BlobInfo>, StorageError> {
        let files = stored_file::Entity::find()
            .filter(stored_file::Column::ApplicationNumber.eq(application_number))
            .order_by_asc(stored_file::Column::UploadDate)
            .order_by_asc(stored_file::Column::Id)
            .all(&self.db)
            .await
            .map_err(backend)?;

        Ok(files.into_iter().map(to_info).collect())
    }

    async fn open_download_stream(&self, id: &BlobId) -> Result<BoxReader, StorageError> {
        let file = self.find_file(id).await?;
        let total = chunk_count(file.length, file.chunk_size);
        let files_id = file.id;
        let db = self.db.clone();

        // Chunks are fetched one at a time as the reader is polled.
        let chunks = futures::stream::try_unfold(0i32, move |n| {
            let db = db.clone();
            async move {
                if n >= total {
                    return Ok(None);
                }
                let chunk = file_chunk::Entity::find_by_id((files_id, n))
                    .one(&db)
                    .await
                    .map_err(io::Error::other)?
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("chunk {n} of blob {files_id} is missing"),
                        )
                    })?;
                Ok::<_, io::Error>(Some((Bytes::from(chunk.data), n + 1)))
            }
        });

        Ok(Box::new(StreamReader::new(Box::pin(chunks))))
    }

    async fn delete(&self, id: &BlobId) -> Result<bool, StorageError> {
        let txn = self.db.begin().await.map_err(backend)?;

        file_chunk::Entity::delete_many()
            .filter(file_chunk::Column::FilesId.eq(id.as_uuid()))
            .exec(&txn)
            .await
            .map_err(backend)?;
        let result = stored_file::Entity::delete_by_id(id.as_uuid())
            .exec(&txn)
            .await
            .map_err(backend)?;

        txn.commit().await.map_err(backend)?;
        Ok(result.rows_affected > 0)
    }
}
