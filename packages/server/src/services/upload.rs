use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::Field;
use common::DocumentField;
use common::storage::{BlobInfo, BlobStore, BoxReader, NewBlob, StorageError};
use sea_orm::ConnectionTrait;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity::student;
use crate::error::AppError;
use crate::services::student_store::StudentStore;

/// Part names accepted as documents that are not linked to a field.
const UNTAGGED_PART_NAMES: &[&str] = &["file", "files"];

/// Map a multipart part name to the field it fills.
///
/// `Ok(None)` means an untagged document.
pub fn field_for_part(name: &str) -> Result<Option<DocumentField>, AppError> {
    if UNTAGGED_PART_NAMES.contains(&name) {
        return Ok(None);
    }
    Ok(Some(name.parse::<DocumentField>()?))
}

/// A blob written during an upload request.
#[derive(Debug, Clone)]
pub struct StagedDocument {
    pub field: Option<DocumentField>,
    pub original_filename: String,
    pub info: BlobInfo,
}

/// The blobs written by one upload request.
///
/// Blobs are stored as parts arrive; the student record is updated once, in
/// [`commit`](Self::commit). Any failure before the record update succeeds
/// deletes every blob staged so far.
pub struct UploadBatch {
    store: Arc<dyn BlobStore>,
    application_number: String,
    staged: Vec<StagedDocument>,
}

impl UploadBatch {
    pub fn new(store: Arc<dyn BlobStore>, application_number: impl Into<String>) -> Self {
        Self {
            store,
            application_number: application_number.into(),
            staged: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Store one document under `{applicationNumber}-{originalFilename}`.
    pub async fn stage(
        &mut self,
        field: Option<DocumentField>,
        original_filename: &str,
        content_type: Option<String>,
        reader: BoxReader,
    ) -> Result<&StagedDocument, StorageError> {
        let blob = NewBlob::for_upload(
            &self.application_number,
            original_filename,
            field,
            content_type,
        );
        let info = self.store.upload_stream(blob, reader).await?;
        info!(
            blob_id = %info.id,
            filename = %info.filename,
            field = field.map(|f| f.as_str()).unwrap_or("-"),
            bytes = info.length,
            "Document stored"
        );

        self.staged.push(StagedDocument {
            field,
            original_filename: original_filename.to_string(),
            info,
        });
        Ok(&self.staged[self.staged.len() - 1])
    }

    /// Link every tagged document to `student` in a single record update.
    ///
    /// When one request carries the same tag twice, the later part is linked.
    pub async fn commit<C: ConnectionTrait>(
        self,
        conn: &C,
        student: &student::Model,
    ) -> Result<Vec<StagedDocument>, AppError> {
        if self.staged.is_empty() {
            return Err(AppError::NoFilesProvided);
        }

        let links: Vec<_> = self
            .staged
            .iter()
            .filter_map(|doc| doc.field.map(|field| (field, doc.info.id)))
            .collect();

        match StudentStore::new(conn).save_documents(student.id, &links).await {
            Ok(Some(_)) => {
                info!(
                    application_number = %self.application_number,
                    linked = links.len(),
                    stored = self.staged.len(),
                    "Documents linked to student record"
                );
                Ok(self.staged)
            }
            Ok(None) => {
                let application_number = self.application_number.clone();
                self.abort().await;
                Err(AppError::RecordNotFound(application_number))
            }
            Err(e) => {
                self.abort().await;
                Err(e.into())
            }
        }
    }

    /// Delete every blob staged by this request.
    pub async fn abort(self) {
        if self.staged.is_empty() {
            return;
        }
        info!(
            application_number = %self.application_number,
            blobs = self.staged.len(),
            "Removing documents from failed upload"
        );
        for doc in &self.staged {
            if let Err(e) = self.store.delete(&doc.info.id).await {
                warn!(blob_id = %doc.info.id, error = %e, "Failed to remove staged blob");
            }
        }
    }
}

/// Content type for an uploaded part: the client's declaration, or a guess
/// from the filename when the client sent none or a generic one.
pub fn upload_content_type(declared: Option<&str>, filename: &str) -> Option<String> {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => Some(ct.to_string()),
        _ => mime_guess::from_path(filename)
            .first()
            .map(|m| m.essence_str().to_string())
            .or_else(|| declared.map(str::to_string)),
    }
}

/// A multipart field spooled to a temp file, removed on drop.
pub struct SpooledField {
    path: PathBuf,
}

impl SpooledField {
    /// Open the spooled content for reading.
    pub async fn reader(&self) -> Result<BoxReader, AppError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        Ok(Box::new(file))
    }
}

impl Drop for SpooledField {
    fn drop(&mut self) {
        // Best effort.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Copy a multipart field to a temp file, enforcing `max_size`.
///
/// The field borrows the request body, so it cannot be handed to the blob
/// store directly as an owned reader.
pub async fn spool_field(mut field: Field<'_>, max_size: u64) -> Result<SpooledField, AppError> {
    let spooled = SpooledField {
        path: std::env::temp_dir().join(format!("admissions-upload-{}", Uuid::new_v4())),
    };

    let mut temp_file = tokio::fs::File::create(&spooled.path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    let mut total_size: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        total_size += chunk.len() as u64;
        if total_size > max_size {
            return Err(AppError::PayloadTooLarge { limit: max_size });
        }
        temp_file
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    temp_file
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

    Ok(spooled)
}
