use chrono::{DateTime, Utc};
use common::DocumentField;
use common::storage::BlobInfo;
use serde::Serialize;
use uuid::Uuid;

use crate::services::upload::StagedDocument;

/// One stored document from an upload request.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileResponse {
    /// Blob identifier, as stored in the linked record field.
    pub id: Uuid,
    /// Field the document was linked to; absent for untagged parts.
    pub field_tag: Option<DocumentField>,
    #[schema(example = "photo.jpg")]
    pub original_filename: String,
    /// Stored name, used by the download URL.
    #[schema(example = "A100-photo.jpg")]
    pub filename: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub sha256: String,
}

impl From<StagedDocument> for UploadedFileResponse {
    fn from(doc: StagedDocument) -> Self {
        Self {
            id: doc.info.id.as_uuid(),
            field_tag: doc.field,
            original_filename: doc.original_filename,
            filename: doc.info.filename,
            size: doc.info.length,
            content_type: doc.info.content_type,
            sha256: doc.info.sha256,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "Files uploaded successfully!")]
    pub message: String,
    #[schema(example = "A100")]
    pub application_number: String,
    pub files: Vec<UploadedFileResponse>,
}

/// A stored blob belonging to a student.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    #[schema(example = "A100-photo.jpg")]
    pub filename: String,
    /// Field the blob was uploaded for.
    pub field_tag: Option<DocumentField>,
    /// Whether the student record currently links this blob.
    pub linked: bool,
    pub size: u64,
    pub content_type: Option<String>,
    pub sha256: String,
    pub upload_date: DateTime<Utc>,
    /// Relative URL that downloads exactly this blob.
    #[schema(example = "/students/A100/files/0190d2c4-0000-7000-8000-000000000000")]
    pub download_url: String,
}

impl DocumentResponse {
    pub fn new(info: BlobInfo, linked: bool) -> Self {
        let download_url = format!(
            "/students/{}/files/{}",
            encode_segment(&info.metadata.application_number),
            info.id
        );
        Self {
            id: info.id.as_uuid(),
            filename: info.filename,
            field_tag: info.metadata.field_tag,
            linked,
            size: info.length,
            content_type: info.content_type,
            sha256: info.sha256,
            upload_date: info.upload_date,
            download_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    #[schema(example = "A100")]
    pub application_number: String,
    pub documents: Vec<DocumentResponse>,
}

/// Percent-encode one URL path segment.
fn encode_segment(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
