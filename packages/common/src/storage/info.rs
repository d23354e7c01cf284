use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::BlobId;
use crate::DocumentField;

/// Metadata attached to every stored blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Application number of the student the blob was uploaded for.
    pub application_number: String,
    /// Field the blob was uploaded for, if the upload carried a tag.
    pub field_tag: Option<DocumentField>,
}

/// Everything needed to store a new blob besides its content.
#[derive(Clone, Debug)]
pub struct NewBlob {
    /// Display name, conventionally `{applicationNumber}-{originalFilename}`.
    pub filename: String,
    pub content_type: Option<String>,
    pub metadata: BlobMetadata,
}

impl NewBlob {
    /// Describe an upload for `application_number`, deriving the display name and
    /// content type from the client's original filename.
    pub fn for_upload(
        application_number: &str,
        original_filename: &str,
        field_tag: Option<DocumentField>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            filename: display_name(application_number, original_filename),
            content_type,
            metadata: BlobMetadata {
                application_number: application_number.to_string(),
                field_tag,
            },
        }
    }
}

/// Stored blob description, as returned by a [`BlobStore`](super::BlobStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub id: BlobId,
    pub filename: String,
    /// Content length in bytes.
    pub length: u64,
    pub content_type: Option<String>,
    /// Lowercase hex SHA-256 of the content.
    pub sha256: String,
    pub upload_date: DateTime<Utc>,
    pub metadata: BlobMetadata,
}

/// Build the display name a blob is stored under.
pub fn display_name(application_number: &str, original_filename: &str) -> String {
    format!("{application_number}-{original_filename}")
}
