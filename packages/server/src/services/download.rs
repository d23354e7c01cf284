use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::DocumentField;
use common::storage::{BlobId, BlobInfo, BlobStore, display_name};
use tokio_util::io::ReaderStream;

use crate::entity::student;
use crate::error::AppError;

/// Find the blob a download URL names.
///
/// `filename` may be the stored display name (`A100-photo.jpg`) or the
/// original filename (`photo.jpg`). Lookup is limited to blobs uploaded for
/// `application_number`; the newest match wins.
pub async fn resolve_by_name(
    store: &dyn BlobStore,
    application_number: &str,
    filename: &str,
) -> Result<BlobInfo, AppError> {
    if let Some(info) = store.find_by_name(filename, Some(application_number)).await? {
        return Ok(info);
    }

    let prefixed = display_name(application_number, filename);
    store
        .find_by_name(&prefixed, Some(application_number))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File '{filename}' not found")))
}

/// Find the blob linked to `field` on a student record.
pub async fn resolve_by_field(
    store: &dyn BlobStore,
    student: &student::Model,
    field: DocumentField,
) -> Result<BlobInfo, AppError> {
    let id = student.document(field).ok_or_else(|| {
        AppError::NotFound(format!(
            "No {field} uploaded for '{}'",
            student.application_number
        ))
    })?;
    Ok(store.info(&BlobId::from_uuid(id)).await?)
}

/// Find a blob by identifier, only if it was uploaded for
/// `application_number`.
pub async fn resolve_by_id(
    store: &dyn BlobStore,
    application_number: &str,
    blob_id: &str,
) -> Result<BlobInfo, AppError> {
    let id: BlobId = blob_id.parse()?;
    let info = store.info(&id).await?;
    if info.metadata.application_number != application_number {
        return Err(AppError::NotFound(format!("File '{id}' not found")));
    }
    Ok(info)
}

/// Stream a blob back to the client.
///
/// Honours `If-None-Match` against the content hash.
pub async fn blob_response(
    store: &dyn BlobStore,
    info: &BlobInfo,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let etag_value = format!("\"{}\"", info.sha256);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let reader = store.open_download_stream(&info.id).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = info.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&info.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, info.length.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&info.filename),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, no-cache")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// `Content-Disposition` with an ASCII fallback and an RFC 5987 `filename*`.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
