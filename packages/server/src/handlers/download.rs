use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use common::DocumentField;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::models::document::{DocumentListResponse, DocumentResponse};
use crate::services::download::{
    blob_response, resolve_by_field, resolve_by_id, resolve_by_name,
};
use crate::services::student_store::StudentStore;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/download/{applicationNumber}/{filename}",
    tag = "Documents",
    operation_id = "downloadDocument",
    summary = "Download a document by name",
    description = "`filename` is the stored name (`A100-photo.jpg`) or the original filename \
        (`photo.jpg`). Only documents uploaded for `applicationNumber` are considered; when \
        several match, the most recent upload is returned.",
    params(
        ("applicationNumber" = String, Path, description = "Application number"),
        ("filename" = String, Path, description = "Stored or original filename"),
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 304, description = "Not modified (ETag match)"),
        (status = 404, description = "No such file (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "File storage not ready (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_by_name(
    State(state): State<AppState>,
    Path((application_number, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let store = state.blob_store.get()?;
    let info = resolve_by_name(store.as_ref(), &application_number, &filename).await?;
    blob_response(store.as_ref(), &info, &headers).await
}

#[utoipa::path(
    get,
    path = "/students/{applicationNumber}/documents",
    tag = "Documents",
    operation_id = "listDocuments",
    summary = "List a student's documents",
    description = "Every document uploaded for the student, oldest first. `linked` marks the \
        documents the record's fields currently point to.",
    params(("applicationNumber" = String, Path, description = "Application number")),
    responses(
        (status = 200, description = "Documents", body = DocumentListResponse),
        (status = 404, description = "No such student (RECORD_NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "File storage not ready (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    Path(application_number): Path<String>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let store = state.blob_store.get()?;
    let student = StudentStore::new(&state.db)
        .find_by_application_number(&application_number)
        .await?
        .ok_or_else(|| AppError::RecordNotFound(application_number.clone()))?;

    let linked: HashSet<Uuid> = DocumentField::ALL
        .iter()
        .filter_map(|field| student.document(*field))
        .collect();

    let documents = store
        .list_for_application(&application_number)
        .await?
        .into_iter()
        .map(|info| {
            let is_linked = linked.contains(&info.id.as_uuid());
            DocumentResponse::new(info, is_linked)
        })
        .collect();

    Ok(Json(DocumentListResponse {
        application_number,
        documents,
    }))
}

#[utoipa::path(
    get,
    path = "/students/{applicationNumber}/documents/{fieldTag}",
    tag = "Documents",
    operation_id = "downloadFieldDocument",
    summary = "Download the document linked to a field",
    description = "Follows the blob reference stored on the student record.",
    params(
        ("applicationNumber" = String, Path, description = "Application number"),
        ("fieldTag" = DocumentField, Path, description = "Document field tag"),
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 304, description = "Not modified (ETag match)"),
        (status = 400, description = "Unknown field (UNKNOWN_FIELD_TAG)", body = ErrorBody),
        (status = 404, description = "No such student or document (RECORD_NOT_FOUND, NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "File storage not ready (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_document(
    State(state): State<AppState>,
    Path((application_number, field_tag)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let field: DocumentField = field_tag.parse()?;
    let store = state.blob_store.get()?;
    let student = StudentStore::new(&state.db)
        .find_by_application_number(&application_number)
        .await?
        .ok_or_else(|| AppError::RecordNotFound(application_number.clone()))?;

    let info = resolve_by_field(store.as_ref(), &student, field).await?;
    blob_response(store.as_ref(), &info, &headers).await
}

#[utoipa::path(
    get,
    path = "/students/{applicationNumber}/files/{blobId}",
    tag = "Documents",
    operation_id = "downloadBlob",
    summary = "Download one stored document by identifier",
    description = "Serves exactly the blob named by `blobId`, including documents a later \
        upload has replaced. This is the `downloadUrl` of each listed document.",
    params(
        ("applicationNumber" = String, Path, description = "Application number"),
        ("blobId" = Uuid, Path, description = "Blob identifier"),
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 304, description = "Not modified (ETag match)"),
        (status = 400, description = "Malformed identifier (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No such file for this student (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "File storage not ready (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_blob(
    State(state): State<AppState>,
    Path((application_number, blob_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let store = state.blob_store.get()?;
    let info = resolve_by_id(store.as_ref(), &application_number, &blob_id).await?;
    blob_response(store.as_ref(), &info, &headers).await
}
