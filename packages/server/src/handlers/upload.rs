use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use tracing::{debug, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::document::{UploadResponse, UploadedFileResponse};
use crate::models::student::ApplicationQuery;
use crate::services::student_store::StudentStore;
use crate::services::upload::{UploadBatch, field_for_part, spool_field, upload_content_type};
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;

/// Request body limit for `/upload`, covering every part of one request.
pub fn upload_body_limit(max_body_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_body_size)
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Documents",
    operation_id = "uploadDocuments",
    summary = "Upload documents for a student",
    description = "Each multipart file part is named after the document field it fills \
        (`passportPhoto`, `admitCard`, `marksheet_10`, ...). Parts named `file` or `files` are \
        stored without being linked to a field. Files are stored as \
        `{applicationNumber}-{originalFilename}`. If any part fails, nothing from the request \
        is kept. An application number with no student record is answered with 404 \
        `RECORD_NOT_FOUND`, not 400.",
    params(ApplicationQuery),
    request_body(content_type = "multipart/form-data", description = "Document files keyed by field tag"),
    responses(
        (status = 201, description = "Documents stored and linked", body = UploadResponse),
        (status = 400, description = "Bad request (MISSING_PARAMETER, NO_FILES_PROVIDED, UNKNOWN_FIELD_TAG, VALIDATION_ERROR). A request with no multipart body is NO_FILES_PROVIDED.", body = ErrorBody),
        (status = 404, description = "No student has this application number (RECORD_NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 503, description = "File storage not ready (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, headers, multipart), fields(application_number))]
pub async fn upload_documents(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ApplicationQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let application_number = query.require()?;
    tracing::Span::current().record("application_number", application_number.as_str());

    let mut multipart = match multipart {
        Ok(_) if is_empty_body(&headers) => return Err(AppError::NoFilesProvided),
        Ok(multipart) => multipart,
        Err(e) => {
            debug!(reason = %e.body_text(), "Upload without a multipart body");
            return Err(AppError::NoFilesProvided);
        }
    };
    let store = state.blob_store.get()?;

    let student = StudentStore::new(&state.db)
        .find_by_application_number(&application_number)
        .await?
        .ok_or_else(|| AppError::RecordNotFound(application_number.clone()))?;

    let mut batch = UploadBatch::new(store, application_number.clone());
    if let Err(e) = stage_parts(
        &mut batch,
        &mut multipart,
        state.config.storage.max_blob_size,
        state.config.upload.max_body_size,
    )
    .await
    {
        batch.abort().await;
        return Err(e);
    }

    let staged = batch.commit(&state.db, &student).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Files uploaded successfully!".into(),
            application_number,
            files: staged.into_iter().map(UploadedFileResponse::from).collect(),
        }),
    ))
}

/// Store every file part of the request into `batch`.
///
/// Non-file parts with names outside the field tags are ignored.
async fn stage_parts(
    batch: &mut UploadBatch,
    multipart: &mut Multipart,
    max_blob_size: u64,
    max_body_size: usize,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_body_size))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let Some(file_name) = field.file_name().map(str::to_string) else {
            if field_for_part(&name).is_ok() {
                return Err(AppError::Validation(format!("Part '{name}' must be a file")));
            }
            debug!(part = %name, "Ignoring non-file part");
            continue;
        };

        let tag = field_for_part(&name)?;
        let original_filename = validate_upload_filename(&file_name)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_string();
        let content_type = upload_content_type(field.content_type(), &original_filename);

        let spooled = spool_field(field, max_blob_size).await?;
        batch
            .stage(tag, &original_filename, content_type, spooled.reader().await?)
            .await?;
    }
    Ok(())
}

fn is_empty_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

fn multipart_error(err: MultipartError, max_body_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            limit: max_body_size as u64,
        }
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}
