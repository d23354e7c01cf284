use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::student::{
    ApplicationQuery, StudentResponse, SubmitFormRequest, SubmitFormResponse,
};
use crate::services::student_store::StudentStore;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/submit-form",
    tag = "Students",
    operation_id = "submitForm",
    summary = "Submit an application form",
    description = "Creates a student record. `applicationNumber` is required and must be unique. \
        Keys outside the known form fields are stored as submitted. Document fields cannot be \
        set here; they are filled by `/upload`.",
    request_body = SubmitFormRequest,
    responses(
        (status = 201, description = "Record created", body = SubmitFormResponse),
        (status = 400, description = "Invalid form (VALIDATION_ERROR, MISSING_PARAMETER)", body = ErrorBody),
        (status = 409, description = "Application number already used (DUPLICATE_KEY)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(application_number))]
pub async fn submit_form(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitFormRequest>,
) -> Result<impl IntoResponse, AppError> {
    let form = payload.validate()?;
    tracing::Span::current().record("application_number", form.application_number.as_str());

    let model = StudentStore::new(&state.db).create(form).await.map_err(|e| {
        match AppError::from(e) {
            AppError::DuplicateKey(_) => {
                AppError::DuplicateKey("An application with this number already exists".into())
            }
            other => other,
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitFormResponse {
            message: "Student data submitted successfully!".into(),
            application_number: model.application_number,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/student",
    tag = "Students",
    operation_id = "getStudent",
    summary = "Fetch a student record",
    description = "An application number with no student record is answered with 404 \
        `RECORD_NOT_FOUND`, not 400.",
    params(ApplicationQuery),
    responses(
        (status = 200, description = "Student record", body = StudentResponse),
        (status = 400, description = "applicationNumber missing (MISSING_PARAMETER)", body = ErrorBody),
        (status = 404, description = "No such student (RECORD_NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(application_number))]
pub async fn get_student(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ApplicationQuery>,
) -> Result<Json<StudentResponse>, AppError> {
    let application_number = query.require()?;
    tracing::Span::current().record("application_number", application_number.as_str());

    let model = StudentStore::new(&state.db)
        .find_by_application_number(&application_number)
        .await?
        .ok_or(AppError::RecordNotFound(application_number))?;

    Ok(Json(model.into()))
}
