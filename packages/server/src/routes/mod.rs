use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(student_routes())
        .merge(upload_routes(config))
        .merge(document_routes())
        .routes(routes!(handlers::health::health))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::student::submit_form))
        .routes(routes!(handlers::student::get_student))
}

fn upload_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::upload::upload_documents))
        .layer(handlers::upload::upload_body_limit(
            config.upload.max_body_size,
        ))
}

fn document_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::download::download_by_name))
        .routes(routes!(handlers::download::list_documents))
        .routes(routes!(handlers::download::download_document))
        .routes(routes!(handlers::download::download_blob))
}
