//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use diary_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Diary API",
        version = "0.1.0",
        description = "Personal diary: entries with a title, text content and at most one image."
    ),
    paths(
        handlers::diary::list_diaries,
        handlers::diary::get_diary,
        handlers::diary::create_diary,
        handlers::diary::update_diary,
        handlers::diary::delete_diary,
        handlers::diary::get_diary_image,
        handlers::health::health_check,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        models::DiaryResponse,
        error::ErrorResponse,
        handlers::health::HealthCheckResponse,
    )),
    tags(
        (name = "diary", description = "Diary entries and their images"),
        (name = "health", description = "Liveness, readiness and dependency checks")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
