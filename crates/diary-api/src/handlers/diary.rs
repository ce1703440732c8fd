//! Diary entry handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diary_core::models::{CreateDiaryRequest, DiaryResponse, SearchQuery, UpdateDiaryRequest};
use validator::Validate;

use crate::error::{ApiMultipart, ApiPath, ApiQuery, ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_diary_form;

/// List entries, optionally only those whose title contains `title`
#[utoipa::path(
    get,
    path = "/diary",
    tag = "diary",
    params(SearchQuery),
    responses(
        (status = 200, description = "Diary entries in id order", body = Vec<DiaryResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(title = ?query.title))]
pub async fn list_diaries(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<DiaryResponse>>, HttpAppError> {
    query.validate().map_err(diary_core::AppError::from)?;

    let entries = state.diary.search(query.title.as_deref()).await?;

    Ok(Json(entries.into_iter().map(DiaryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/diary/{id}",
    tag = "diary",
    params(
        ("id" = i64, Path, description = "Diary entry ID")
    ),
    responses(
        (status = 200, description = "Diary entry found", body = DiaryResponse),
        (status = 404, description = "Diary entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_diary(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DiaryResponse>, HttpAppError> {
    let entry = state.diary.get_by_id(id).await?;
    Ok(Json(entry.into()))
}

/// Create an entry from a multipart form with `title`, `content` and an optional `image`
#[utoipa::path(
    post,
    path = "/diary",
    tag = "diary",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Diary entry created", body = DiaryResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_diary"))]
pub async fn create_diary(
    State(state): State<Arc<AppState>>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<DiaryResponse>), HttpAppError> {
    let form = extract_diary_form(multipart, state.config.max_image_size_bytes()).await?;

    let request = CreateDiaryRequest {
        title: form.title.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
    };

    let entry = state.diary.create(request, form.image).await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Partially update an entry; blank or missing fields keep their current value
#[utoipa::path(
    put,
    path = "/diary/{id}",
    tag = "diary",
    params(
        ("id" = i64, Path, description = "Diary entry ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Diary entry updated", body = DiaryResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Diary entry not found", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "update_diary"))]
pub async fn update_diary(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<DiaryResponse>, HttpAppError> {
    let form = extract_diary_form(multipart, state.config.max_image_size_bytes()).await?;

    let request = UpdateDiaryRequest {
        title: form.title,
        content: form.content,
    };

    let entry = state.diary.update(id, request, form.image).await?;

    Ok(Json(entry.into()))
}

#[utoipa::path(
    delete,
    path = "/diary/{id}",
    tag = "diary",
    params(
        ("id" = i64, Path, description = "Diary entry ID")
    ),
    responses(
        (status = 204, description = "Diary entry deleted (or did not exist)"),
        (status = 500, description = "Image cleanup or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete_diary(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, HttpAppError> {
    state.diary.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serve the entry's image with a content type derived from its extension
#[utoipa::path(
    get,
    path = "/diary/{id}/image",
    tag = "diary",
    params(
        ("id" = i64, Path, description = "Diary entry ID")
    ),
    responses(
        (status = 200, description = "Image bytes; Content-Type follows the file extension"),
        (status = 404, description = "Entry or image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_diary_image(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response, HttpAppError> {
    let image = state.diary.get_image(id).await?;

    tracing::debug!(
        file_name = %image.file_name,
        size_bytes = image.bytes.len(),
        "Serving diary image"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", image.file_name),
            ),
        ],
        Body::from(image.bytes),
    )
        .into_response())
}
