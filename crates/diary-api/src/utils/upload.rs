//! Multipart form parsing for diary create and update requests

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use diary_core::AppError;
use diary_storage::UploadedImage;

pub const TITLE_FIELD: &str = "title";
pub const CONTENT_FIELD: &str = "content";
pub const IMAGE_FIELD: &str = "image";

/// Fields of a diary multipart form. Absent parts stay `None`.
#[derive(Debug, Default)]
pub struct DiaryForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<UploadedImage>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err))
    }
}

/// Read the `title`, `content` and `image` parts of a diary form.
/// Unknown parts are skipped; a repeated `image` part is rejected.
pub async fn extract_diary_form(
    mut multipart: Multipart,
    max_image_size: usize,
) -> Result<DiaryForm, AppError> {
    let mut form = DiaryForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            TITLE_FIELD => form.title = Some(field.text().await.map_err(multipart_error)?),
            CONTENT_FIELD => form.content = Some(field.text().await.map_err(multipart_error)?),
            IMAGE_FIELD => {
                if form.image.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple image fields are not allowed; send at most one field named 'image'"
                            .to_string(),
                    ));
                }

                let file_name = field.file_name().map(|s: &str| s.to_string());
                let content_type = field.content_type().map(|s: &str| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                validate_file_size(data.len(), max_image_size)?;

                form.image = Some(UploadedImage {
                    file_name,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        let limit = if max_size >= 1024 * 1024 {
            format!("{} MB", max_size / 1024 / 1024)
        } else {
            format!("{} bytes", max_size)
        };
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {}",
            limit
        )));
    }
    Ok(())
}
