//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Any `AppError` (or a type
//! converting into it) becomes an `HttpAppError` through `?` and renders with the same
//! status, body and logging.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Multipart, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use diary_core::{AppError, ErrorMetadata, LogLevel};
use diary_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Field name -> failure message, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from diary-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<PathRejection> for HttpAppError {
    fn from(rejection: PathRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid path parameter: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        )))
    }
}

/// Path extractor that rejects with our ErrorResponse format instead of axum's plain text.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ApiPath(inner))
    }
}

/// Query string extractor with the ErrorResponse rejection.
#[derive(Debug, Clone, Copy)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(inner) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ApiQuery(inner))
    }
}

/// Multipart extractor with the ErrorResponse rejection.
pub struct ApiMultipart(pub Multipart);

impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ApiMultipart(multipart))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

static PRODUCTION_MODE: AtomicBool = AtomicBool::new(false);

/// Set from `Config::is_production` when the router is built; hides error details when on.
pub fn set_production_mode(production: bool) {
    PRODUCTION_MODE.store(production, Ordering::Relaxed);
}

fn is_production_mode() -> bool {
    PRODUCTION_MODE.load(Ordering::Relaxed)
}

impl ErrorResponse {
    fn from_app_error(app_error: &AppError, hide_details: bool) -> Self {
        let (details, error_type) = if hide_details {
            (None, None)
        } else {
            (
                Some(app_error.detailed_message()),
                Some(app_error.error_type().to_string()),
            )
        };

        ErrorResponse {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
            fields: app_error.fields().cloned(),
        }
    }
}

fn render_error(app_error: &AppError, production: bool) -> Response {
    let status = StatusCode::from_u16(app_error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    log_error(app_error);

    // Details stay hidden in production and for sensitive errors; field messages are always shown.
    let hide_details = production || app_error.is_sensitive();
    let body = ErrorResponse::from_app_error(app_error, hide_details);

    (status, Json(body)).into_response()
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        render_error(&self.0, is_production_mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_unsupported() {
        let HttpAppError(app_err) = StorageError::UnsupportedType("a.txt".to_string()).into();
        match app_err {
            AppError::UnsupportedMediaType(msg) => assert_eq!(msg, "a.txt"),
            _ => panic!("Expected UnsupportedMediaType variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("Invalid key".to_string()).into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Invalid key"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_not_found_renders_404() {
        let response = HttpAppError(AppError::NotFound("Diary 1 not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_failure_renders_500() {
        let err = AppError::IoFailure {
            message: "Failed to delete directory images/1".into(),
            source: std::io::Error::other("busy"),
        };
        let response = HttpAppError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = AppError::Internal("connection string leaked".into());
        let body = ErrorResponse::from_app_error(&err, err.is_sensitive());
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    /// Serialized ErrorResponse carries "error", "code", "recoverable" and, for
    /// validation failures, a "fields" map.
    #[test]
    fn test_error_response_shape() {
        let err = AppError::invalid_field("title", "must not be blank");
        let body = ErrorResponse::from_app_error(&err, false);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["code"], "VALIDATION_FAILED");
        assert_eq!(json["recoverable"], false);
        assert_eq!(json["fields"]["title"], "must not be blank");
        assert_eq!(json["error_type"], "Validation");

        let plain = ErrorResponse::from_app_error(&AppError::NotFound("x".into()), true);
        let json = serde_json::to_value(&plain).expect("serialize");
        assert!(json.get("fields").is_none());
        assert!(json.get("details").is_none());
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_production_render_hides_details_but_keeps_fields() {
        let not_found = AppError::NotFound("Diary 7 not found".into());
        let json = body_json(render_error(&not_found, true)).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json.get("details").is_none());

        let json = body_json(render_error(&not_found, false)).await;
        assert!(json["details"].is_string());

        let invalid = AppError::invalid_field("content", "must not be blank");
        let json = body_json(render_error(&invalid, true)).await;
        assert_eq!(json["fields"]["content"], "must not be blank");
    }

    #[test]
    fn test_production_mode_follows_config_flag() {
        set_production_mode(true);
        assert!(is_production_mode());
        set_production_mode(false);
        assert!(!is_production_mode());
    }
}
