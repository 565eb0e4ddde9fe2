use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{HandlerError, HttpError};
use crate::exception::ExceptionFilter;

/// Default filter producing a JSON error envelope.
///
/// [`HttpError`] values keep their status and message; anything else is
/// answered with 500 and a generic message so internals never leak to the
/// client. The envelope carries the status, the message and an RFC 3339
/// timestamp.
#[derive(Default)]
pub struct HttpExceptionFilter;

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, error: HandlerError) -> Response {
        tracing::error!("Request failed: {:?}", error);

        let (status, message) = if let Some(http_error) = error.downcast_ref::<HttpError>() {
            (http_error.status(), http_error.message().to_string())
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        };

        (
            status,
            Json(json!({
                "statusCode": status.as_u16(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response()
    }
}
