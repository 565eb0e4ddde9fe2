use axum::http::StatusCode;
use thiserror::Error;

/// Type-erased error produced by a controller method or a parameter hook.
///
/// Anything that fails inside a handler flows through this alias into the
/// exception filter; the dispatcher never inspects it.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// An error that maps onto a concrete HTTP status.
///
/// Controller methods and hooks are free to fail with any error type, but
/// failing with an `HttpError` lets the default exception filter answer with
/// the intended status instead of a blanket 500.
///
/// # Example
/// ```
/// use baton::error::HttpError;
///
/// let err = HttpError::not_found("item 42 does not exist");
/// assert_eq!(err.status().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error with an explicit status code
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The HTTP status this error maps onto
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The human-readable message carried by this error
    pub fn message(&self) -> &str {
        &self.message
    }
}
