use axum::response::Response;

use crate::error::HandlerError;

pub mod http;

pub use http::HttpExceptionFilter;

/// Terminal error handling for dispatched calls.
///
/// Every error surfaced while serving a route (a failed hook, a handler
/// error, an unserializable return value) is forwarded to the router's
/// filter, which must convert it into a complete response. Filters never
/// fail; the dispatcher has nothing to fall back to past this point.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Convert a forwarded error into the response sent to the client
    fn catch(&self, error: HandlerError) -> Response;
}
