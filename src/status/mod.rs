//! Method-derived response status defaults.

use axum::http::StatusCode;

use crate::routing::HttpMethod;

/// Status used when neither the route preset nor the handler set one
pub const DEFAULT_STATUS: StatusCode = StatusCode::OK;

/// The status a route declared with `method` starts from.
///
/// Creation routes answer 201 Created and deletion routes 204 No Content.
/// The preset is written to the response handle before the handler runs, so
/// a handler can still override it.
pub fn preset_for(method: HttpMethod) -> Option<StatusCode> {
    match method {
        HttpMethod::Post => Some(StatusCode::CREATED),
        HttpMethod::Delete => Some(StatusCode::NO_CONTENT),
        HttpMethod::Get | HttpMethod::Put => None,
    }
}

/// Whether a response with `status` must not carry a body.
///
/// Covers the 1xx range, 204 and 304. The dispatcher drops the serialized
/// payload for these statuses.
pub fn suppresses_body(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_cover_creation_and_deletion() {
        assert_eq!(preset_for(HttpMethod::Post), Some(StatusCode::CREATED));
        assert_eq!(preset_for(HttpMethod::Delete), Some(StatusCode::NO_CONTENT));
        assert_eq!(preset_for(HttpMethod::Get), None);
        assert_eq!(preset_for(HttpMethod::Put), None);
    }

    #[test]
    fn test_bodiless_statuses() {
        assert!(suppresses_body(StatusCode::NO_CONTENT));
        assert!(suppresses_body(StatusCode::NOT_MODIFIED));
        assert!(suppresses_body(StatusCode::CONTINUE));
        assert!(suppresses_body(StatusCode::SWITCHING_PROTOCOLS));

        assert!(!suppresses_body(StatusCode::OK));
        assert!(!suppresses_body(StatusCode::CREATED));
        assert!(!suppresses_body(StatusCode::NOT_FOUND));
    }
}
