//! Per-call request and response state.
//!
//! Every dispatched call gets a fresh [`CallContext`]; nothing here is shared
//! between concurrent requests. The context exposes the live request and the
//! writable response handle only when the controller class declared the
//! matching slot through its binding registry.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use std::sync::{Arc, Mutex};

use crate::binding::SlotBinding;

/// Read-only snapshot of the request being dispatched.
///
/// Built by the router after path matching, before the handler runs. Query
/// pairs are decoded once at construction; a query string that fails to
/// decode is treated as empty.
#[derive(Debug)]
pub struct IncomingRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Vec<(String, String)>,
    query_pairs: Vec<(String, String)>,
    body: Bytes,
}

impl IncomingRequest {
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        path_params: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        let query_pairs = uri
            .query()
            .map(|raw| {
                serde_urlencoded::from_str::<Vec<(String, String)>>(raw).unwrap_or_else(|err| {
                    tracing::debug!("Discarding undecodable query string '{}': {}", raw, err);
                    Vec::new()
                })
            })
            .unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            path_params,
            query_pairs,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of `name`, decoded as UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Value captured for the path placeholder `name`
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All captured path placeholders in template order
    pub fn path_params(&self) -> &[(String, String)] {
        &self.path_params
    }

    /// Decoded query pairs in query-string order
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query_pairs
    }

    /// Every value the query string carries for `name`, in order
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query_pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Writable view of the response under construction.
///
/// Clones share one status cell, so the route preset, the handler, and the
/// dispatcher all see the same value. The last write before serialization
/// wins.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    status: Arc<Mutex<Option<StatusCode>>>,
}

impl ResponseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the status the dispatcher will respond with
    pub fn set_status(&self, status: StatusCode) {
        *self.status.lock().unwrap() = status.into();
    }

    /// Status written so far, if any
    pub fn status(&self) -> Option<StatusCode> {
        *self.status.lock().unwrap()
    }
}

/// Everything a handler may touch beyond its bound arguments.
///
/// The request and response accessors mirror the slot declarations of the
/// owning controller class: a class that never declared a response slot gets
/// `None` back, even though the dispatcher always carries the handle
/// internally.
#[derive(Debug, Clone)]
pub struct CallContext {
    request: Arc<IncomingRequest>,
    response: ResponseHandle,
    request_slot: Option<SlotBinding>,
    response_slot: Option<SlotBinding>,
}

impl CallContext {
    pub fn new(
        request: Arc<IncomingRequest>,
        response: ResponseHandle,
        request_slot: Option<SlotBinding>,
        response_slot: Option<SlotBinding>,
    ) -> Self {
        Self {
            request,
            response,
            request_slot,
            response_slot,
        }
    }

    /// The live request, if the class declared a request slot
    pub fn request(&self) -> Option<&IncomingRequest> {
        self.request_slot.map(|_| self.request.as_ref())
    }

    /// The response handle, if the class declared a response slot
    pub fn response(&self) -> Option<&ResponseHandle> {
        self.response_slot.as_ref().map(|_| &self.response)
    }

    /// Label the request slot was declared under
    pub fn request_slot(&self) -> Option<SlotBinding> {
        self.request_slot
    }

    /// Label the response slot was declared under
    pub fn response_slot(&self) -> Option<SlotBinding> {
        self.response_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sample_request(uri: &str) -> IncomingRequest {
        IncomingRequest::new(
            Method::GET,
            uri.parse().unwrap(),
            HeaderMap::new(),
            vec![("id".to_string(), "42".to_string())],
            Bytes::new(),
        )
    }

    #[test]
    fn test_path_param_lookup() {
        let request = sample_request("/items/42");
        assert_eq!(request.path_param("id"), Some("42"));
        assert_eq!(request.path_param("slug"), None);
        assert_eq!(request.path(), "/items/42");
    }

    #[test]
    fn test_header_lookup_decodes_the_first_value() {
        let mut headers = HeaderMap::new();
        headers.append("x-client", HeaderValue::from_static("alpha"));
        headers.append("x-client", HeaderValue::from_static("beta"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xfe\xff").unwrap());
        let request = IncomingRequest::new(
            Method::GET,
            "/items".parse().unwrap(),
            headers,
            Vec::new(),
            Bytes::new(),
        );

        assert_eq!(request.header("x-client"), Some("alpha"));
        assert_eq!(request.header("X-Client"), Some("alpha"));
        assert_eq!(request.header("x-binary"), None);
        assert_eq!(request.header("x-missing"), None);
        assert_eq!(request.headers().get_all("x-client").iter().count(), 2);
    }

    #[test]
    fn test_query_values_keep_repeats_in_order() {
        let request = sample_request("/items?tag=a&verbose=1&tag=b");
        assert_eq!(request.uri().query(), Some("tag=a&verbose=1&tag=b"));
        assert_eq!(request.query_values("tag"), vec!["a", "b"]);
        assert_eq!(request.query_values("verbose"), vec!["1"]);
        assert!(request.query_values("missing").is_empty());
    }

    #[test]
    fn test_absent_query_string_decodes_to_nothing() {
        let request = sample_request("/items");
        assert!(request.query_pairs().is_empty());
    }

    #[test]
    fn test_query_decoding_handles_percent_escapes() {
        let request = sample_request("/items?name=a%20b");
        assert_eq!(request.query_values("name"), vec!["a b"]);
    }

    #[test]
    fn test_response_handle_shares_status_across_clones() {
        let handle = ResponseHandle::new();
        let clone = handle.clone();
        assert_eq!(clone.status(), None);

        handle.set_status(StatusCode::CREATED);
        assert_eq!(clone.status(), Some(StatusCode::CREATED));

        clone.set_status(StatusCode::NO_CONTENT);
        assert_eq!(handle.status(), Some(StatusCode::NO_CONTENT));
    }

    #[test]
    fn test_context_gates_access_on_slot_declarations() {
        let request = Arc::new(sample_request("/items/42"));
        let bare = CallContext::new(request.clone(), ResponseHandle::new(), None, None);
        assert!(bare.request().is_none());
        assert!(bare.response().is_none());

        let full = CallContext::new(
            request,
            ResponseHandle::new(),
            Some(SlotBinding { slot: "request" }),
            Some(SlotBinding { slot: "response" }),
        );
        assert_eq!(full.request().unwrap().path_param("id"), Some("42"));
        full.response().unwrap().set_status(StatusCode::ACCEPTED);
        assert_eq!(full.request_slot().unwrap().slot, "request");
        assert_eq!(full.response_slot().unwrap().slot, "response");
    }
}
