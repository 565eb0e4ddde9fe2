//! Route declaration and materialization.
//!
//! [`Routes`] collects route declarations, placeholder hooks and the
//! exception filter, then [`Routes::into_router`] turns the collection into
//! an [`axum::Router`]. Declaring is permissive: duplicate method/path pairs
//! are all recorded and the one declared last wins when the router is built.
//!
//! # Example
//! ```
//! use baton::binding::BindingRegistry;
//! use baton::context::CallContext;
//! use baton::dispatch::{Args, Endpoint, operation_fn};
//! use baton::error::HandlerError;
//! use baton::routing::Routes;
//! use std::sync::Arc;
//!
//! struct HealthController;
//!
//! let bindings = Arc::new(BindingRegistry::of::<HealthController>());
//! let routes = Routes::new().get(
//!     "/health",
//!     Endpoint::new(
//!         bindings,
//!         "check",
//!         operation_fn(|_args: Args, _context: CallContext| async move {
//!             Ok::<_, HandlerError>(serde_json::json!({ "ok": true }))
//!         }),
//!     ),
//! );
//! let app: axum::Router = routes.into_router();
//! # let _ = app;
//! ```

use axum::Router;
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use std::collections::HashMap;
use std::sync::Arc;
use strum_macros::Display;

use crate::binding::MethodKey;
use crate::context::IncomingRequest;
use crate::dispatch::Endpoint;
use crate::error::HttpError;
use crate::exception::{ExceptionFilter, HttpExceptionFilter};
use crate::hook::ParamHook;
use crate::status;

/// Largest request body the dispatcher will buffer
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The HTTP methods routes can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HttpMethod {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
    #[strum(serialize = "PUT")]
    Put,
    #[strum(serialize = "DELETE")]
    Delete,
}

impl HttpMethod {
    fn method_filter(&self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// One recorded route declaration
pub struct RouteRegistration {
    method: HttpMethod,
    path: String,
    endpoint: Arc<Endpoint>,
}

impl RouteRegistration {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type name of the controller class behind the endpoint
    pub fn controller(&self) -> &'static str {
        self.endpoint.bindings().controller().type_name()
    }

    /// Key of the controller method the route dispatches to
    pub fn operation(&self) -> MethodKey {
        self.endpoint.method()
    }
}

/// Builder for the route table of one application.
///
/// Paths use brace placeholders (`/items/{id}`). Hooks registered through
/// [`Routes::param`] apply to every route whose template mentions the
/// placeholder, including routes declared before the hook.
pub struct Routes {
    registrations: Vec<RouteRegistration>,
    hooks: Vec<(String, Arc<dyn ParamHook>)>,
    filter: Arc<dyn ExceptionFilter>,
}

impl Routes {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            hooks: Vec::new(),
            filter: Arc::new(HttpExceptionFilter),
        }
    }

    /// Declare a route for `method` on `path`
    pub fn route(
        mut self,
        method: HttpMethod,
        path: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        let path = path.into();
        tracing::debug!(
            "Registered route {} {} -> {}::{}",
            method,
            path,
            endpoint.bindings().controller().type_name(),
            endpoint.method()
        );
        self.registrations.push(RouteRegistration {
            method,
            path,
            endpoint: Arc::new(endpoint),
        });
        self
    }

    pub fn get(self, path: impl Into<String>, endpoint: Endpoint) -> Self {
        self.route(HttpMethod::Get, path, endpoint)
    }

    pub fn post(self, path: impl Into<String>, endpoint: Endpoint) -> Self {
        self.route(HttpMethod::Post, path, endpoint)
    }

    pub fn put(self, path: impl Into<String>, endpoint: Endpoint) -> Self {
        self.route(HttpMethod::Put, path, endpoint)
    }

    pub fn delete(self, path: impl Into<String>, endpoint: Endpoint) -> Self {
        self.route(HttpMethod::Delete, path, endpoint)
    }

    /// Register a hook for the path placeholder `name`.
    ///
    /// Hooks for one placeholder run in registration order; across
    /// placeholders they follow the order the template mentions them.
    pub fn param(mut self, name: impl Into<String>, hook: impl ParamHook + 'static) -> Self {
        self.hooks.push((name.into(), Arc::new(hook)));
        self
    }

    /// Replace the default [`HttpExceptionFilter`]
    pub fn with_exception_filter(mut self, filter: impl ExceptionFilter) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Every declaration recorded so far, duplicates included, in order
    pub fn registrations(&self) -> &[RouteRegistration] {
        &self.registrations
    }

    /// Materialize the declarations into an [`axum::Router`].
    ///
    /// For each method/path pair only the declaration made last is mounted.
    /// Routes sharing a path are merged onto one method router, so unbound
    /// methods on a known path answer 405.
    pub fn into_router(self) -> Router {
        let mut last: HashMap<(HttpMethod, &str), usize> = HashMap::new();
        for (i, registration) in self.registrations.iter().enumerate() {
            last.insert((registration.method, registration.path.as_str()), i);
        }

        let mut path_order: Vec<&str> = Vec::new();
        let mut by_path: HashMap<&str, Vec<&RouteRegistration>> = HashMap::new();
        for (i, registration) in self.registrations.iter().enumerate() {
            if last[&(registration.method, registration.path.as_str())] != i {
                continue;
            }
            let slot = by_path.entry(registration.path.as_str()).or_default();
            if slot.is_empty() {
                path_order.push(registration.path.as_str());
            }
            slot.push(registration);
        }

        let mut mounted = 0;
        let mut router = Router::new();
        for path in path_order {
            let placeholders = template_placeholders(path);
            let mut method_router = MethodRouter::new();
            for registration in by_path.remove(path).unwrap_or_default() {
                let bound = Arc::new(BoundRoute {
                    endpoint: Arc::clone(&registration.endpoint),
                    preset: status::preset_for(registration.method),
                    hooks: self.hooks_for(&placeholders),
                    filter: Arc::clone(&self.filter),
                });
                tracing::debug!(
                    "Mounted {} {} -> {}::{}",
                    registration.method,
                    path,
                    registration.controller(),
                    registration.operation()
                );
                let handler = move |request: Request| {
                    let bound = Arc::clone(&bound);
                    async move { bound.handle(request).await }
                };
                method_router = method_router.on(registration.method.method_filter(), handler);
                mounted += 1;
            }
            router = router.route(path, method_router);
        }

        tracing::info!("Mounted {} route(s)", mounted);
        router
    }

    /// Hooks applying to a route, in template order then registration order
    fn hooks_for(&self, placeholders: &[String]) -> Vec<(String, Arc<dyn ParamHook>)> {
        let mut resolved = Vec::new();
        for name in placeholders {
            for (hook_name, hook) in &self.hooks {
                if hook_name == name {
                    resolved.push((name.clone(), Arc::clone(hook)));
                }
            }
        }
        resolved
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new()
    }
}

/// One mounted route with everything dispatch needs resolved up front
struct BoundRoute {
    endpoint: Arc<Endpoint>,
    preset: Option<StatusCode>,
    hooks: Vec<(String, Arc<dyn ParamHook>)>,
    filter: Arc<dyn ExceptionFilter>,
}

impl BoundRoute {
    async fn handle(&self, request: Request) -> Response {
        let (mut parts, body) = request.into_parts();

        let raw_params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params,
            Err(rejection) => {
                return self.filter.catch(
                    HttpError::bad_request(format!("invalid path parameters: {rejection}")).into(),
                );
            }
        };
        let path_params: Vec<(String, String)> = raw_params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                return self.filter.catch(
                    HttpError::bad_request(format!("unable to read request body: {err}")).into(),
                );
            }
        };

        let request = Arc::new(IncomingRequest::new(
            parts.method,
            parts.uri,
            parts.headers,
            path_params,
            body,
        ));

        for (name, hook) in &self.hooks {
            let Some(value) = request.path_param(name) else {
                continue;
            };
            if let Err(error) = hook.inspect(value, Arc::clone(&request)).await {
                return self.filter.catch(error);
            }
        }

        self.endpoint
            .dispatch(request, self.preset, self.filter.as_ref())
            .await
    }
}

/// Placeholder names in `path`, in the order the template mentions them.
///
/// Understands axum's brace syntax: `{name}` captures one segment,
/// `{*name}` captures the rest, doubled braces are literals.
fn template_placeholders(path: &str) -> Vec<String> {
    let bytes = path.as_bytes();
    let mut names = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if bytes.get(i + 1) == Some(&b'{') {
                i += 2;
                continue;
            }
            if let Some(end) = path[i + 1..].find('}') {
                let name = &path[i + 1..i + 1 + end];
                let name = name.strip_prefix('*').unwrap_or(name);
                if !name.is_empty() {
                    names.push(name.to_string());
                }
                i += end + 2;
                continue;
            }
        }
        i += 1;
    }
    names
}
