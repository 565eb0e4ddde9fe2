//! # Baton
//!
//! A declarative controller-routing layer for axum with metadata-driven
//! parameter binding.
//!
//! Baton keeps routing knowledge out of handler bodies. A controller class
//! declares, in a [`binding::BindingRegistry`], where each argument of each
//! method comes from (a path placeholder, a query parameter, the request
//! body) and whether its methods see the live request or the writable
//! response handle. Routes pair those declarations with handler closures;
//! the dispatcher assembles the positional argument list, invokes the
//! handler, serializes the returned value as JSON and answers with a status
//! derived from the HTTP method unless the handler overrides it.
//!
//! ## Features
//!
//! - **Declarative Bindings**: NestJS-style parameter declarations kept in an
//!   explicit per-class registry instead of handler signatures
//! - **Positional Argument Assembly**: path, query and body values delivered
//!   as one argument list with typed accessors
//! - **Per-call Context**: request and response state built fresh for every
//!   dispatch, gated by the class's slot declarations
//! - **Placeholder Hooks**: pre-handler hooks keyed by path placeholder name
//! - **Status Presets**: 201 for creation routes, 204 for deletion routes,
//!   overridable through the response handle
//! - **Exception Filters**: every dispatch error funneled through one
//!   replaceable filter
//!
//! ## Quick Start
//!
//! ```rust
//! use baton::prelude::*;
//!
//! struct ItemsController;
//!
//! // 1. Declare where the handler's arguments come from
//! let bindings = Arc::new(BindingRegistry::of::<ItemsController>());
//! bindings.bind_path_param("find_one", 0, "id");
//!
//! // 2. Pair the declarations with the handler
//! let routes = Routes::new().get(
//!     "/items/{id}",
//!     Endpoint::new(
//!         Arc::clone(&bindings),
//!         "find_one",
//!         operation_fn(|args: Args, _context: CallContext| async move {
//!             let id: u64 = args.parsed(0)?;
//!             Ok::<_, HandlerError>(serde_json::json!({ "id": id }))
//!         }),
//!     ),
//! );
//!
//! // 3. Materialize and serve like any axum router
//! let app: Router = routes.into_router();
//! # let _ = app;
//! ```

pub mod binding;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod exception;
pub mod hook;
pub mod routing;
pub mod status;

// Re-export core types
pub use binding::{
    BindingKind, BindingRegistry, ControllerId, MethodKey, ParameterBinding, SlotBinding,
};
pub use context::{CallContext, IncomingRequest, ResponseHandle};
pub use dispatch::{Args, Endpoint, Operation, OperationResult, operation_fn};
pub use error::{HandlerError, HttpError};
pub use exception::{ExceptionFilter, HttpExceptionFilter};
pub use hook::{HookResult, ParamHook, param_hook_fn};
pub use routing::{HttpMethod, RouteRegistration, Routes};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use baton::prelude::*;
/// ```
pub mod prelude {
    pub use crate::binding::{
        BindingKind, BindingRegistry, ControllerId, MethodKey, ParameterBinding, SlotBinding,
    };
    pub use crate::context::{CallContext, IncomingRequest, ResponseHandle};
    pub use crate::dispatch::{Args, Endpoint, Operation, OperationResult, operation_fn};
    pub use crate::error::{HandlerError, HttpError};
    pub use crate::exception::{ExceptionFilter, HttpExceptionFilter};
    pub use crate::hook::{HookResult, ParamHook, param_hook_fn};
    pub use crate::routing::{HttpMethod, RouteRegistration, Routes};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
