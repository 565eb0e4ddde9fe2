//! Pre-handler hooks keyed by path placeholder name.
//!
//! A hook registered for `"id"` runs before every handler whose route
//! template contains `{id}`, receiving the captured value. Hooks run in
//! template placeholder order, then registration order, and a hook error
//! halts dispatch before the handler is invoked.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::context::IncomingRequest;
use crate::error::HandlerError;

pub type HookResult = Result<(), HandlerError>;

/// Inspection of one captured path parameter before the handler runs.
///
/// Returning an error rejects the request; the error is forwarded to the
/// exception filter and the handler never runs.
///
/// # Example
/// ```
/// use baton::hook::{HookResult, ParamHook};
/// use baton::context::IncomingRequest;
/// use baton::error::HttpError;
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct NumericId;
///
/// #[async_trait]
/// impl ParamHook for NumericId {
///     async fn inspect(&self, value: &str, _request: Arc<IncomingRequest>) -> HookResult {
///         value
///             .parse::<u64>()
///             .map(|_| ())
///             .map_err(|_| HttpError::bad_request(format!("invalid id '{value}'")).into())
///     }
/// }
/// ```
#[async_trait]
pub trait ParamHook: Send + Sync {
    async fn inspect(&self, value: &str, request: Arc<IncomingRequest>) -> HookResult;
}

/// [`ParamHook`] backed by an async closure
pub struct ParamHookFn<F> {
    f: F,
}

/// Wrap an async closure as a [`ParamHook`].
///
/// The closure receives the captured value and the request snapshot by
/// ownership, so it can move both into its future.
pub fn param_hook_fn<F, Fut>(f: F) -> ParamHookFn<F>
where
    F: Fn(String, Arc<IncomingRequest>) -> Fut + Send + Sync,
    Fut: Future<Output = HookResult> + Send,
{
    ParamHookFn { f }
}

#[async_trait]
impl<F, Fut> ParamHook for ParamHookFn<F>
where
    F: Fn(String, Arc<IncomingRequest>) -> Fut + Send + Sync,
    Fut: Future<Output = HookResult> + Send,
{
    async fn inspect(&self, value: &str, request: Arc<IncomingRequest>) -> HookResult {
        (self.f)(value.to_string(), request).await
    }
}
