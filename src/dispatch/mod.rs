//! Argument assembly and handler invocation.
//!
//! An [`Endpoint`] pairs one controller method with the binding registry of
//! its class. Dispatching a matched request works through a fixed pipeline:
//! apply the method's status preset, assemble the positional argument list
//! from the declared bindings, invoke the operation with a fresh call
//! context, serialize the returned value as JSON, and answer with the
//! effective status. Any error along the way is forwarded to the exception
//! filter, which produces the response instead.

use async_trait::async_trait;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::binding::{BindingKind, BindingRegistry, MethodKey};
use crate::context::{CallContext, IncomingRequest, ResponseHandle};
use crate::error::{HandlerError, HttpError};
use crate::exception::ExceptionFilter;
use crate::status;

/// Positional argument list assembled for one call.
///
/// Position `i` holds the value bound to argument `i` of the handler, or
/// `None` when nothing was declared for that position or the declared source
/// was absent from the request. Path and query values arrive as JSON
/// strings (a repeated query key becomes an array of strings); a bound body
/// arrives as parsed JSON.
#[derive(Debug, Clone)]
pub struct Args {
    values: Vec<Option<Value>>,
}

impl Args {
    pub fn new(values: Vec<Option<Value>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` when absent or out of range
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(|value| value.as_ref())
    }

    pub fn as_slice(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Deserialize the value at `index`, rejecting absence.
    ///
    /// Fails with a 400-level [`HttpError`] when the position is empty or
    /// the value does not match `T`.
    pub fn required<T: DeserializeOwned>(&self, index: usize) -> Result<T, HandlerError> {
        match self.get(index) {
            Some(value) => deserialize_arg(value, index),
            None => Err(
                HttpError::bad_request(format!("missing required argument at position {index}"))
                    .into(),
            ),
        }
    }

    /// Deserialize the value at `index`, mapping absence to `None`
    pub fn optional<T: DeserializeOwned>(&self, index: usize) -> Result<Option<T>, HandlerError> {
        match self.get(index) {
            Some(value) => deserialize_arg(value, index).map(Some),
            None => Ok(None),
        }
    }

    /// Parse the text value at `index` with [`FromStr`].
    ///
    /// Path and query bindings deliver strings; this is the typed accessor
    /// for them. Fails with a 400-level [`HttpError`] on absence, on a
    /// non-text value, and on a parse error.
    pub fn parsed<T>(&self, index: usize) -> Result<T, HandlerError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.get(index).ok_or_else(|| {
            HttpError::bad_request(format!("missing required argument at position {index}"))
        })?;
        let raw = value.as_str().ok_or_else(|| {
            HttpError::bad_request(format!("argument at position {index} is not a text value"))
        })?;
        raw.parse().map_err(|err| {
            HttpError::bad_request(format!("invalid value '{raw}' at position {index}: {err}"))
                .into()
        })
    }
}

fn deserialize_arg<T: DeserializeOwned>(value: &Value, index: usize) -> Result<T, HandlerError> {
    serde_json::from_value(value.clone()).map_err(|err| {
        HttpError::bad_request(format!(
            "argument at position {index} does not match the expected shape: {err}"
        ))
        .into()
    })
}

/// What an operation produces: a JSON value to serialize, or an error to
/// forward to the exception filter
pub type OperationResult = Result<Value, HandlerError>;

/// A dispatchable controller method.
///
/// Implementations receive the assembled argument list and the per-call
/// context. Most callers go through [`operation_fn`] instead of implementing
/// this directly.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn call(&self, args: Args, context: CallContext) -> OperationResult;
}

/// [`Operation`] backed by an async closure
pub struct OperationFn<F> {
    f: F,
}

/// Wrap an async closure as an [`Operation`].
///
/// The closure may return any serializable type; the adapter converts it to
/// JSON and forwards conversion failures like any other handler error.
///
/// # Example
/// ```
/// use baton::dispatch::{operation_fn, Args};
/// use baton::context::CallContext;
/// use baton::error::HandlerError;
///
/// let op = operation_fn(|args: Args, _context: CallContext| async move {
///     let id: u64 = args.parsed(0)?;
///     Ok::<_, HandlerError>(serde_json::json!({ "id": id }))
/// });
/// ```
pub fn operation_fn<F, Fut, T>(f: F) -> OperationFn<F>
where
    F: Fn(Args, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, HandlerError>> + Send,
    T: Serialize,
{
    OperationFn { f }
}

#[async_trait]
impl<F, Fut, T> Operation for OperationFn<F>
where
    F: Fn(Args, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, HandlerError>> + Send,
    T: Serialize,
{
    async fn call(&self, args: Args, context: CallContext) -> OperationResult {
        let value = (self.f)(args, context).await?;
        serde_json::to_value(value).map_err(Into::into)
    }
}

/// One routable controller method together with its class's bindings
pub struct Endpoint {
    bindings: Arc<BindingRegistry>,
    method: MethodKey,
    operation: Arc<dyn Operation>,
}

impl Endpoint {
    pub fn new(
        bindings: Arc<BindingRegistry>,
        method: MethodKey,
        operation: impl Operation + 'static,
    ) -> Self {
        Self {
            bindings,
            method,
            operation: Arc::new(operation),
        }
    }

    pub fn method(&self) -> MethodKey {
        self.method
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// Run the dispatch pipeline for one matched request.
    ///
    /// `preset` is the status derived from the route's HTTP method; it is
    /// written to the response handle before the handler runs so the handler
    /// can still override it. Never fails: errors become the filter's
    /// response.
    pub(crate) async fn dispatch(
        &self,
        request: Arc<IncomingRequest>,
        preset: Option<StatusCode>,
        filter: &dyn ExceptionFilter,
    ) -> Response {
        tracing::debug!(
            "Dispatching {} {} to {}::{}",
            request.method(),
            request.uri(),
            self.bindings.controller().type_name(),
            self.method
        );

        let response = ResponseHandle::new();
        if let Some(preset) = preset {
            response.set_status(preset);
        }

        let args = match assemble_args(&self.bindings, self.method, &request) {
            Ok(args) => args,
            Err(error) => return filter.catch(error),
        };

        let context = CallContext::new(
            request,
            response.clone(),
            self.bindings.request_slot(),
            self.bindings.response_slot(),
        );

        let value = match self.operation.call(args, context).await {
            Ok(value) => value,
            Err(error) => return filter.catch(error),
        };

        let status = response.status().unwrap_or(status::DEFAULT_STATUS);
        if status::suppresses_body(status) {
            status.into_response()
        } else {
            (status, Json(value)).into_response()
        }
    }
}

/// Build the positional argument list for `method` from its declared
/// bindings and the matched request.
///
/// Arity is one past the highest declared position; undeclared positions in
/// between stay empty. A declared body that fails to parse as JSON is an
/// error; an empty body is merely absent.
pub(crate) fn assemble_args(
    bindings: &BindingRegistry,
    method: MethodKey,
    request: &IncomingRequest,
) -> Result<Args, HandlerError> {
    let path_bindings = bindings.query(BindingKind::PathParam, method);
    let query_bindings = bindings.query(BindingKind::Query, method);
    let body_bindings = bindings.query(BindingKind::Body, method);

    let arity = path_bindings
        .iter()
        .chain(&query_bindings)
        .chain(&body_bindings)
        .map(|binding| binding.index + 1)
        .max()
        .unwrap_or(0);
    let mut values: Vec<Option<Value>> = vec![None; arity];

    for binding in &path_bindings {
        let Some(name) = binding.name.as_deref() else {
            continue;
        };
        if let Some(value) = request.path_param(name) {
            values[binding.index] = Some(Value::String(value.to_string()));
        }
    }

    for binding in &query_bindings {
        let Some(name) = binding.name.as_deref() else {
            continue;
        };
        let matches = request.query_values(name);
        values[binding.index] = match matches.len() {
            0 => None,
            1 => Some(Value::String(matches[0].to_string())),
            _ => Some(Value::Array(
                matches
                    .into_iter()
                    .map(|value| Value::String(value.to_string()))
                    .collect(),
            )),
        };
    }

    for binding in &body_bindings {
        if request.body().is_empty() {
            continue;
        }
        let parsed: Value = serde_json::from_slice(request.body())
            .map_err(|err| HttpError::bad_request(format!("invalid JSON body: {err}")))?;
        values[binding.index] = Some(parsed);
    }

    Ok(Args::new(values))
}
