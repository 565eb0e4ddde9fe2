//! Binding metadata
//!
//! Declares which request facets (path parameters, query parameters, body,
//! request/response slots) feed which argument positions of a controller
//! method. Declarations are collected per controller class in a
//! [`BindingRegistry`] while the application is wired up, and read by the
//! dispatcher once requests start flowing.

use std::any::TypeId;
use strum_macros::Display;

mod registry;

pub use registry::BindingRegistry;

/// Identifies a controller method within its class.
///
/// The registry stores bindings for every method of a class side by side;
/// the key is what separates them when the dispatcher queries.
pub type MethodKey = &'static str;

/// The request facet a binding reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BindingKind {
    /// A named path parameter of the matched route
    PathParam,
    /// A named query-string parameter
    Query,
    /// The parsed request body
    Body,
    /// The live request object, exposed through the per-call context
    RequestSlot,
    /// The live response handle, exposed through the per-call context
    ResponseSlot,
}

/// One declared parameter binding: method, call-site position, lookup name.
///
/// `name` identifies the path or query parameter to read; it is `None` for
/// body bindings, which have nothing to look up.
#[derive(Debug, Clone)]
pub struct ParameterBinding {
    pub method: MethodKey,
    pub index: usize,
    pub name: Option<String>,
}

/// A class-level request or response slot declaration.
///
/// The label names the slot for diagnostics only; at request time the slot
/// materializes as a field of the per-call [`CallContext`](crate::context::CallContext),
/// never as state on the shared controller instance.
#[derive(Debug, Clone, Copy)]
pub struct SlotBinding {
    pub slot: &'static str,
}

/// Identity of a controller class: its `TypeId` plus a printable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ControllerId {
    pub fn of<C: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}
