use crate::binding::{BindingKind, ControllerId, MethodKey, ParameterBinding, SlotBinding};
use dashmap::DashMap;

/// Per-controller-class storage of binding declarations.
///
/// A registry is created alongside the controller instance
/// (`BindingRegistry::of::<MyController>()`) and populated through the
/// `bind_*` declarators while routes are wired up. Once serving starts the
/// registry is only ever read; there is no removal operation.
///
/// Storage is keyed by [`BindingKind`] and allocated lazily on the first
/// declaration of each kind. Parameter bindings keep registration order;
/// slot bindings are single-valued per kind and overwritten on
/// re-declaration.
///
/// # Example
/// ```
/// use baton::binding::{BindingKind, BindingRegistry};
///
/// struct ItemsController;
///
/// let registry = BindingRegistry::of::<ItemsController>();
/// registry
///     .bind_path_param("find_one", 0, "id")
///     .bind_query("find_one", 1, "verbose");
///
/// let bindings = registry.query(BindingKind::PathParam, "find_one");
/// assert_eq!(bindings.len(), 1);
/// assert_eq!(bindings[0].name.as_deref(), Some("id"));
/// ```
pub struct BindingRegistry {
    controller: ControllerId,
    params: DashMap<BindingKind, Vec<ParameterBinding>>,
    slots: DashMap<BindingKind, SlotBinding>,
}

impl BindingRegistry {
    /// Create the registry owned by controller class `C`
    pub fn of<C: 'static>() -> Self {
        Self {
            controller: ControllerId::of::<C>(),
            params: DashMap::new(),
            slots: DashMap::new(),
        }
    }

    /// Identity of the owning controller class
    pub fn controller(&self) -> ControllerId {
        self.controller
    }

    /// Append a parameter binding for `kind`.
    ///
    /// This is the low-level registration primitive: it never fails and does
    /// not validate the binding. The `bind_*` declarators layer the
    /// duplicate-position check on top.
    pub fn register(&self, kind: BindingKind, binding: ParameterBinding) {
        self.params.entry(kind).or_default().push(binding);
    }

    /// All bindings of `kind` declared for `method`, in registration order
    pub fn query(&self, kind: BindingKind, method: MethodKey) -> Vec<ParameterBinding> {
        self.params
            .get(&kind)
            .map(|list| {
                list.iter()
                    .filter(|binding| binding.method == method)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bind the path parameter `name` to argument `index` of `method`.
    ///
    /// # Panics
    /// Panics if another parameter binding already claims `index` on
    /// `method`.
    pub fn bind_path_param(
        &self,
        method: MethodKey,
        index: usize,
        name: impl Into<String>,
    ) -> &Self {
        self.claim_index(method, index, BindingKind::PathParam);
        let name = name.into();
        tracing::debug!(
            "Bound path param '{}' to {}::{} argument {}",
            name,
            self.controller.type_name(),
            method,
            index
        );
        self.register(
            BindingKind::PathParam,
            ParameterBinding {
                method,
                index,
                name: Some(name),
            },
        );
        self
    }

    /// Bind the query parameter `name` to argument `index` of `method`.
    ///
    /// # Panics
    /// Panics if another parameter binding already claims `index` on
    /// `method`.
    pub fn bind_query(&self, method: MethodKey, index: usize, name: impl Into<String>) -> &Self {
        self.claim_index(method, index, BindingKind::Query);
        let name = name.into();
        tracing::debug!(
            "Bound query param '{}' to {}::{} argument {}",
            name,
            self.controller.type_name(),
            method,
            index
        );
        self.register(
            BindingKind::Query,
            ParameterBinding {
                method,
                index,
                name: Some(name),
            },
        );
        self
    }

    /// Bind the parsed request body to argument `index` of `method`.
    ///
    /// # Panics
    /// Panics if another parameter binding already claims `index` on
    /// `method`.
    pub fn bind_body(&self, method: MethodKey, index: usize) -> &Self {
        self.claim_index(method, index, BindingKind::Body);
        tracing::debug!(
            "Bound request body to {}::{} argument {}",
            self.controller.type_name(),
            method,
            index
        );
        self.register(
            BindingKind::Body,
            ParameterBinding {
                method,
                index,
                name: None,
            },
        );
        self
    }

    /// Declare that methods of this class receive the live request through
    /// their call context. Re-declaring replaces the previous label.
    pub fn bind_request_slot(&self, slot: &'static str) -> &Self {
        tracing::debug!(
            "Bound request slot '{}' on {}",
            slot,
            self.controller.type_name()
        );
        self.slots.insert(BindingKind::RequestSlot, SlotBinding { slot });
        self
    }

    /// Declare that methods of this class receive the response handle through
    /// their call context. Re-declaring replaces the previous label.
    pub fn bind_response_slot(&self, slot: &'static str) -> &Self {
        tracing::debug!(
            "Bound response slot '{}' on {}",
            slot,
            self.controller.type_name()
        );
        self.slots
            .insert(BindingKind::ResponseSlot, SlotBinding { slot });
        self
    }

    /// The class-level request slot, if declared
    pub fn request_slot(&self) -> Option<SlotBinding> {
        self.slots.get(&BindingKind::RequestSlot).map(|slot| *slot)
    }

    /// The class-level response slot, if declared
    pub fn response_slot(&self) -> Option<SlotBinding> {
        self.slots.get(&BindingKind::ResponseSlot).map(|slot| *slot)
    }

    /// Every argument position of a method has at most one owner across the
    /// parameter kinds.
    fn claim_index(&self, method: MethodKey, index: usize, kind: BindingKind) {
        for existing_kind in [BindingKind::PathParam, BindingKind::Query, BindingKind::Body] {
            let Some(list) = self.params.get(&existing_kind) else {
                continue;
            };
            if list
                .iter()
                .any(|binding| binding.method == method && binding.index == index)
            {
                panic!(
                    "argument index {} on {}::{} is already bound as {}; cannot bind it again as {}",
                    index,
                    self.controller.type_name(),
                    method,
                    existing_kind,
                    kind
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestController;

    #[test]
    fn test_query_filters_by_method_and_preserves_order() {
        let registry = BindingRegistry::of::<TestController>();
        registry
            .bind_path_param("find_one", 1, "slug")
            .bind_path_param("find_one", 0, "id")
            .bind_path_param("remove", 0, "id");

        let bindings = registry.query(BindingKind::PathParam, "find_one");
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].index, 1);
        assert_eq!(bindings[0].name.as_deref(), Some("slug"));
        assert_eq!(bindings[1].index, 0);

        assert_eq!(registry.query(BindingKind::PathParam, "remove").len(), 1);
        assert!(registry.query(BindingKind::PathParam, "missing").is_empty());
    }

    #[test]
    fn test_kinds_are_kept_apart() {
        let registry = BindingRegistry::of::<TestController>();
        registry
            .bind_path_param("find_one", 0, "id")
            .bind_query("find_one", 1, "verbose")
            .bind_body("create", 0);

        assert_eq!(registry.query(BindingKind::PathParam, "find_one").len(), 1);
        assert_eq!(registry.query(BindingKind::Query, "find_one").len(), 1);
        assert!(registry.query(BindingKind::Body, "find_one").is_empty());

        let body = registry.query(BindingKind::Body, "create");
        assert_eq!(body.len(), 1);
        assert!(body[0].name.is_none());
    }

    #[test]
    fn test_slots_overwrite_instead_of_merging() {
        let registry = BindingRegistry::of::<TestController>();
        assert!(registry.request_slot().is_none());

        registry.bind_request_slot("req");
        registry.bind_request_slot("request");
        registry.bind_response_slot("res");

        assert_eq!(registry.request_slot().unwrap().slot, "request");
        assert_eq!(registry.response_slot().unwrap().slot, "res");
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn test_duplicate_index_same_kind_panics() {
        let registry = BindingRegistry::of::<TestController>();
        registry.bind_path_param("find_one", 0, "id");
        registry.bind_path_param("find_one", 0, "slug");
    }

    #[test]
    #[should_panic(expected = "already bound")]
    fn test_duplicate_index_across_kinds_panics() {
        let registry = BindingRegistry::of::<TestController>();
        registry.bind_path_param("find_one", 0, "id");
        registry.bind_query("find_one", 0, "verbose");
    }

    #[test]
    fn test_same_index_on_different_methods_is_fine() {
        let registry = BindingRegistry::of::<TestController>();
        registry.bind_path_param("find_one", 0, "id");
        registry.bind_path_param("remove", 0, "id");
    }

    #[test]
    fn test_raw_register_skips_validation() {
        let registry = BindingRegistry::of::<TestController>();
        for _ in 0..2 {
            registry.register(
                BindingKind::Query,
                ParameterBinding {
                    method: "find_one",
                    index: 0,
                    name: Some("page".to_string()),
                },
            );
        }
        assert_eq!(registry.query(BindingKind::Query, "find_one").len(), 2);
    }
}
