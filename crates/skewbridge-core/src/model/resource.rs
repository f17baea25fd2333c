use indexmap::IndexMap;

use super::address::{PathAddress, PathElement};
use super::value::ModelValue;

/// One node of the configuration/runtime tree
///
/// Children are keyed by type and then by name, both in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resource {
    model: ModelValue,
    children: IndexMap<String, IndexMap<String, Resource>>,
    proxy: bool,
    runtime: bool,
}

impl Resource {
    /// Create a resource with an empty object model
    pub fn new() -> Self {
        Self::with_model(ModelValue::object())
    }

    pub fn with_model(model: ModelValue) -> Self {
        Self {
            model,
            children: IndexMap::new(),
            proxy: false,
            runtime: false,
        }
    }

    pub fn model(&self) -> &ModelValue {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ModelValue {
        &mut self.model
    }

    pub fn set_model(&mut self, model: ModelValue) {
        self.model = model;
    }

    pub fn is_proxy(&self) -> bool {
        self.proxy
    }

    pub fn is_runtime(&self) -> bool {
        self.runtime
    }

    pub fn set_proxy(mut self, proxy: bool) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn set_runtime(mut self, runtime: bool) -> Self {
        self.runtime = runtime;
        self
    }

    /// Copy of this node with its model and flags but no children
    pub fn clone_without_children(&self) -> Self {
        Self {
            model: self.model.clone(),
            children: IndexMap::new(),
            proxy: self.proxy,
            runtime: self.runtime,
        }
    }

    pub fn child(&self, element: &PathElement) -> Option<&Resource> {
        self.children
            .get(&element.key)
            .and_then(|named| named.get(&element.value))
    }

    pub fn child_mut(&mut self, element: &PathElement) -> Option<&mut Resource> {
        self.children
            .get_mut(&element.key)
            .and_then(|named| named.get_mut(&element.value))
    }

    pub fn has_child(&self, element: &PathElement) -> bool {
        self.child(element).is_some()
    }

    /// Register a child, returning any child previously at that element
    pub fn register_child(&mut self, element: PathElement, child: Resource) -> Option<Resource> {
        self.children
            .entry(element.key)
            .or_default()
            .insert(element.value, child)
    }

    pub fn remove_child(&mut self, element: &PathElement) -> Option<Resource> {
        let named = self.children.get_mut(&element.key)?;
        let removed = named.shift_remove(&element.value);
        if named.is_empty() {
            self.children.shift_remove(&element.key);
        }
        removed
    }

    pub fn child_types(&self) -> Vec<&str> {
        self.children.keys().map(String::as_str).collect()
    }

    /// Children of one type as `(name, child)` pairs
    pub fn children(&self, child_type: &str) -> Vec<(&str, &Resource)> {
        self.children
            .get(child_type)
            .map(|named| named.iter().map(|(n, r)| (n.as_str(), r)).collect())
            .unwrap_or_default()
    }

    /// Every child as `(element, child)` pairs, types first then names
    pub fn child_entries(&self) -> Vec<(PathElement, &Resource)> {
        self.children
            .iter()
            .flat_map(|(child_type, named)| {
                named
                    .iter()
                    .map(move |(name, r)| (PathElement::new(child_type.clone(), name.clone()), r))
            })
            .collect()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Walk down a relative address
    pub fn navigate(&self, address: &PathAddress) -> Option<&Resource> {
        address
            .iter()
            .try_fold(self, |current, element| current.child(element))
    }

    pub fn navigate_mut(&mut self, address: &PathAddress) -> Option<&mut Resource> {
        let mut current = self;
        for element in address {
            current = current.child_mut(element)?;
        }
        Some(current)
    }
}
