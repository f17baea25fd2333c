//! Transformation contexts
//!
//! [`TransformationContext`] is the read-only view every transformer gets:
//! the target, the original resource tree, its registration and the
//! expression resolver. The original tree is fixed when the context is
//! created and never changes during a walk, so a transformer can always ask
//! what an attribute originally was anywhere in the tree.
//!
//! [`ResourceTransformationContext`] adds the write side of a resource walk:
//! the output tree being built and two addresses, `current` in output space
//! and `read` in input space. They diverge as soon as a path transformer
//! renames or reshapes an element.

use std::fmt;
use std::ops::Deref;

use super::expression::{ExpressionSnapshot, TransformerExpressionResolver};
use super::logger::{attribute_warning_message, TransformersLogger};
use super::registry::ResolvedPolicy;
use super::resource::ResourceTransformer;
use super::target::TransformationTarget;
use crate::errors::{Result, TransformError};
use crate::model::{ModelValue, PathAddress, PathElement, Resource, ResourceRegistration};

#[derive(Clone, Copy)]
pub struct TransformationContext<'a> {
    target: &'a TransformationTarget,
    original: &'a Resource,
    registration: &'a ResourceRegistration,
    resolver: Option<&'a dyn TransformerExpressionResolver>,
}

impl<'a> TransformationContext<'a> {
    /// `original` and `registration` describe the whole tree from its root
    pub fn new(
        target: &'a TransformationTarget,
        original: &'a Resource,
        registration: &'a ResourceRegistration,
    ) -> Self {
        Self {
            target,
            original,
            registration,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn TransformerExpressionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn target(&self) -> &'a TransformationTarget {
        self.target
    }

    pub fn logger(&self) -> &'a TransformersLogger {
        self.target.logger()
    }

    pub fn original_root(&self) -> &'a Resource {
        self.original
    }

    pub fn root_registration(&self) -> &'a ResourceRegistration {
        self.registration
    }

    /// Original resource at an absolute address
    pub fn read_resource_from_root(&self, address: &PathAddress) -> Option<&'a Resource> {
        self.original.navigate(address)
    }

    /// Registration at an absolute address
    pub fn resource_registration(&self, address: &PathAddress) -> Option<&'a ResourceRegistration> {
        self.registration.sub_model(address)
    }

    /// Resolve expressions in `value` for a target that cannot
    ///
    /// Without a configured resolver only expressions with defaults resolve.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedExpression` for an expression with no value and no default.
    pub fn resolve_expressions(&self, value: &ModelValue) -> Result<ModelValue> {
        match self.resolver {
            Some(resolver) => resolver.resolve_expressions(value),
            None => ExpressionSnapshot::default().resolve_expressions(value),
        }
    }

    pub fn model_description(&self, address: &PathAddress) -> String {
        self.target.model_description(address)
    }

    /// Text describing a problem with `attributes` at `address`
    pub fn attribute_problem(
        &self,
        address: &PathAddress,
        operation: Option<&str>,
        message: &str,
        attributes: &[String],
    ) -> String {
        attribute_warning_message(
            address,
            operation,
            &self.model_description(address),
            message,
            attributes,
        )
    }

    /// Queue a warning for the target host
    pub fn log_warning(
        &self,
        address: &PathAddress,
        operation: Option<&str>,
        message: &str,
        attributes: &[String],
    ) {
        self.logger()
            .log_warning(self.attribute_problem(address, operation, message, attributes));
    }

    /// Fail with `RejectedAttributes` or queue warnings, for problems found
    /// while transforming a resource
    ///
    /// A target that tracks ignored resources gets a hard rejection. Any
    /// other target might ignore the resource anyway, so it only gets
    /// warnings and the walk goes on.
    ///
    /// # Errors
    ///
    /// Returns `RejectedAttributes` listing every problem.
    pub fn reject_or_warn(&self, address: &PathAddress, problems: &[AttributeProblem]) -> Result<()> {
        if problems.is_empty() {
            return Ok(());
        }
        if self.target.is_tracks_ignored_resources() {
            return Err(TransformError::RejectedAttributes {
                address: address.to_string(),
                host: self.target.host_name().to_string(),
                model: self.model_description(address),
                details: problems.iter().map(AttributeProblem::describe).collect(),
            });
        }
        for problem in problems {
            self.log_warning(address, None, &problem.message, &problem.attributes);
        }
        Ok(())
    }

    /// Failure description for an operation rejected because of `problems`
    pub fn operation_rejection(
        &self,
        address: &PathAddress,
        operation_name: &str,
        problems: &[AttributeProblem],
    ) -> String {
        problems
            .iter()
            .map(|p| self.attribute_problem(address, Some(operation_name), &p.message, &p.attributes))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Attributes failing one check, with the check's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeProblem {
    pub message: String,
    pub attributes: Vec<String>,
}

impl AttributeProblem {
    pub fn new(message: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            message: message.into(),
            attributes,
        }
    }

    pub fn describe(&self) -> String {
        format!("{} [{}]", self.message, self.attributes.join(", "))
    }
}

impl fmt::Debug for TransformationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationContext")
            .field("host", &self.target.host_name())
            .field("version", &self.target.version())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Output of one resource walk
///
/// Built strictly parent before child; each address, the root included, is
/// written once.
#[derive(Debug, Default)]
pub struct TransformedTree {
    root: Resource,
    root_written: bool,
}

impl TransformedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Resource {
        &self.root
    }

    pub fn into_resource(self) -> Resource {
        self.root
    }
}

/// Address-scoped context of a resource walk
///
/// Every context of one walk writes into the same [`TransformedTree`].
pub struct ResourceTransformationContext<'a, 'r> {
    base: TransformationContext<'a>,
    tree: &'r mut TransformedTree,
    current: PathAddress,
    read: PathAddress,
}

impl<'a, 'r> ResourceTransformationContext<'a, 'r> {
    /// Context positioned at the root of an empty output tree
    pub fn new(base: TransformationContext<'a>, tree: &'r mut TransformedTree) -> Self {
        Self {
            base,
            tree,
            current: PathAddress::empty(),
            read: PathAddress::empty(),
        }
    }

    pub fn base(&self) -> TransformationContext<'a> {
        self.base
    }

    /// Address in the output tree
    pub fn current_address(&self) -> &PathAddress {
        &self.current
    }

    /// Address in the original tree
    pub fn read_address(&self) -> &PathAddress {
        &self.read
    }

    /// Write the model of `resource` at `relative` below the current address
    ///
    /// Children are not copied; call `process_children` on the returned
    /// context to descend.
    ///
    /// # Panics
    ///
    /// Panics if the address contains a wildcard, its parent has not been
    /// written yet, or it has already been written.
    pub fn add_transformed_resource(
        &mut self,
        relative: &PathAddress,
        resource: &Resource,
    ) -> ResourceTransformationContext<'a, '_> {
        let current = self.current.append_address(relative);
        let read = self.read.append_address(relative);
        self.add_internal(&current, resource.clone_without_children());
        ResourceTransformationContext {
            base: self.base,
            tree: &mut *self.tree,
            current,
            read,
        }
    }

    /// Write the model of `resource` at an absolute output address
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::add_transformed_resource`].
    pub fn add_transformed_resource_from_root(
        &mut self,
        absolute: &PathAddress,
        resource: &Resource,
    ) -> ResourceTransformationContext<'a, '_> {
        self.add_internal(absolute, resource.clone_without_children());
        ResourceTransformationContext {
            base: self.base,
            tree: &mut *self.tree,
            current: absolute.clone(),
            read: self.read.clone(),
        }
    }

    /// Write `resource` with its whole subtree, untransformed
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::add_transformed_resource`].
    pub fn add_transformed_recursive_resource(
        &mut self,
        relative: &PathAddress,
        resource: &Resource,
    ) -> ResourceTransformationContext<'a, '_> {
        let current = self.current.append_address(relative);
        let read = self.read.append_address(relative);
        self.add_internal(&current, resource.clone());
        ResourceTransformationContext {
            base: self.base,
            tree: &mut *self.tree,
            current,
            read,
        }
    }

    fn add_internal(&mut self, address: &PathAddress, resource: Resource) {
        if address.is_multi_target() {
            panic!("cannot write a resource at wildcard address {}", address);
        }
        let Some(element) = address.last_element() else {
            if self.tree.root_written {
                panic!("duplicate resource address {}", address);
            }
            self.tree.root_written = true;
            self.tree.root.set_model(resource.model().clone());
            for (element, child) in resource.child_entries() {
                self.add_internal(&PathAddress::from(element), child.clone());
            }
            return;
        };
        let parent_address = address.parent();
        let Some(parent) = self.tree.root.navigate_mut(&parent_address) else {
            panic!("resource not found: {} (parent of {})", parent_address, address);
        };
        if parent.has_child(element) {
            panic!("duplicate resource address {}", address);
        }
        parent.register_child(element.clone(), resource);
    }

    /// Transform every child of `resource`, which lives at the read address
    ///
    /// # Errors
    ///
    /// Propagates the first error raised anywhere below.
    pub fn process_children(&mut self, resource: &Resource) -> Result<()> {
        for (element, child) in resource.child_entries() {
            self.process_child(&element, child)?;
        }
        Ok(())
    }

    /// Resolve and run the transformer for one child
    ///
    /// Ignored, discarded and alias children are skipped. A rejected child
    /// fails the walk when the target tracks ignored resources and is
    /// skipped with a warning otherwise. Without an explicit resource
    /// transformer, remote and runtime-only children are discarded and the
    /// rest pass through.
    ///
    /// # Errors
    ///
    /// Returns `RejectedResource` as described, or any error from the
    /// child's transformer.
    pub fn process_child(&mut self, element: &PathElement, child: &Resource) -> Result<()> {
        let read = self.read.append(element.clone());
        let target = self.base.target();
        if target.is_ignored_resource(&read) {
            tracing::debug!(address = %read, host = target.host_name(), "skipping ignored resource");
            return Ok(());
        }

        let resolved = target.resolve(&read);
        match resolved.policy() {
            ResolvedPolicy::Transform => {}
            ResolvedPolicy::Discard | ResolvedPolicy::Alias => return Ok(()),
            ResolvedPolicy::Reject => {
                if target.is_tracks_ignored_resources() {
                    return Err(TransformError::RejectedResource {
                        address: read.to_string(),
                    });
                }
                self.base.logger().log_warning(format!(
                    "Resource {} is rejected on the target host, and will need to be ignored on the host",
                    read
                ));
                return Ok(());
            }
        }

        let registration = self.base.resource_registration(&read);
        if registration.is_some_and(ResourceRegistration::is_alias) {
            return Ok(());
        }
        let transformer = match resolved.entry().and_then(|e| e.resource_transformer()) {
            Some(explicit) => explicit.clone(),
            None if registration.is_some_and(|r| r.is_remote() || r.is_runtime_only()) => {
                ResourceTransformer::Discard
            }
            None => ResourceTransformer::PassThrough,
        };

        let rewritten = resolved.path_transformer().transform_element(element);
        let current = self
            .current
            .append_address(&PathAddress::from_elements(rewritten));
        let mut child_context = ResourceTransformationContext {
            base: self.base,
            tree: &mut *self.tree,
            current,
            read: read.clone(),
        };
        transformer.transform_resource(&mut child_context, &read, child)
    }

    /// Original resource at `relative` below the read address
    pub fn read_resource(&self, relative: &PathAddress) -> Option<&'a Resource> {
        self.base
            .read_resource_from_root(&self.read.append_address(relative))
    }

    /// Already written output resource at `relative` below the current address
    pub fn read_transformed_resource(&self, relative: &PathAddress) -> Option<&Resource> {
        self.tree.root.navigate(&self.current.append_address(relative))
    }
}

impl<'a> Deref for ResourceTransformationContext<'a, '_> {
    type Target = TransformationContext<'a>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
