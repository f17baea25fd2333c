//! Ready-made attribute policies
//!
//! Each policy is usable as a resource transformer, as an operation
//! transformer, and as one link of a [`ChainedResourceTransformer`].

use std::sync::Arc;

use super::checker::{contains_expression, MESSAGE_NOT_UNDERSTOOD, MESSAGE_NO_EXPRESSIONS};
use super::context::{AttributeProblem, ResourceTransformationContext, TransformationContext};
use super::operation::{OperationTransformerHandler, TransformedOperation};
use super::resource::ResourceTransformerHandler;
use crate::errors::Result;
use crate::model::operation::{operation_name, NAME, UNDEFINE_ATTRIBUTE, VALUE, WRITE_ATTRIBUTE};
use crate::model::{ModelValue, PathAddress, Resource};

/// One link of a [`ChainedResourceTransformer`]
///
/// Links edit a working copy of the resource (model and flags, no children)
/// in turn; the result is written once after the last link.
pub trait ChainedResourceTransformerEntry: Send + Sync {
    /// # Errors
    ///
    /// Returns an error to abort the whole chain.
    fn transform_resource(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct ChainedResourceTransformer {
    entries: Vec<Arc<dyn ChainedResourceTransformerEntry>>,
}

impl ChainedResourceTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, entry: impl ChainedResourceTransformerEntry + 'static) -> Self {
        self.entries.push(Arc::new(entry));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChainedResourceTransformerEntry for ChainedResourceTransformer {
    fn transform_resource(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()> {
        for entry in &self.entries {
            entry.transform_resource(context, address, resource)?;
        }
        Ok(())
    }
}

impl ResourceTransformerHandler for ChainedResourceTransformer {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        single_link(self, context, address, resource)
    }
}

/// Run `entry` on a working copy, write it, then descend into the original children
pub(crate) fn single_link(
    entry: &dyn ChainedResourceTransformerEntry,
    context: &mut ResourceTransformationContext<'_, '_>,
    address: &PathAddress,
    resource: &Resource,
) -> Result<()> {
    let mut working = resource.clone_without_children();
    entry.transform_resource(&context.base(), address, &mut working)?;
    let mut child = context.add_transformed_resource(&PathAddress::empty(), &working);
    child.process_children(resource)
}

fn names(attributes: &[&str]) -> Vec<String> {
    attributes.iter().map(|a| a.to_string()).collect()
}

/// Name of the attribute a `write-attribute`/`undefine-attribute` targets
fn targeted_attribute<'v>(operation: &'v ModelValue, name: &str) -> Option<&'v str> {
    match name {
        WRITE_ATTRIBUTE | UNDEFINE_ATTRIBUTE => operation.get(NAME).and_then(ModelValue::as_str),
        _ => None,
    }
}

/// Silently removes the named attributes
#[derive(Debug, Clone)]
pub struct DiscardAttributesTransformer {
    attributes: Vec<String>,
}

impl DiscardAttributesTransformer {
    pub fn new(attributes: &[&str]) -> Self {
        Self {
            attributes: names(attributes),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl ChainedResourceTransformerEntry for DiscardAttributesTransformer {
    fn transform_resource(
        &self,
        _context: &TransformationContext<'_>,
        _address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()> {
        let model = resource.model_mut();
        for attribute in &self.attributes {
            model.remove(attribute);
        }
        Ok(())
    }
}

impl ResourceTransformerHandler for DiscardAttributesTransformer {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        single_link(self, context, address, resource)
    }
}

impl OperationTransformerHandler for DiscardAttributesTransformer {
    fn transform_operation(
        &self,
        _context: &TransformationContext<'_>,
        _address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let name = operation_name(operation)?;
        if let Some(attribute) = targeted_attribute(operation, name) {
            if self.attributes.iter().any(|a| a == attribute) {
                return Ok(TransformedOperation::discarded());
            }
            return Ok(TransformedOperation::new(operation.clone()));
        }
        let mut transformed = operation.clone();
        for attribute in &self.attributes {
            transformed.remove(attribute);
        }
        Ok(TransformedOperation::new(transformed))
    }
}

/// Removes the named attributes when undefined; a defined value is a
/// compatibility gap
///
/// Defined values are rejected when the target tracks ignored resources and
/// only warned about (and kept) otherwise. Writing a defined value to one of
/// the attributes is always rejected; writing an undefined value or
/// undefining it is discarded.
#[derive(Debug, Clone)]
pub struct DiscardUndefinedAttributesTransformer {
    attributes: Vec<String>,
}

impl DiscardUndefinedAttributesTransformer {
    pub fn new(attributes: &[&str]) -> Self {
        Self {
            attributes: names(attributes),
        }
    }

    /// Remove undefined attributes from `model`, returning the defined ones
    fn discard_undefined(&self, model: &mut ModelValue) -> Vec<String> {
        let mut defined = Vec::new();
        for attribute in &self.attributes {
            if model.has_defined(attribute) {
                defined.push(attribute.clone());
            } else {
                model.remove(attribute);
            }
        }
        defined
    }
}

impl ChainedResourceTransformerEntry for DiscardUndefinedAttributesTransformer {
    fn transform_resource(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()> {
        let defined = self.discard_undefined(resource.model_mut());
        if defined.is_empty() {
            return Ok(());
        }
        context.reject_or_warn(address, &[AttributeProblem::new(MESSAGE_NOT_UNDERSTOOD, defined)])
    }
}

impl ResourceTransformerHandler for DiscardUndefinedAttributesTransformer {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        single_link(self, context, address, resource)
    }
}

impl OperationTransformerHandler for DiscardUndefinedAttributesTransformer {
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let name = operation_name(operation)?;
        if let Some(attribute) = targeted_attribute(operation, name) {
            if !self.attributes.iter().any(|a| a == attribute) {
                return Ok(TransformedOperation::new(operation.clone()));
            }
            if name == WRITE_ATTRIBUTE && operation.has_defined(VALUE) {
                let problem = AttributeProblem::new(MESSAGE_NOT_UNDERSTOOD, vec![attribute.to_string()]);
                return Ok(TransformedOperation::rejected(
                    operation.clone(),
                    context.operation_rejection(address, name, &[problem]),
                ));
            }
            return Ok(TransformedOperation::discarded());
        }

        let mut transformed = operation.clone();
        let defined = self.discard_undefined(&mut transformed);
        if defined.is_empty() {
            return Ok(TransformedOperation::new(transformed));
        }
        let problem = AttributeProblem::new(MESSAGE_NOT_UNDERSTOOD, defined);
        if context.target().is_tracks_ignored_resources() {
            let description = context.operation_rejection(address, name, &[problem]);
            return Ok(TransformedOperation::rejected(transformed, description));
        }
        context.log_warning(address, Some(name), &problem.message, &problem.attributes);
        Ok(TransformedOperation::new(transformed))
    }
}

/// Rejects expression values in the named attributes
///
/// For resources the usual reject-or-warn split applies. Operations
/// carrying an expression in one of the attributes are always rejected, with
/// a diagnostic naming every offending attribute.
#[derive(Debug, Clone)]
pub struct RejectExpressionValuesTransformer {
    attributes: Vec<String>,
}

impl RejectExpressionValuesTransformer {
    pub fn new(attributes: &[&str]) -> Self {
        Self {
            attributes: names(attributes),
        }
    }

    fn offending(&self, model: &ModelValue) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|a| model.get(a).is_some_and(contains_expression))
            .cloned()
            .collect()
    }
}

impl ChainedResourceTransformerEntry for RejectExpressionValuesTransformer {
    fn transform_resource(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()> {
        let offending = self.offending(resource.model());
        if offending.is_empty() {
            return Ok(());
        }
        context.reject_or_warn(address, &[AttributeProblem::new(MESSAGE_NO_EXPRESSIONS, offending)])
    }
}

impl ResourceTransformerHandler for RejectExpressionValuesTransformer {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        single_link(self, context, address, resource)
    }
}

impl OperationTransformerHandler for RejectExpressionValuesTransformer {
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let name = operation_name(operation)?;
        let offending = match targeted_attribute(operation, name) {
            Some(attribute) if name == WRITE_ATTRIBUTE => {
                let expression = operation.get(VALUE).is_some_and(contains_expression);
                if expression && self.attributes.iter().any(|a| a == attribute) {
                    vec![attribute.to_string()]
                } else {
                    Vec::new()
                }
            }
            Some(_) => Vec::new(),
            None => self.offending(operation),
        };
        if offending.is_empty() {
            return Ok(TransformedOperation::new(operation.clone()));
        }
        let problem = AttributeProblem::new(MESSAGE_NO_EXPRESSIONS, offending);
        Ok(TransformedOperation::rejected(
            operation.clone(),
            context.operation_rejection(address, name, &[problem]),
        ))
    }
}
