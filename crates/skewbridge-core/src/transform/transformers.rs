//! Entry points for transforming operations and resource trees

use std::time::Instant;

use super::composite::CompositeOperationTransformer;
use super::context::{ResourceTransformationContext, TransformationContext, TransformedTree};
use super::operation::{OperationTransformerHandler, TransformedOperation};
use crate::errors::{Result, TransformError};
use crate::model::operation::{operation_address, operation_name, COMPOSITE, OP_ADDR};
use crate::model::{ModelValue, PathAddress, Resource, ResourceRegistration};
use crate::{log_op_end, log_op_error, log_op_start};

/// Facade over the registry resolution and the resource walk
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformers;

impl Transformers {
    /// Transform one operation for the context's target
    ///
    /// Composite operations fan out step by step. Unless the transformer
    /// rewrote it, the operation address is mapped through the registered
    /// path transformers. Queued warnings are flushed before returning.
    ///
    /// # Errors
    ///
    /// Returns `MissingOperationField` or `InvalidAddress` for a malformed
    /// operation, or any error raised by a custom transformer.
    pub fn transform_operation(
        context: &TransformationContext<'_>,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let host = context.target().host_name();
        log_op_start!("transform_operation", host = host);
        let start = Instant::now();

        let outcome = transform_step(context, operation);
        context.logger().flush();

        let transformed = outcome.map_err(|e| {
            log_op_error!(
                "transform_operation",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                host = host
            );
            e
        })?;
        log_op_end!(
            "transform_operation",
            duration_ms = start.elapsed().as_millis() as u64,
            host = host,
            discarded = transformed.is_discarded()
        );
        Ok(transformed)
    }

    /// Transform a whole resource tree for the context's target
    ///
    /// `resource` must be the context's original root. The tree is first
    /// validated against the context's registration, then walked from the
    /// root transformer. Queued warnings are flushed on success and failure.
    ///
    /// # Errors
    ///
    /// Returns `ModelFieldsNotKnown` or `UnregisteredResource` when the tree
    /// does not match its registration, and `RejectedAttributes` or
    /// `RejectedResource` when the target tracks ignored resources and
    /// cannot represent part of the tree.
    ///
    /// # Panics
    ///
    /// Panics when a transformer breaks the output tree invariants: writing
    /// at a wildcard address, below a missing parent, or twice at one address.
    pub fn transform_resource(
        context: &TransformationContext<'_>,
        resource: &Resource,
    ) -> Result<Resource> {
        let host = context.target().host_name();
        log_op_start!("transform_resource", host = host);
        let start = Instant::now();

        let outcome = validate_model(
            context,
            resource,
            context.root_registration(),
            &PathAddress::empty(),
        )
        .and_then(|()| walk(context, resource));
        context.logger().flush();

        let transformed = outcome.map_err(|e| {
            log_op_error!(
                "transform_resource",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                host = host
            );
            e
        })?;
        log_op_end!(
            "transform_resource",
            duration_ms = start.elapsed().as_millis() as u64,
            host = host
        );
        Ok(transformed)
    }
}

/// Transform one operation without flushing or op logging
///
/// Composite steps recurse through here.
pub(crate) fn transform_step(
    context: &TransformationContext<'_>,
    operation: &ModelValue,
) -> Result<TransformedOperation> {
    let name = operation_name(operation)?;
    let address = operation_address(operation)?;
    if name == COMPOSITE {
        return CompositeOperationTransformer.transform_operation(context, &address, operation);
    }

    let target = context.target();
    let transformer = target.resolve_operation_transformer(context, &address, name);
    let mut transformed = transformer.transform_operation(context, &address, operation)?;
    if let Some(rewritten) = transformed.operation_mut() {
        if rewritten.get(OP_ADDR) == operation.get(OP_ADDR) {
            rewritten.insert(OP_ADDR, target.transform_address(&address).to_model_value());
        }
    }
    Ok(transformed)
}

fn walk(context: &TransformationContext<'_>, resource: &Resource) -> Result<Resource> {
    let root_address = PathAddress::empty();
    let transformer = context
        .target()
        .registered_resource_transformer(&root_address)
        .unwrap_or_default();

    let mut output = TransformedTree::new();
    let mut root = ResourceTransformationContext::new(*context, &mut output);
    transformer.transform_resource(&mut root, &root_address, resource)?;
    Ok(output.into_resource())
}

/// Check every node's model keys and child types against its registration
///
/// Ignored resources are not checked. Nothing beneath a remote or
/// runtime-only registration is checked.
fn validate_model(
    context: &TransformationContext<'_>,
    resource: &Resource,
    registration: &ResourceRegistration,
    address: &PathAddress,
) -> Result<()> {
    let known = registration.attribute_names();
    let unknown: Vec<String> = resource
        .model()
        .keys()
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(str::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(TransformError::ModelFieldsNotKnown {
            address: address.to_string(),
            fields: unknown,
        });
    }
    if registration.is_remote() || registration.is_runtime_only() {
        return Ok(());
    }

    for (element, child) in resource.child_entries() {
        let child_address = address.append(element.clone());
        if context.target().is_ignored_resource(&child_address) || child.is_proxy() {
            continue;
        }
        let child_registration = registration
            .child(&element)
            .ok_or_else(|| TransformError::UnregisteredResource {
                address: child_address.to_string(),
            })?;
        validate_model(context, child, child_registration, &child_address)?;
    }
    Ok(())
}
