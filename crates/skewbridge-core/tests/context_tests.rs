#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::{Arc, Mutex};

use common::*;
use skewbridge_core::model::operation::{create_add_operation, write_attribute_operation};
use skewbridge_core::model::PathElement;
use skewbridge_core::transform::{
    ChainedOperationTransformer, DiscardAttributesTransformer, ExpressionSnapshot,
    OperationTransformer, OperationTransformerHandler, RejectExpressionValuesTransformer,
    ResourceTransformationContext, ResourceTransformer, ResourceTransformerHandler,
    TransformedOperation, TransformerRegistry,
};
use skewbridge_core::{
    ModelValue, PathAddress, Resource, Result, TransformError, TransformationContext, Transformers,
};

/// Forwards operations unchanged and remembers what it was given
#[derive(Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<ModelValue>>>,
}

impl OperationTransformerHandler for Recorder {
    fn transform_operation(
        &self,
        _context: &TransformationContext<'_>,
        _address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        self.seen.lock().unwrap().push(operation.clone());
        Ok(TransformedOperation::new(operation.clone()))
    }
}

/// Copies the whole subtree below the resource as is
struct CopySubtree;

impl ResourceTransformerHandler for CopySubtree {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        _address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        context.add_transformed_recursive_resource(&PathAddress::empty(), resource);
        Ok(())
    }
}

/// What [`Relocate`] observed for one executor
#[derive(Debug, Clone)]
struct Relocation {
    original: Option<Resource>,
    written_before: bool,
    written_after: Option<Resource>,
}

/// Writes each executor as `legacy-executor=<name>` under `subsystem=ee`
#[derive(Default)]
struct Relocate {
    observed: Arc<Mutex<Vec<Relocation>>>,
}

impl ResourceTransformerHandler for Relocate {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        let name = address.last_element().map(|e| e.value.clone()).unwrap_or_default();
        let original = context.read_resource(&PathAddress::empty()).cloned();
        let written_before = context.read_transformed_resource(&PathAddress::empty()).is_some();

        let absolute = subsystem("ee").append(PathElement::new("legacy-executor", name));
        let written = context.add_transformed_resource_from_root(&absolute, resource);
        let written_after = written.read_transformed_resource(&PathAddress::empty()).cloned();

        self.observed.lock().unwrap().push(Relocation {
            original,
            written_before,
            written_after,
        });
        Ok(())
    }
}

fn ee_tree_with_executor() -> Resource {
    let mut root = ee_root_resource(ModelValue::object().with("annotation-property-replacement", true));
    add_ee_child(
        &mut root,
        PathElement::new("managed-executor-service", "default"),
        ModelValue::object().with("core-threads", 4).with("max-threads", 8),
    );
    add_ee_child(
        &mut root,
        PathElement::new("runtime-stats", "now"),
        ModelValue::object().with("active", 1),
    );
    root
}

#[test]
fn test_chain_feeds_each_link_the_previous_output() {
    // GIVEN a chain that discards `a`, records, then rejects expressions in `b`
    let seen = Arc::new(Mutex::new(Vec::new()));
    let chain = ChainedOperationTransformer::new(vec![
        OperationTransformer::custom(DiscardAttributesTransformer::new(&["a"])),
        OperationTransformer::custom(Recorder { seen: seen.clone() }),
        OperationTransformer::custom(RejectExpressionValuesTransformer::new(&["b"])),
    ]);
    let target = host_target(TransformerRegistry::new(), "context-chain", LEGACY_TRACKING);
    let root = Resource::new();
    let registration = ee_root_registration();
    let context = TransformationContext::new(&target, &root, &registration);
    let address = subsystem("ee");
    let add = create_add_operation(&address)
        .with("a", 1)
        .with("b", ModelValue::expression("${b}"));

    // WHEN transforming an add through the chain
    let transformed = chain.transform_operation(&context, &address, &add).unwrap();

    // THEN the recording link saw the add without `a`
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].has("a"));
    assert!(seen[0].has("b"));

    // AND the last link's rejection is carried by the result
    let op = transformed.operation().unwrap();
    assert!(!op.has("a"));
    assert!(transformed.reject_operation(&ModelValue::Undefined));
    assert!(transformed.failure_description().contains("[b]"));
}

#[test]
fn test_chain_stops_at_discarding_link() {
    // GIVEN a chain whose first link discards
    let seen = Arc::new(Mutex::new(Vec::new()));
    let chain = ChainedOperationTransformer::new(vec![OperationTransformer::Discard])
        .then(OperationTransformer::custom(Recorder { seen: seen.clone() }));
    let target = host_target(TransformerRegistry::new(), "context-chain-discard", LEGACY_TRACKING);
    let root = Resource::new();
    let registration = ee_root_registration();
    let context = TransformationContext::new(&target, &root, &registration);
    let address = subsystem("ee");
    let write = write_attribute_operation(&address, "annotation-property-replacement", false);

    // WHEN transforming
    let transformed = chain.transform_operation(&context, &address, &write).unwrap();

    // THEN the operation is discarded and later links never run
    assert!(transformed.is_discarded());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_recursive_copy_keeps_children_untransformed() {
    // GIVEN a subsystem transformer copying its subtree, and executors that would be discarded
    let mut registry = TransformerRegistry::new();
    let mut ee = registry.register_subsystem_transformers("ee", EE_LEGACY);
    ee.set_resource_transformer(ResourceTransformer::custom(CopySubtree));
    ee.discard_sub_resource(PathElement::wildcard("managed-executor-service"));
    let target = host_target(registry, "context-recursive", LEGACY_TRACKING);
    let registration = ee_root_registration();
    let root = ee_tree_with_executor();
    let context = TransformationContext::new(&target, &root, &registration);

    // WHEN transforming
    let transformed = Transformers::transform_resource(&context, &root).unwrap();

    // THEN the subsystem arrives with every child as it was
    assert_eq!(
        transformed.navigate(&subsystem("ee")),
        root.navigate(&subsystem("ee"))
    );
    let runtime = subsystem("ee").append(PathElement::new("runtime-stats", "now"));
    assert!(transformed.navigate(&runtime).is_some());
}

#[test]
fn test_write_from_root_and_read_back() {
    // GIVEN executors relocated to an absolute address
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut registry = TransformerRegistry::new();
    registry
        .register_subsystem_transformers("ee", EE_LEGACY)
        .register_sub_resource(PathElement::wildcard("managed-executor-service"))
        .set_resource_transformer(ResourceTransformer::custom(Relocate {
            observed: observed.clone(),
        }));
    let target = host_target(registry, "context-from-root", LEGACY_TRACKING);
    let registration = ee_root_registration();
    let root = ee_tree_with_executor();
    let context = TransformationContext::new(&target, &root, &registration);

    // WHEN transforming
    let transformed = Transformers::transform_resource(&context, &root).unwrap();

    // THEN the executor lives at the new address only
    let executor = PathElement::new("managed-executor-service", "default");
    let relocated = subsystem("ee").append(PathElement::new("legacy-executor", "default"));
    let original = root.navigate(&subsystem("ee").append(executor.clone())).unwrap();
    assert_eq!(transformed.navigate(&relocated).map(Resource::model), Some(original.model()));
    assert!(transformed.navigate(&subsystem("ee").append(executor)).is_none());

    // AND the handler read the original and its own write through the context
    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].original.as_ref(), Some(original));
    assert!(!observed[0].written_before);
    assert_eq!(
        observed[0].written_after.as_ref().map(Resource::model),
        Some(original.model())
    );
}

#[test]
fn test_context_resolver_resolves_expressions() {
    // GIVEN a snapshot with a `threads` property
    let target = host_target(TransformerRegistry::new(), "context-resolver", LEGACY_TRACKING);
    let root = Resource::new();
    let registration = ee_root_registration();
    let snapshot = ExpressionSnapshot::default().with_property("threads", "8");
    let value = ModelValue::object()
        .with("core-threads", ModelValue::expression("${threads}"))
        .with("max-threads", ModelValue::expression("${max:16}"));

    // WHEN resolving through a context with and without the snapshot
    let with_resolver = TransformationContext::new(&target, &root, &registration)
        .with_resolver(&snapshot)
        .resolve_expressions(&value)
        .unwrap();
    let without = TransformationContext::new(&target, &root, &registration).resolve_expressions(&value);

    // THEN the snapshot supplies the property
    assert_eq!(with_resolver.get("core-threads"), Some(&ModelValue::from("8")));
    assert_eq!(with_resolver.get("max-threads"), Some(&ModelValue::from("16")));

    // AND without it only defaults resolve
    assert!(matches!(
        without,
        Err(TransformError::UnresolvedExpression { expression }) if expression.contains("threads")
    ));
}
