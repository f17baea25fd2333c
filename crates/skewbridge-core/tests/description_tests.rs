#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use skewbridge_core::model::operation::{
    create_add_operation, undefine_attribute_operation, write_attribute_operation, NAME, OP, VALUE,
    WRITE_ATTRIBUTE,
};
use skewbridge_core::model::{ModelType, PathElement};
use skewbridge_core::transform::{
    DiscardAttributeChecker, ResourceTransformationDescriptionBuilder, TransformerRegistry,
};
use skewbridge_core::{
    ModelValue, ModelVersion, PathAddress, Resource, ResourceRegistration, TransformError,
    TransformationContext, Transformers,
};

const TEST_LEGACY: ModelVersion = ModelVersion::new(1, 0, 0);

fn described_registration() -> ResourceRegistration {
    let mut subsystem = ResourceRegistration::new();
    for name in ["one", "two", "three", "four", "five", "six", "seven"] {
        subsystem = subsystem.with_simple_attribute(name, ModelType::String);
    }
    subsystem = subsystem
        .with_child(
            PathElement::wildcard("thing"),
            ResourceRegistration::new()
                .with_simple_attribute("x", ModelType::Int)
                .with_simple_attribute("y", ModelType::Int),
        )
        .with_child(PathElement::wildcard("new-thing"), ResourceRegistration::new());
    ResourceRegistration::new().with_child(PathElement::new("subsystem", "test"), subsystem)
}

fn described_registry() -> TransformerRegistry {
    let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
    builder
        .convert(
            |_, name, value, _| {
                if value.is_defined() {
                    *value = ModelValue::from(name.to_uppercase());
                }
            },
            &["one", "two", "three"],
        )
        .discard(DiscardAttributeChecker::Always, &["four"])
        .discard(DiscardAttributeChecker::Undefined, &["five"])
        .discard(
            DiscardAttributeChecker::DefaultValue(ModelValue::from("six-default")),
            &["six"],
        )
        .rename("seven", "renamed-seven")
        .add_attribute("added", |_, _, value, _| *value = ModelValue::from("new"));
    builder
        .add_child_redirection(PathElement::wildcard("thing"), PathElement::wildcard("legacy-thing"))
        .discard(DiscardAttributeChecker::Always, &["x"]);
    builder.reject_child_resource(PathElement::wildcard("new-thing"));

    let mut registry = TransformerRegistry::new();
    builder.build().register_subsystem(&mut registry, "test", TEST_LEGACY);
    registry
}

fn described_target(host: &str, version: ModelVersion) -> skewbridge_core::TransformationTarget {
    skewbridge_core::TransformationTarget::new(
        std::sync::Arc::new(described_registry()),
        host,
        version,
        skewbridge_core::TransformationTargetType::Host,
    )
    .with_subsystem_version("test", TEST_LEGACY)
}

fn subsystem_model() -> ModelValue {
    ModelValue::object()
        .with("one", "a")
        .with("two", "b")
        .with("three", "c")
        .with("four", "d")
        .with("five", ModelValue::Undefined)
        .with("six", "six-default")
        .with("seven", "g")
}

fn described_root(model: ModelValue) -> Resource {
    let mut subsystem = Resource::with_model(model);
    subsystem.register_child(
        PathElement::new("thing", "a"),
        Resource::with_model(ModelValue::object().with("x", 1).with("y", 2)),
    );
    let mut root = Resource::new();
    root.register_child(PathElement::new("subsystem", "test"), subsystem);
    root
}

#[test]
fn test_described_resource_transformation() {
    // GIVEN the described rules and a tree using every attribute
    let target = described_target("describe-resource", LEGACY_TRACKING);
    let registration = described_registration();
    let root = described_root(subsystem_model());
    let context = TransformationContext::new(&target, &root, &registration);

    // WHEN transforming
    let transformed = Transformers::transform_resource(&context, &root).unwrap();

    // THEN converted, renamed and added attributes are present and discarded ones are gone
    let model = transformed
        .navigate(&subsystem("test"))
        .map(Resource::model)
        .unwrap();
    let expected = ModelValue::object()
        .with("one", "ONE")
        .with("two", "TWO")
        .with("three", "THREE")
        .with("renamed-seven", "g")
        .with("added", "new");
    assert_eq!(model, &expected);

    // AND the child is redirected with its own rules applied
    let thing = transformed
        .navigate(&subsystem("test").append(PathElement::new("legacy-thing", "a")))
        .unwrap();
    assert_eq!(thing.model(), &ModelValue::object().with("y", 2));
}

#[test]
fn test_non_default_six_is_kept() {
    // GIVEN `six` set to something other than its default
    let target = described_target("describe-six", LEGACY_TRACKING);
    let registration = described_registration();
    let root = described_root(subsystem_model().with("six", "custom"));
    let context = TransformationContext::new(&target, &root, &registration);

    // WHEN transforming
    let transformed = Transformers::transform_resource(&context, &root).unwrap();

    // THEN six survives
    let model = transformed.navigate(&subsystem("test")).map(Resource::model).unwrap();
    assert_eq!(model.get("six"), Some(&ModelValue::from("custom")));
}

#[test]
fn test_described_operations() {
    // GIVEN the described rules
    let target = described_target("describe-ops", LEGACY_TRACKING);
    let registration = described_registration();
    let root = Resource::new();
    let context = TransformationContext::new(&target, &root, &registration);
    let address = subsystem("test");

    // WHEN transforming an add and several writes
    let mut add = create_add_operation(&address);
    if let Some(map) = add.as_object_mut() {
        for (key, value) in subsystem_model().as_object().unwrap() {
            map.insert(key.clone(), value.clone());
        }
    }
    let add = Transformers::transform_operation(&context, &add).unwrap();
    let four = Transformers::transform_operation(
        &context,
        &write_attribute_operation(&address, "four", "d"),
    )
    .unwrap();
    let seven = Transformers::transform_operation(
        &context,
        &write_attribute_operation(&address, "seven", "h"),
    )
    .unwrap();
    let one = Transformers::transform_operation(
        &context,
        &write_attribute_operation(&address, "one", "x"),
    )
    .unwrap();
    let five = Transformers::transform_operation(
        &context,
        &undefine_attribute_operation(&address, "five"),
    )
    .unwrap();

    // THEN the add carries the transformed attributes
    let add = add.operation().unwrap();
    assert_eq!(add.get("one"), Some(&ModelValue::from("ONE")));
    assert!(!add.has("four"));
    assert!(!add.has("six"));
    assert_eq!(add.get("renamed-seven"), Some(&ModelValue::from("g")));
    assert_eq!(add.get("added"), Some(&ModelValue::from("new")));

    // AND writes follow the per-attribute rules
    assert!(four.is_discarded());
    assert!(five.is_discarded());
    let seven = seven.operation().unwrap();
    assert_eq!(seven.get(NAME), Some(&ModelValue::from("renamed-seven")));
    assert_eq!(seven.get(OP), Some(&ModelValue::from(WRITE_ATTRIBUTE)));
    assert_eq!(one.operation().and_then(|o| o.get(VALUE)), Some(&ModelValue::from("ONE")));
}

#[test]
fn test_rejected_child_resource() {
    // GIVEN a tree with a child type the legacy model rejects
    let registration = described_registration();
    let mut root = described_root(subsystem_model());
    root.child_mut(&PathElement::new("subsystem", "test"))
        .unwrap()
        .register_child(PathElement::new("new-thing", "n"), Resource::new());

    // WHEN transforming for a tracking and a non-tracking target
    let tracking = described_target("describe-reject-child-tracking", LEGACY_TRACKING);
    let untracked = described_target("describe-reject-child-untracked", LEGACY_UNTRACKED);
    let tracked_result = Transformers::transform_resource(
        &TransformationContext::new(&tracking, &root, &registration),
        &root,
    );
    let untracked_result = Transformers::transform_resource(
        &TransformationContext::new(&untracked, &root, &registration),
        &root,
    )
    .unwrap();

    // THEN the tracking target fails and the other target skips the child
    assert!(matches!(
        tracked_result,
        Err(TransformError::RejectedResource { address }) if address.ends_with("new-thing=n")
    ));
    let skipped = subsystem("test").append(PathElement::new("new-thing", "n"));
    assert!(untracked_result.navigate(&skipped).is_none());
    assert!(untracked_result
        .navigate(&PathAddress::of(&[("subsystem", "test"), ("legacy-thing", "a")]))
        .is_some());
}
