use std::sync::Arc;

use skewbridge_core::model::{AttributeDefinition, ModelType, PathAddress, PathElement};
use skewbridge_core::transform::{TransformationTarget, TransformationTargetType, TransformerRegistry};
use skewbridge_core::{ModelValue, ModelVersion, Resource, ResourceRegistration};

#[allow(dead_code)]
pub const CURRENT: ModelVersion = ModelVersion::new(4, 0, 0);
#[allow(dead_code)]
pub const LEGACY_TRACKING: ModelVersion = ModelVersion::new(1, 4, 0);
#[allow(dead_code)]
pub const LEGACY_UNTRACKED: ModelVersion = ModelVersion::new(1, 3, 0);
#[allow(dead_code)]
pub const EE_LEGACY: ModelVersion = ModelVersion::new(1, 1, 0);

/// Address of `subsystem=<name>`
#[allow(dead_code)]
pub fn subsystem(name: &str) -> PathAddress {
    PathAddress::of(&[("subsystem", name)])
}

/// Registration of a root with one `ee` subsystem
///
/// The subsystem has a few scalar attributes and wildcard executor
/// children, plus a runtime-only and a remote child type.
#[allow(dead_code)]
pub fn ee_root_registration() -> ResourceRegistration {
    let executor = ResourceRegistration::new()
        .with_attribute(
            AttributeDefinition::new("core-threads", ModelType::Int).allow_expressions(true),
        )
        .with_simple_attribute("max-threads", ModelType::Int)
        .with_simple_attribute("jndi-name", ModelType::String);
    let ee = ResourceRegistration::new()
        .with_simple_attribute("annotation-property-replacement", ModelType::Boolean)
        .with_simple_attribute("ear-subdeployments-isolated", ModelType::Boolean)
        .with_simple_attribute("global-modules", ModelType::List)
        .with_child(PathElement::wildcard("managed-executor-service"), executor)
        .with_child(
            PathElement::wildcard("runtime-stats"),
            ResourceRegistration::new()
                .with_simple_attribute("active", ModelType::Int)
                .runtime_only(true),
        )
        .with_child(
            PathElement::wildcard("remote-node"),
            ResourceRegistration::new()
                .with_simple_attribute("url", ModelType::String)
                .remote(true),
        );
    ResourceRegistration::new()
        .with_simple_attribute("name", ModelType::String)
        .with_child(PathElement::new("subsystem", "ee"), ee)
}

/// A root resource matching [`ee_root_registration`]
#[allow(dead_code)]
pub fn ee_root_resource(subsystem_model: ModelValue) -> Resource {
    let mut root = Resource::with_model(ModelValue::object().with("name", "dc"));
    root.register_child(
        PathElement::new("subsystem", "ee"),
        Resource::with_model(subsystem_model),
    );
    root
}

/// Add a child below `subsystem=ee` of a root built by [`ee_root_resource`]
#[allow(dead_code)]
pub fn add_ee_child(root: &mut Resource, element: PathElement, model: ModelValue) {
    let ee = root
        .child_mut(&PathElement::new("subsystem", "ee"))
        .expect("subsystem=ee present");
    ee.register_child(element, Resource::with_model(model));
}

/// Host target with the `ee` subsystem at [`EE_LEGACY`]
#[allow(dead_code)]
pub fn host_target(registry: TransformerRegistry, host: &str, version: ModelVersion) -> TransformationTarget {
    TransformationTarget::new(Arc::new(registry), host, version, TransformationTargetType::Host)
        .with_subsystem_version("ee", EE_LEGACY)
}
