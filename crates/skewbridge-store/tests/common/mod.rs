#![allow(dead_code)]

use skewbridge_core::model::AttributeDefinition;
use skewbridge_core::{ModelType, PathElement, ResourceRegistration};
use skewbridge_store::loader::encode_definition;
use std::fs;
use tempfile::TempDir;

pub fn definition_dir() -> TempDir {
    TempDir::new().expect("Failed to create definition directory")
}

/// Write `registration` to `dir` under `file`, returning the written bytes
pub fn write_definition(dir: &TempDir, file: &str, registration: &ResourceRegistration) -> Vec<u8> {
    let bytes = encode_definition(registration).expect("encode definition");
    fs::write(dir.path().join(file), &bytes).expect("write definition");
    bytes
}

pub fn write_raw(dir: &TempDir, file: &str, content: &str) {
    fs::write(dir.path().join(file), content).expect("write definition");
}

/// Legacy EE subsystem: executors live directly under the subsystem
pub fn legacy_ee() -> ResourceRegistration {
    ResourceRegistration::new()
        .with_simple_attribute("ear-subdeployments-isolated", ModelType::Boolean)
        .with_child(
            PathElement::wildcard("managed-executor-service"),
            ResourceRegistration::new()
                .with_attribute(
                    AttributeDefinition::new("core-threads", ModelType::Int).allow_expressions(true),
                )
                .with_simple_attribute("jndi-name", ModelType::String),
        )
}

/// Current EE subsystem: same attributes, plus one the legacy model lacks
pub fn current_ee() -> ResourceRegistration {
    legacy_ee()
        .with_simple_attribute("annotation-property-replacement", ModelType::Boolean)
}
