#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{current_ee, definition_dir, legacy_ee, write_definition, write_raw};
use skewbridge_core::transform::ModelMatcher;
use skewbridge_core::{ExErrorKind, ModelVersion, PathAddress};
use skewbridge_store::LegacyDefinitionLoader;
use std::sync::Arc;

#[test]
fn test_load_falls_back_to_major_minor_file() {
    // GIVEN only a major.minor snapshot
    let dir = definition_dir();
    write_definition(&dir, "ee-1.1.dmr", &legacy_ee());
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN loading a micro version
    let definition = loader
        .load_subsystem("ee", ModelVersion::new(1, 1, 3))
        .unwrap()
        .expect("definition present");

    // THEN the major.minor file is used
    assert!(definition.path.ends_with("ee-1.1.dmr"));
    assert_eq!(definition.registration, legacy_ee());
    assert_eq!(definition.version, ModelVersion::new(1, 1, 3));
}

#[test]
fn test_micro_file_wins_over_major_minor() {
    // GIVEN both candidate files
    let dir = definition_dir();
    write_definition(&dir, "ee-1.1.dmr", &legacy_ee());
    write_definition(&dir, "ee-1.1.2.dmr", &current_ee());
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN loading the exact micro version
    let definition = loader
        .load_subsystem("ee", ModelVersion::new(1, 1, 2))
        .unwrap()
        .unwrap();

    // THEN the most specific file is used
    assert!(definition.path.ends_with("ee-1.1.2.dmr"));
    assert_eq!(definition.registration, current_ee());
}

#[test]
fn test_definitions_are_cached_and_shared() {
    // GIVEN a loaded definition
    let dir = definition_dir();
    write_definition(&dir, "ee-1.0.dmr", &legacy_ee());
    let loader = LegacyDefinitionLoader::new(dir.path());
    let first = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap().unwrap();

    // WHEN the file disappears and the definition is loaded again
    std::fs::remove_file(dir.path().join("ee-1.0.dmr")).unwrap();
    let second = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap().unwrap();

    // THEN the cached instance is returned
    assert!(Arc::ptr_eq(&first, &second));

    // AND clearing the cache forgets it
    loader.clear_cache();
    assert!(loader.load_subsystem("ee", ModelVersion::create(1)).unwrap().is_none());
}

#[test]
fn test_digest_changes_with_content() {
    // GIVEN two versions with different content
    let dir = definition_dir();
    let legacy_bytes = write_definition(&dir, "ee-1.0.dmr", &legacy_ee());
    write_definition(&dir, "ee-2.0.dmr", &current_ee());
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN both are loaded
    let v1 = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap().unwrap();
    let v2 = loader.load_subsystem("ee", ModelVersion::create(2)).unwrap().unwrap();

    // THEN their digests differ and are 64 hex chars
    assert_ne!(v1.digest, v2.digest);
    assert_eq!(v1.digest.len(), 64);
    assert!(v1.digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!legacy_bytes.is_empty());
}

#[test]
fn test_core_model_uses_its_own_file_name() {
    // GIVEN a core model snapshot
    let dir = definition_dir();
    write_definition(&dir, "core-model-1.4.dmr", &legacy_ee());
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN loading the core model
    let core = loader.load_core(ModelVersion::new(1, 4, 0)).unwrap();

    // THEN it is found, and no subsystem of that version is
    assert_eq!(core.unwrap().name, "core-model");
    assert!(loader
        .load_subsystem("ee", ModelVersion::new(1, 4, 0))
        .unwrap()
        .is_none());
}

#[test]
fn test_malformed_json_is_serialization_error() {
    // GIVEN a file that is not JSON
    let dir = definition_dir();
    write_raw(&dir, "ee-1.0.dmr", "{ not json");
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN loading it
    let err = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap_err();

    // THEN a serialization error names the file
    assert_eq!(err.kind(), ExErrorKind::Serialization);
    assert!(err.message().contains("ee-1.0.dmr"));
}

#[test]
fn test_unknown_attribute_type_is_invalid_description() {
    // GIVEN valid JSON describing an attribute of an unknown type
    let dir = definition_dir();
    write_raw(
        &dir,
        "ee-1.0.dmr",
        r#"{"attributes": {"colour": {"type": "COLOUR"}}, "children": {}}"#,
    );
    let loader = LegacyDefinitionLoader::new(dir.path());

    // WHEN loading it
    let err = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap_err();

    // THEN the decoder's error is kept as the source
    assert_eq!(err.kind(), ExErrorKind::InvalidDescription);
    assert_eq!(
        err.source_error().map(|s| s.kind()),
        Some(ExErrorKind::InvalidDescription)
    );
}

#[test]
fn test_hand_written_definition_feeds_the_matcher() {
    // GIVEN a hand-written legacy snapshot and the current registration
    let dir = definition_dir();
    write_raw(
        &dir,
        "ee-1.0.dmr",
        r#"{
            "attributes": {
                "annotation-property-replacement": {"type": "BOOLEAN", "nillable": true}
            },
            "children": {}
        }"#,
    );
    let loader = LegacyDefinitionLoader::new(dir.path());
    let legacy = loader.load_subsystem("ee", ModelVersion::create(1)).unwrap().unwrap();

    // WHEN matching the current model against it
    let rules = ModelMatcher::get_rules(&current_ee(), &legacy.registration);

    // THEN the one legacy attribute maps onto the subsystem root
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].current_address, PathAddress::empty());
    assert_eq!(rules[0].legacy_attribute, "annotation-property-replacement");
    assert_eq!(legacy.attribute_count(), 1);
}
