//! Legacy definition loader
//!
//! Reads persisted registration snapshots of older model versions from a
//! directory. A file is named `<name>-<major>.<minor>.<micro>.dmr` or
//! `<name>-<major>.<minor>.dmr`; the first name that exists wins. Core model
//! snapshots use the name `core-model`.
//!
//! A missing file is not an error: most versions of most subsystems simply
//! have no snapshot, and callers fall back to transforming without one.

use crate::codec;
use crate::errors::{
    invalid_definition, invalid_input, io_error, parse_error, serialize_error, Result,
};
use sha2::{Digest, Sha256};
use skewbridge_core::{log_op_end, log_op_error, log_op_start, ModelVersion, ResourceRegistration};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub const CORE_MODEL_NAME: &str = "core-model";
pub const DEFINITION_EXTENSION: &str = "dmr";

/// One loaded definition
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDefinition {
    pub name: String,
    pub version: ModelVersion,
    pub path: PathBuf,
    pub registration: ResourceRegistration,
    /// SHA-256 of the file content, hex encoded
    pub digest: String,
}

impl LegacyDefinition {
    /// Number of attributes declared anywhere in the registration tree
    pub fn attribute_count(&self) -> usize {
        count_attributes(&self.registration)
    }
}

fn count_attributes(registration: &ResourceRegistration) -> usize {
    registration.attribute_names().len()
        + registration
            .child_addresses()
            .into_iter()
            .filter_map(|element| registration.child(element))
            .map(count_attributes)
            .sum::<usize>()
}

/// Directory-backed, caching definition loader
///
/// Loaded definitions are shared; loading the same name and version twice
/// reads the file once. Absent files are not cached so that a snapshot
/// dropped into the directory later is picked up.
#[derive(Debug)]
pub struct LegacyDefinitionLoader {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<LegacyDefinition>>>,
}

impl LegacyDefinitionLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the snapshot of subsystem `name` at `version`
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file exists but cannot be read, a
    /// serialization error if it is not JSON, or an invalid-description
    /// error if the JSON does not describe a registration tree.
    pub fn load_subsystem(
        &self,
        name: &str,
        version: ModelVersion,
    ) -> Result<Option<Arc<LegacyDefinition>>> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(invalid_input(
                "load_subsystem",
                format!("'{}' is not a valid subsystem name", name),
            ));
        }
        self.load(name, version)
    }

    /// Load the core model snapshot at `version`
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_subsystem`].
    pub fn load_core(&self, version: ModelVersion) -> Result<Option<Arc<LegacyDefinition>>> {
        self.load(CORE_MODEL_NAME, version)
    }

    /// Drop every cached definition
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<LegacyDefinition>>> {
        // A poisoned cache only ever holds fully built entries.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self, name: &str, version: ModelVersion) -> Result<Option<Arc<LegacyDefinition>>> {
        let key = cache_key(name, version);
        if let Some(cached) = self.lock_cache().get(&key) {
            tracing::debug!(definition = %key, "definition cache hit");
            return Ok(Some(Arc::clone(cached)));
        }

        let Some(path) = resolve_candidates(name, version)
            .into_iter()
            .map(|file| self.dir.join(file))
            .find(|path| path.is_file())
        else {
            tracing::debug!(definition = %key, dir = %self.dir.display(), "no definition on disk");
            return Ok(None);
        };

        log_op_start!("load_definition", definition = %key);
        let start = Instant::now();
        let definition = read_definition(name, version, &path).map_err(|e| {
            log_op_error!(
                "load_definition",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
        log_op_end!(
            "load_definition",
            duration_ms = start.elapsed().as_millis() as u64,
            definition = %key,
            digest = %definition.digest
        );

        let definition = Arc::new(definition);
        let shared = Arc::clone(
            self.lock_cache()
                .entry(key)
                .or_insert_with(|| Arc::clone(&definition)),
        );
        Ok(Some(shared))
    }
}

fn cache_key(name: &str, version: ModelVersion) -> String {
    format!("{}-{}", name, version)
}

/// File names tried for `name` at `version`, most specific first
pub fn resolve_candidates(name: &str, version: ModelVersion) -> Vec<String> {
    vec![
        format!(
            "{}-{}.{}.{}.{}",
            name, version.major, version.minor, version.micro, DEFINITION_EXTENSION
        ),
        format!(
            "{}-{}.{}.{}",
            name, version.major, version.minor, DEFINITION_EXTENSION
        ),
    ]
}

fn read_definition(name: &str, version: ModelVersion, path: &Path) -> Result<LegacyDefinition> {
    let content = fs::read(path).map_err(|e| io_error("read_definition", e))?;
    Ok(LegacyDefinition {
        name: name.to_string(),
        version,
        path: path.to_path_buf(),
        registration: decode_definition(path, &content)?,
        digest: compute_digest(&content),
    })
}

/// Read a single definition file outside of any loader directory
///
/// # Errors
///
/// Same as [`LegacyDefinitionLoader::load_subsystem`], plus an IO error if
/// the file does not exist.
pub fn read_registration(path: &Path) -> Result<ResourceRegistration> {
    let content = fs::read(path).map_err(|e| io_error("read_registration", e))?;
    decode_definition(path, &content)
}

fn decode_definition(path: &Path, content: &[u8]) -> Result<ResourceRegistration> {
    let json: serde_json::Value =
        serde_json::from_slice(content).map_err(|e| parse_error(path, e))?;
    ResourceRegistration::from_description(&codec::from_json(&json))
        .map_err(|e| invalid_definition(path, e))
}

/// Serialize a registration tree in the on-disk format
///
/// # Errors
///
/// Returns a serialization error if JSON encoding fails.
pub fn encode_definition(registration: &ResourceRegistration) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(&codec::to_json(&registration.to_description()))
        .map_err(|e| serialize_error("encode_definition", e))
}

/// Compute SHA256 digest of content
fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skewbridge_core::ModelType;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, content: &[u8]) {
        fs::write(dir.path().join(file), content).unwrap();
    }

    #[test]
    fn test_candidates_try_micro_first() {
        let names = resolve_candidates("ee", ModelVersion::new(1, 1, 2));
        assert_eq!(names, vec!["ee-1.1.2.dmr", "ee-1.1.dmr"]);
    }

    #[test]
    fn test_missing_definition_is_none() {
        let dir = TempDir::new().unwrap();
        let loader = LegacyDefinitionLoader::new(dir.path());

        assert!(loader.load_subsystem("ee", ModelVersion::new(1, 0, 0)).unwrap().is_none());
    }

    #[test]
    fn test_digest_is_sha256_of_file() {
        let dir = TempDir::new().unwrap();
        let registration =
            ResourceRegistration::new().with_simple_attribute("jndi-name", ModelType::String);
        let bytes = encode_definition(&registration).unwrap();
        write(&dir, "ee-1.0.dmr", &bytes);

        let loader = LegacyDefinitionLoader::new(dir.path());
        let definition = loader.load_subsystem("ee", ModelVersion::new(1, 0, 0)).unwrap().unwrap();

        assert_eq!(definition.digest, compute_digest(&bytes));
        assert_eq!(definition.digest.len(), 64);
        assert_eq!(definition.registration, registration);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let loader = LegacyDefinitionLoader::new(dir.path());

        assert!(loader.load_subsystem("../ee", ModelVersion::create(1)).is_err());
    }
}
