use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;

use super::context::TransformationContext;
use super::logger::TransformersLogger;
use super::operation::{OperationTransformer, OperationTransformerHandler, TransformedOperation};
use super::path::transform_address;
use super::registry::{ResolvedPolicy, ResolvedTransformers, TransformerRegistry};
use super::resource::ResourceTransformer;
use crate::errors::Result;
use crate::model::{ModelValue, ModelVersion, PathAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationTargetType {
    Domain,
    Host,
    Server,
}

/// Top-level resources a target host has been told not to manage
///
/// A type is either ignored as a whole or for specific names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredResources {
    whole_types: HashSet<String>,
    names: HashMap<String, HashSet<String>>,
}

impl IgnoredResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_type(mut self, resource_type: impl Into<String>) -> Self {
        self.whole_types.insert(resource_type.into());
        self
    }

    pub fn ignore_resource(mut self, resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        self.names
            .entry(resource_type.into())
            .or_default()
            .insert(name.into());
        self
    }

    /// Whether `address` is at or beneath an ignored top-level resource
    pub fn is_ignored(&self, address: &PathAddress) -> bool {
        address.element(0).is_some_and(|first| {
            self.whole_types.contains(&first.key)
                || self
                    .names
                    .get(&first.key)
                    .is_some_and(|names| names.contains(&first.value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.whole_types.is_empty() && self.names.is_empty()
    }
}

/// The legacy process a transformation adapts its output for
///
/// Subsystem versions live in a concurrent map so they can be added while
/// the target is shared, e.g. during subsystem version negotiation.
#[derive(Debug)]
pub struct TransformationTarget {
    host_name: String,
    version: ModelVersion,
    subsystem_versions: DashMap<String, ModelVersion>,
    target_type: TransformationTargetType,
    ignored: IgnoredResources,
    tracks_ignored_resources: Option<bool>,
    registry: Arc<TransformerRegistry>,
    logger: Arc<TransformersLogger>,
}

impl TransformationTarget {
    pub fn new(
        registry: Arc<TransformerRegistry>,
        host_name: impl Into<String>,
        version: ModelVersion,
        target_type: TransformationTargetType,
    ) -> Self {
        let host_name = host_name.into();
        let logger = registry.logger_for(&host_name);
        Self {
            host_name,
            version,
            subsystem_versions: DashMap::new(),
            target_type,
            ignored: IgnoredResources::default(),
            tracks_ignored_resources: None,
            registry,
            logger,
        }
    }

    pub fn with_subsystem_version(self, name: impl Into<String>, version: ModelVersion) -> Self {
        self.subsystem_versions.insert(name.into(), version);
        self
    }

    pub fn with_ignored_resources(mut self, ignored: IgnoredResources) -> Self {
        self.ignored = ignored;
        self
    }

    /// Override the version heuristic for ignored-resource tracking
    pub fn with_tracks_ignored_resources(mut self, tracks: bool) -> Self {
        self.tracks_ignored_resources = Some(tracks);
        self
    }

    /// Record a subsystem version on a shared target
    pub fn add_subsystem_version(&self, name: impl Into<String>, version: ModelVersion) {
        self.subsystem_versions.insert(name.into(), version);
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Core management model version
    pub fn version(&self) -> ModelVersion {
        self.version
    }

    pub fn subsystem_version(&self, name: &str) -> Option<ModelVersion> {
        self.subsystem_versions.get(name).map(|v| *v)
    }

    /// Every known subsystem version, sorted by name
    pub fn subsystem_versions(&self) -> Vec<(String, ModelVersion)> {
        let mut versions: Vec<(String, ModelVersion)> = self
            .subsystem_versions
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        versions.sort();
        versions
    }

    pub fn target_type(&self) -> TransformationTargetType {
        self.target_type
    }

    pub fn ignored_resources(&self) -> &IgnoredResources {
        &self.ignored
    }

    pub fn is_ignored_resource(&self, address: &PathAddress) -> bool {
        self.ignored.is_ignored(address)
    }

    /// Whether the target reliably reports which resources it ignores
    ///
    /// When it does, attributes the target cannot represent are hard
    /// rejections; when it does not, the resource might be ignored there
    /// anyway, so they only produce warnings. Defaults to core version
    /// `major >= 1 && minor >= 4`.
    pub fn is_tracks_ignored_resources(&self) -> bool {
        self.tracks_ignored_resources
            .unwrap_or(self.version.major >= 1 && self.version.minor >= 4)
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    pub fn logger(&self) -> &TransformersLogger {
        &self.logger
    }

    /// `core model version 'x'` or `subsystem 'y' model version 'x'`
    pub fn model_description(&self, address: &PathAddress) -> String {
        address
            .subsystem_name()
            .and_then(|name| self.subsystem_version(name).map(|v| (name, v)))
            .map(|(name, v)| format!("subsystem '{}' model version '{}'", name, v))
            .unwrap_or_else(|| format!("core model version '{}'", self.version))
    }

    /// Resolve the registry entry for `address` at this target's versions
    pub fn resolve(&self, address: &PathAddress) -> ResolvedTransformers<'_> {
        let resolved = self
            .registry
            .resolve(address, self.version, &|name| self.subsystem_version(name));
        if let Some((name, version)) = resolved.missing_subsystem() {
            self.logger.log_warning(format!(
                "We have no transformer for subsystem: {}-{}.{} model transfer can break!",
                name, version.major, version.minor
            ));
        }
        resolved
    }

    /// Rewrite `address` into the target's address space
    ///
    /// # Panics
    ///
    /// Panics if the resolved path chain does not cover the address, which
    /// means the registry is corrupt.
    pub fn transform_address(&self, address: &PathAddress) -> PathAddress {
        let resolved = self.resolve(address);
        match transform_address(resolved.path_chain(), address) {
            Ok(rewritten) => rewritten,
            Err(err) => panic!("corrupt transformer path chain: {}", err),
        }
    }

    /// Operation transformer for `operation_name` at `address`
    ///
    /// Ignored resources and discarded subtrees discard; rejected subtrees
    /// reject. Otherwise an explicit registration wins, then a remote or
    /// runtime-only registration discards, then pass-through.
    pub fn resolve_operation_transformer(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation_name: &str,
    ) -> OperationTransformer {
        if self.is_ignored_resource(address) {
            return OperationTransformer::Discard;
        }
        let resolved = self.resolve(address);
        match resolved.policy() {
            ResolvedPolicy::Discard => return OperationTransformer::Discard,
            ResolvedPolicy::Reject => return OperationTransformer::custom(RejectedResourceOperation),
            ResolvedPolicy::Alias | ResolvedPolicy::Transform => {}
        }
        if let Some(transformer) = resolved
            .entry()
            .and_then(|e| e.operation_transformer(operation_name))
        {
            return transformer.clone();
        }
        match context.resource_registration(address) {
            Some(reg) if reg.is_remote() || reg.is_runtime_only() => OperationTransformer::Discard,
            _ => OperationTransformer::PassThrough,
        }
    }

    /// Explicitly registered resource transformer for `address`, if any
    pub fn registered_resource_transformer(&self, address: &PathAddress) -> Option<ResourceTransformer> {
        self.resolve(address)
            .entry()
            .and_then(|e| e.resource_transformer())
            .cloned()
    }
}

/// Operations against a rejected resource are forwarded but reported as rejected
struct RejectedResourceOperation;

impl OperationTransformerHandler for RejectedResourceOperation {
    fn transform_operation(
        &self,
        _context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        Ok(TransformedOperation::rejected(
            operation.clone(),
            format!(
                "Resource {} is rejected on the target host and will need to be ignored on the host: {}",
                address, operation
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(version: ModelVersion) -> TransformationTarget {
        TransformationTarget::new(
            Arc::new(TransformerRegistry::new()),
            "slave",
            version,
            TransformationTargetType::Host,
        )
    }

    #[test]
    fn test_tracks_ignored_resources_heuristic() {
        assert!(!target(ModelVersion::new(1, 3, 0)).is_tracks_ignored_resources());
        assert!(target(ModelVersion::new(1, 4, 0)).is_tracks_ignored_resources());
        assert!(target(ModelVersion::new(1, 5, 0)).is_tracks_ignored_resources());
        // The literal heuristic also reads minor for later majors.
        assert!(!target(ModelVersion::new(2, 0, 0)).is_tracks_ignored_resources());
    }

    #[test]
    fn test_tracks_ignored_resources_override() {
        let target = target(ModelVersion::new(2, 0, 0)).with_tracks_ignored_resources(true);
        assert!(target.is_tracks_ignored_resources());
    }

    #[test]
    fn test_ignored_resources() {
        let ignored = IgnoredResources::new()
            .ignore_type("profile")
            .ignore_resource("socket-binding-group", "legacy");

        assert!(ignored.is_ignored(&PathAddress::of(&[("profile", "any"), ("subsystem", "ee")])));
        assert!(ignored.is_ignored(&PathAddress::of(&[("socket-binding-group", "legacy")])));
        assert!(!ignored.is_ignored(&PathAddress::of(&[("socket-binding-group", "standard")])));
        assert!(!ignored.is_ignored(&PathAddress::empty()));
    }

    #[test]
    fn test_subsystem_versions_can_be_added_while_shared() {
        let target = Arc::new(target(ModelVersion::new(1, 4, 0)));
        let shared = Arc::clone(&target);
        std::thread::spawn(move || shared.add_subsystem_version("ee", ModelVersion::new(1, 1, 0)))
            .join()
            .unwrap();

        assert_eq!(target.subsystem_version("ee"), Some(ModelVersion::new(1, 1, 0)));
    }

    #[test]
    fn test_model_description() {
        let target = target(ModelVersion::new(1, 4, 0)).with_subsystem_version("ee", ModelVersion::create(1));

        assert_eq!(
            target.model_description(&PathAddress::of(&[("subsystem", "ee")])),
            "subsystem 'ee' model version '1.0.0'"
        );
        assert_eq!(
            target.model_description(&PathAddress::of(&[("interface", "public")])),
            "core model version '1.4.0'"
        );
    }
}
