//! Version-keyed registry of transformers
//!
//! Transformers are registered in tries over path elements: one trie for the
//! core model, keyed by core version, and one trie per subsystem, keyed by
//! subsystem version. The root node of a subsystem trie stands for the
//! `subsystem=<name>` element itself.
//!
//! The registry is built once through the `&mut` registration API and then
//! shared read-only (usually behind an `Arc`) by every target.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;

use super::logger::TransformersLogger;
use super::operation::OperationTransformer;
use super::path::PathAddressTransformer;
use super::resource::ResourceTransformer;
use crate::model::operation::SUBSYSTEM;
use crate::model::{ModelVersion, ModelVersionRange, PathAddress, PathElement};

/// Transformers bound to one address at one version
#[derive(Debug, Clone, Default)]
pub struct TransformerEntry {
    path: PathAddressTransformer,
    resource: Option<ResourceTransformer>,
    default_operation: Option<OperationTransformer>,
    operations: IndexMap<String, OperationTransformer>,
}

impl TransformerEntry {
    pub fn path_transformer(&self) -> &PathAddressTransformer {
        &self.path
    }

    /// Explicitly registered resource transformer
    pub fn resource_transformer(&self) -> Option<&ResourceTransformer> {
        self.resource.as_ref()
    }

    /// Transformer registered for `operation_name`, else the default one
    pub fn operation_transformer(&self, operation_name: &str) -> Option<&OperationTransformer> {
        self.operations
            .get(operation_name)
            .or(self.default_operation.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedPolicy {
    #[default]
    Transform,
    /// The address or an ancestor is dropped on the target
    Discard,
    /// The address or an ancestor cannot exist on the target
    Reject,
    /// The address or an ancestor is an alias and is never written directly
    Alias,
}

#[derive(Debug, Clone, Default)]
struct VersionEntry {
    policy: ResolvedPolicy,
    entry: TransformerEntry,
}

#[derive(Debug, Default)]
struct RegistryNode {
    entries: HashMap<ModelVersion, VersionEntry>,
    children: IndexMap<PathElement, RegistryNode>,
}

impl RegistryNode {
    /// Child node for `element` at `version`
    ///
    /// A concrete child only wins when it has an entry for `version`;
    /// otherwise the wildcard child of the same key applies.
    fn child(&self, element: &PathElement, version: ModelVersion) -> Option<&RegistryNode> {
        let wildcard = || self.children.get(&PathElement::wildcard(element.key.clone()));
        match self.children.get(element) {
            Some(concrete) if concrete.entries.contains_key(&version) => Some(concrete),
            Some(concrete) => wildcard().or(Some(concrete)),
            None => wildcard(),
        }
    }

    fn entry_mut(&mut self, version: ModelVersion) -> &mut TransformerEntry {
        let slot = self.entries.entry(version).or_default();
        slot.policy = ResolvedPolicy::Transform;
        &mut slot.entry
    }

    fn set_policy(&mut self, version: ModelVersion, policy: ResolvedPolicy) {
        self.entries.entry(version).or_default().policy = policy;
    }
}

/// Result of resolving an address against the registry
#[derive(Debug, Clone)]
pub struct ResolvedTransformers<'r> {
    policy: ResolvedPolicy,
    path_chain: Vec<PathAddressTransformer>,
    entry: Option<&'r TransformerEntry>,
    missing_subsystem: Option<(String, ModelVersion)>,
}

impl<'r> ResolvedTransformers<'r> {
    pub fn policy(&self) -> ResolvedPolicy {
        self.policy
    }

    /// One path transformer per address element
    pub fn path_chain(&self) -> &[PathAddressTransformer] {
        &self.path_chain
    }

    /// Path transformer of the last element; pass-through for the root
    pub fn path_transformer(&self) -> PathAddressTransformer {
        self.path_chain.last().cloned().unwrap_or_default()
    }

    /// Entry registered at exactly this address, when the policy is `Transform`
    pub fn entry(&self) -> Option<&'r TransformerEntry> {
        self.entry
    }

    /// Subsystem crossed without registrations for the target's version
    pub fn missing_subsystem(&self) -> Option<&(String, ModelVersion)> {
        self.missing_subsystem.as_ref()
    }
}

/// Registration handle for one node of a trie, across a set of versions
pub struct TransformersSubRegistration<'r> {
    node: &'r mut RegistryNode,
    versions: Vec<ModelVersion>,
}

impl<'r> TransformersSubRegistration<'r> {
    fn new(node: &'r mut RegistryNode, versions: Vec<ModelVersion>) -> Self {
        for version in &versions {
            node.entry_mut(*version);
        }
        Self { node, versions }
    }

    pub fn versions(&self) -> &[ModelVersion] {
        &self.versions
    }

    /// Register a child with pass-through defaults
    pub fn register_sub_resource(&mut self, element: PathElement) -> TransformersSubRegistration<'_> {
        self.register_sub_resource_with_path(element, PathAddressTransformer::PassThrough)
    }

    pub fn register_sub_resource_with_path(
        &mut self,
        element: PathElement,
        path: PathAddressTransformer,
    ) -> TransformersSubRegistration<'_> {
        let versions = self.versions.clone();
        let child = self.node.children.entry(element).or_default();
        for version in &versions {
            child.entry_mut(*version).path = path.clone();
        }
        TransformersSubRegistration::new(child, versions)
    }

    /// Register a child with a resource transformer and a default operation transformer
    pub fn register_sub_resource_with(
        &mut self,
        element: PathElement,
        resource: ResourceTransformer,
        operation: OperationTransformer,
    ) -> TransformersSubRegistration<'_> {
        let mut child = self.register_sub_resource(element);
        child.set_resource_transformer(resource);
        child.set_default_operation_transformer(operation);
        child
    }

    fn mark_sub_resource(&mut self, element: PathElement, policy: ResolvedPolicy) {
        let child = self.node.children.entry(element).or_default();
        for version in &self.versions {
            child.set_policy(*version, policy);
        }
    }

    /// The child and its subtree are silently dropped on the target
    pub fn discard_sub_resource(&mut self, element: PathElement) {
        self.mark_sub_resource(element, ResolvedPolicy::Discard);
    }

    /// The child and its subtree are rejected on the target
    pub fn reject_sub_resource(&mut self, element: PathElement) {
        self.mark_sub_resource(element, ResolvedPolicy::Reject);
    }

    pub fn alias_sub_resource(&mut self, element: PathElement) {
        self.mark_sub_resource(element, ResolvedPolicy::Alias);
    }

    pub fn register_operation_transformer(
        &mut self,
        operation_name: impl Into<String>,
        transformer: OperationTransformer,
    ) {
        let name = operation_name.into();
        for version in &self.versions {
            self.node
                .entry_mut(*version)
                .operations
                .insert(name.clone(), transformer.clone());
        }
    }

    pub fn discard_operations(&mut self, operation_names: &[&str]) {
        for name in operation_names {
            self.register_operation_transformer(*name, OperationTransformer::Discard);
        }
    }

    pub fn set_resource_transformer(&mut self, transformer: ResourceTransformer) {
        for version in &self.versions {
            self.node.entry_mut(*version).resource = Some(transformer.clone());
        }
    }

    pub fn set_default_operation_transformer(&mut self, transformer: OperationTransformer) {
        for version in &self.versions {
            self.node.entry_mut(*version).default_operation = Some(transformer.clone());
        }
    }

    pub fn set_path_transformer(&mut self, path: PathAddressTransformer) {
        for version in &self.versions {
            self.node.entry_mut(*version).path = path.clone();
        }
    }
}

/// Registry of core and subsystem transformers
#[derive(Debug, Default)]
pub struct TransformerRegistry {
    core: RegistryNode,
    subsystems: HashMap<String, RegistryNode>,
    loggers: DashMap<String, Arc<TransformersLogger>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration handle for the core model root
    pub fn core_registration(
        &mut self,
        versions: impl Into<ModelVersionRange>,
    ) -> TransformersSubRegistration<'_> {
        let versions = versions.into().versions().to_vec();
        TransformersSubRegistration::new(&mut self.core, versions)
    }

    /// Registration handle for the `subsystem=<name>` resource
    pub fn register_subsystem_transformers(
        &mut self,
        name: &str,
        versions: impl Into<ModelVersionRange>,
    ) -> TransformersSubRegistration<'_> {
        let versions = versions.into().versions().to_vec();
        tracing::debug!(subsystem = name, versions = ?versions, "registering subsystem transformers");
        let node = self.subsystems.entry(name.to_string()).or_default();
        TransformersSubRegistration::new(node, versions)
    }

    pub fn is_subsystem_registered(&self, name: &str, version: ModelVersion) -> bool {
        self.subsystems
            .get(name)
            .is_some_and(|node| node.entries.contains_key(&version))
    }

    /// Versions with registrations for the subsystem, ascending
    pub fn subsystem_versions(&self, name: &str) -> Vec<ModelVersion> {
        let mut versions: Vec<ModelVersion> = self
            .subsystems
            .get(name)
            .map(|node| node.entries.keys().copied().collect())
            .unwrap_or_default();
        versions.sort();
        versions
    }

    /// Warning queue for a target host, created on first use
    pub fn logger_for(&self, host: &str) -> Arc<TransformersLogger> {
        self.loggers
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(TransformersLogger::new(host)))
            .value()
            .clone()
    }

    /// Resolve the transformers applying to `address`
    ///
    /// Elements before the first `subsystem=` element resolve in the core
    /// trie at `core_version`; the rest resolve in that subsystem's trie at
    /// the version `subsystem_version` reports for it. Concrete children win
    /// over wildcard children registered for the same version. Levels without a registration contribute a
    /// pass-through path transformer. A discarding, rejecting or alias
    /// ancestor is inherited by every descendant.
    pub fn resolve(
        &self,
        address: &PathAddress,
        core_version: ModelVersion,
        subsystem_version: &dyn Fn(&str) -> Option<ModelVersion>,
    ) -> ResolvedTransformers<'_> {
        let mut resolved = ResolvedTransformers {
            policy: ResolvedPolicy::Transform,
            path_chain: Vec::with_capacity(address.len()),
            entry: None,
            missing_subsystem: None,
        };
        let mut node = Some(&self.core);
        let mut version = core_version;
        let mut in_core = true;

        if address.is_empty() {
            resolved.entry = self
                .core
                .entries
                .get(&core_version)
                .filter(|e| e.policy == ResolvedPolicy::Transform)
                .map(|e| &e.entry);
            return resolved;
        }

        for element in address {
            node = if in_core && element.key == SUBSYSTEM {
                in_core = false;
                match subsystem_version(&element.value) {
                    Some(v) => {
                        version = v;
                        let found = self
                            .subsystems
                            .get(&element.value)
                            .filter(|n| n.entries.contains_key(&v));
                        if found.is_none() {
                            resolved.missing_subsystem = Some((element.value.clone(), v));
                        }
                        found
                    }
                    None => None,
                }
            } else {
                node.and_then(|n| n.child(element, version))
            };

            resolved.entry = None;
            let level = match resolved.policy {
                ResolvedPolicy::Transform => node.and_then(|n| n.entries.get(&version)),
                _ => None,
            };
            match level {
                Some(slot) if slot.policy == ResolvedPolicy::Transform => {
                    resolved.path_chain.push(slot.entry.path.clone());
                    resolved.entry = Some(&slot.entry);
                }
                Some(slot) => {
                    resolved.path_chain.push(PathAddressTransformer::PassThrough);
                    resolved.policy = slot.policy;
                }
                None => resolved.path_chain.push(PathAddressTransformer::PassThrough),
            }
        }
        resolved
    }
}
