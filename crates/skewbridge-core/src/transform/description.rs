//! Declarative resource transformation descriptions
//!
//! A [`ResourceTransformationDescriptionBuilder`] collects per-attribute
//! rules for one resource (and, nested, for its children) and registers
//! them as resource and operation transformers.
//!
//! Each attribute is processed in a fixed order: discard, reject, convert,
//! rename. Added attributes are computed last. A discarded attribute skips
//! the later steps.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::attributes::{single_link, ChainedResourceTransformer, ChainedResourceTransformerEntry};
use super::checker::{
    contains_expression, AttributePredicate, RequirementChecker, MESSAGE_MUST_BE_DEFINED,
    MESSAGE_NOT_UNDERSTOOD, MESSAGE_NO_EXPRESSIONS,
};
use super::context::{AttributeProblem, ResourceTransformationContext, TransformationContext};
use super::operation::{OperationTransformer, OperationTransformerHandler, TransformedOperation};
use super::path::PathAddressTransformer;
use super::registry::{TransformerRegistry, TransformersSubRegistration};
use super::resource::{ResourceTransformer, ResourceTransformerHandler};
use crate::errors::Result;
use crate::model::operation::{
    operation_name, ADD, NAME, OP, UNDEFINE_ATTRIBUTE, VALUE, WRITE_ATTRIBUTE,
};
use crate::model::{ModelValue, ModelVersionRange, PathAddress, PathElement, Resource};

/// Rewrites an attribute value in place: address, attribute name, value, context
pub type AttributeConverter =
    Arc<dyn Fn(&PathAddress, &str, &mut ModelValue, &TransformationContext<'_>) + Send + Sync>;

/// When an attribute may be dropped without losing information
#[derive(Clone)]
pub enum DiscardAttributeChecker {
    Always,
    Undefined,
    /// Undefined or equal to the given default
    DefaultValue(ModelValue),
    Custom {
        discard_expressions: bool,
        discard_undefined: bool,
        predicate: AttributePredicate,
    },
}

impl DiscardAttributeChecker {
    pub fn custom<F>(discard_expressions: bool, discard_undefined: bool, predicate: F) -> Self
    where
        F: Fn(&str, &ModelValue, &TransformationContext<'_>) -> bool + Send + Sync + 'static,
    {
        DiscardAttributeChecker::Custom {
            discard_expressions,
            discard_undefined,
            predicate: Arc::new(predicate),
        }
    }

    pub fn is_discardable(
        &self,
        attribute_name: &str,
        value: &ModelValue,
        context: &TransformationContext<'_>,
    ) -> bool {
        match self {
            DiscardAttributeChecker::Always => true,
            DiscardAttributeChecker::Undefined => !value.is_defined(),
            DiscardAttributeChecker::DefaultValue(default) => {
                !value.is_defined() || value == default
            }
            DiscardAttributeChecker::Custom {
                discard_expressions,
                discard_undefined,
                predicate,
            } => {
                if !value.is_defined() {
                    return *discard_undefined;
                }
                if contains_expression(value) && !discard_expressions {
                    return false;
                }
                predicate(attribute_name, value, context)
            }
        }
    }
}

impl fmt::Debug for DiscardAttributeChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardAttributeChecker::Always => f.write_str("Always"),
            DiscardAttributeChecker::Undefined => f.write_str("Undefined"),
            DiscardAttributeChecker::DefaultValue(v) => write!(f, "DefaultValue({})", v),
            DiscardAttributeChecker::Custom { .. } => f.write_str("Custom(..)"),
        }
    }
}

/// When an attribute value cannot be sent to the target
#[derive(Clone)]
pub enum RejectAttributeChecker {
    SimpleExpressions,
    Defined,
    Undefined,
    Custom {
        message: String,
        predicate: AttributePredicate,
    },
}

impl RejectAttributeChecker {
    pub fn custom<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str, &ModelValue, &TransformationContext<'_>) -> bool + Send + Sync + 'static,
    {
        RejectAttributeChecker::Custom {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    fn requirement(&self) -> RequirementChecker {
        match self {
            RejectAttributeChecker::SimpleExpressions => RequirementChecker::SimpleExpressions,
            RejectAttributeChecker::Defined => RequirementChecker::Defined,
            RejectAttributeChecker::Undefined => RequirementChecker::Undefined,
            RejectAttributeChecker::Custom { predicate, .. } => {
                RequirementChecker::Custom(predicate.clone())
            }
        }
    }

    pub fn rejects(
        &self,
        attribute_name: &str,
        value: &ModelValue,
        context: &TransformationContext<'_>,
    ) -> bool {
        self.requirement()
            .is_transformation_needed(attribute_name, value, context)
    }

    pub fn message(&self) -> &str {
        match self {
            RejectAttributeChecker::SimpleExpressions => MESSAGE_NO_EXPRESSIONS,
            RejectAttributeChecker::Defined => MESSAGE_NOT_UNDERSTOOD,
            RejectAttributeChecker::Undefined => MESSAGE_MUST_BE_DEFINED,
            RejectAttributeChecker::Custom { message, .. } => message,
        }
    }
}

impl fmt::Debug for RejectAttributeChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectAttributeChecker::SimpleExpressions => f.write_str("SimpleExpressions"),
            RejectAttributeChecker::Defined => f.write_str("Defined"),
            RejectAttributeChecker::Undefined => f.write_str("Undefined"),
            RejectAttributeChecker::Custom { message, .. } => write!(f, "Custom({})", message),
        }
    }
}

#[derive(Clone, Default)]
struct AttributeRules {
    discard: Option<DiscardAttributeChecker>,
    reject: Vec<RejectAttributeChecker>,
    convert: Option<AttributeConverter>,
    rename: Option<String>,
}

/// Compiled attribute rules of one resource
#[derive(Clone, Default)]
pub struct AttributeTransformationRules {
    attributes: IndexMap<String, AttributeRules>,
    added: Vec<(String, AttributeConverter)>,
}

impl AttributeTransformationRules {
    /// Apply every rule to `model` in place, returning the rejections
    ///
    /// Rejections are grouped per checker message, in first-seen order.
    pub fn apply(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        model: &mut ModelValue,
    ) -> Vec<AttributeProblem> {
        let mut rejected: IndexMap<String, Vec<String>> = IndexMap::new();
        for (name, rules) in &self.attributes {
            let mut value = model.get(name).cloned().unwrap_or_default();
            if let Some(discard) = &rules.discard {
                if discard.is_discardable(name, &value, context) {
                    model.remove(name);
                    continue;
                }
            }
            for checker in &rules.reject {
                if checker.rejects(name, &value, context) {
                    rejected
                        .entry(checker.message().to_string())
                        .or_default()
                        .push(name.clone());
                }
            }
            if let Some(convert) = &rules.convert {
                convert(address, name, &mut value, context);
                if value.is_defined() {
                    model.insert(name.clone(), value);
                } else {
                    model.remove(name);
                }
            }
            if let Some(new_name) = &rules.rename {
                if let Some(value) = model.remove(name) {
                    model.insert(new_name.clone(), value);
                }
            }
        }
        for (name, convert) in &self.added {
            let mut value = ModelValue::Undefined;
            convert(address, name, &mut value, context);
            if value.is_defined() {
                model.insert(name.clone(), value);
            }
        }
        rejected
            .into_iter()
            .map(|(message, attributes)| AttributeProblem::new(message, attributes))
            .collect()
    }

    /// `write-attribute` and `undefine-attribute` share one path; the
    /// latter writes an undefined value
    fn transform_attribute_write(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
        operation_name: &str,
    ) -> TransformedOperation {
        let Some(attribute) = operation.get(NAME).and_then(ModelValue::as_str) else {
            return TransformedOperation::new(operation.clone());
        };
        let Some(rules) = self.attributes.get(attribute) else {
            return TransformedOperation::new(operation.clone());
        };

        let mut value = match operation_name {
            WRITE_ATTRIBUTE => operation.get(VALUE).cloned().unwrap_or_default(),
            _ => ModelValue::Undefined,
        };
        if let Some(discard) = &rules.discard {
            if discard.is_discardable(attribute, &value, context) {
                return TransformedOperation::discarded();
            }
        }
        let mut problems: Vec<AttributeProblem> = Vec::new();
        for checker in &rules.reject {
            if checker.rejects(attribute, &value, context) {
                problems.push(AttributeProblem::new(checker.message(), vec![attribute.to_string()]));
            }
        }

        let mut transformed = operation.clone();
        if let Some(convert) = &rules.convert {
            convert(address, attribute, &mut value, context);
            if operation_name == WRITE_ATTRIBUTE {
                transformed.insert(VALUE, value);
            } else if value.is_defined() {
                // A converter that fills in an undefined value turns the undefine into a write.
                transformed.insert(OP, WRITE_ATTRIBUTE);
                transformed.insert(VALUE, value);
            }
        }
        if let Some(new_name) = &rules.rename {
            transformed.insert(NAME, new_name.clone());
        }

        if problems.is_empty() {
            TransformedOperation::new(transformed)
        } else {
            let description = context.operation_rejection(address, operation_name, &problems);
            TransformedOperation::rejected(transformed, description)
        }
    }
}

/// Resource and operation transformer compiled from a description
#[derive(Clone, Default)]
struct DescribedTransformer {
    rules: AttributeTransformationRules,
    links: ChainedResourceTransformer,
}

impl ChainedResourceTransformerEntry for DescribedTransformer {
    fn transform_resource(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<()> {
        let problems = self.rules.apply(context, address, resource.model_mut());
        context.reject_or_warn(address, &problems)?;
        ChainedResourceTransformerEntry::transform_resource(&self.links, context, address, resource)
    }
}

impl ResourceTransformerHandler for DescribedTransformer {
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        single_link(self, context, address, resource)
    }
}

impl OperationTransformerHandler for DescribedTransformer {
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let name = operation_name(operation)?;
        Ok(match name {
            ADD => {
                let mut transformed = operation.clone();
                let problems = self.rules.apply(context, address, &mut transformed);
                if problems.is_empty() {
                    TransformedOperation::new(transformed)
                } else {
                    let description = context.operation_rejection(address, name, &problems);
                    TransformedOperation::rejected(transformed, description)
                }
            }
            WRITE_ATTRIBUTE | UNDEFINE_ATTRIBUTE => self
                .rules
                .transform_attribute_write(context, address, operation, name),
            _ => TransformedOperation::new(operation.clone()),
        })
    }
}

/// Builder for the transformation of one resource and its children
#[derive(Clone, Default)]
pub struct ResourceTransformationDescriptionBuilder {
    element: Option<PathElement>,
    path: PathAddressTransformer,
    transformer: DescribedTransformer,
    operations: IndexMap<String, OperationTransformer>,
    children: Vec<ResourceTransformationDescriptionBuilder>,
    discarded: Vec<PathElement>,
    rejected: Vec<PathElement>,
}

impl ResourceTransformationDescriptionBuilder {
    /// Builder for a subsystem root, registered directly on a subsystem handle
    pub fn create_subsystem_instance() -> Self {
        Self::default()
    }

    /// Builder for a child resource registered under `element`
    pub fn new(element: PathElement) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }

    fn rules_for(&mut self, attribute: &str) -> &mut AttributeRules {
        self.transformer
            .rules
            .attributes
            .entry(attribute.to_string())
            .or_default()
    }

    /// Discard the attributes when `checker` allows it
    pub fn discard(&mut self, checker: DiscardAttributeChecker, attributes: &[&str]) -> &mut Self {
        for attribute in attributes {
            self.rules_for(attribute).discard = Some(checker.clone());
        }
        self
    }

    /// Add a reject check; every check registered for an attribute is consulted
    pub fn reject(&mut self, checker: RejectAttributeChecker, attributes: &[&str]) -> &mut Self {
        for attribute in attributes {
            self.rules_for(attribute).reject.push(checker.clone());
        }
        self
    }

    pub fn convert<F>(&mut self, converter: F, attributes: &[&str]) -> &mut Self
    where
        F: Fn(&PathAddress, &str, &mut ModelValue, &TransformationContext<'_>) + Send + Sync + 'static,
    {
        let converter: AttributeConverter = Arc::new(converter);
        for attribute in attributes {
            self.rules_for(attribute).convert = Some(converter.clone());
        }
        self
    }

    pub fn rename(&mut self, from: &str, to: &str) -> &mut Self {
        self.rules_for(from).rename = Some(to.to_string());
        self
    }

    /// Add an attribute computed from an undefined start value
    pub fn add_attribute<F>(&mut self, attribute: &str, converter: F) -> &mut Self
    where
        F: Fn(&PathAddress, &str, &mut ModelValue, &TransformationContext<'_>) + Send + Sync + 'static,
    {
        self.transformer
            .rules
            .added
            .push((attribute.to_string(), Arc::new(converter)));
        self
    }

    /// Run `entry` on the resource after the attribute rules
    pub fn add_resource_transformer_link(
        &mut self,
        entry: impl ChainedResourceTransformerEntry + 'static,
    ) -> &mut Self {
        let links = std::mem::take(&mut self.transformer.links);
        self.transformer.links = links.then(entry);
        self
    }

    /// Replace the generated transformer for one operation
    pub fn add_operation_transformation_override(
        &mut self,
        operation_name: &str,
        transformer: OperationTransformer,
    ) -> &mut Self {
        self.operations
            .insert(operation_name.to_string(), transformer);
        self
    }

    pub fn discard_operations(&mut self, operation_names: &[&str]) -> &mut Self {
        for name in operation_names {
            self.add_operation_transformation_override(name, OperationTransformer::Discard);
        }
        self
    }

    /// Describe a child resource; returns the child's builder
    pub fn add_child_resource(&mut self, element: PathElement) -> &mut Self {
        self.add_child(Self::new(element))
    }

    /// Describe a child that lives under a different element on the target
    ///
    /// A wildcard `to` keeps the concrete name and only renames the key.
    pub fn add_child_redirection(&mut self, from: PathElement, to: PathElement) -> &mut Self {
        let path = if to.is_wildcard() {
            PathAddressTransformer::RenameKey(to.key)
        } else {
            PathAddressTransformer::Replace(to)
        };
        let mut child = Self::new(from);
        child.path = path;
        self.add_child(child)
    }

    fn add_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn discard_child_resource(&mut self, element: PathElement) -> &mut Self {
        self.discarded.push(element);
        self
    }

    pub fn reject_child_resource(&mut self, element: PathElement) -> &mut Self {
        self.rejected.push(element);
        self
    }

    pub fn build(&self) -> ResourceTransformationDescription {
        ResourceTransformationDescription {
            element: self.element.clone(),
            path: self.path.clone(),
            transformer: Arc::new(self.transformer.clone()),
            operations: self.operations.clone(),
            children: self.children.iter().map(Self::build).collect(),
            discarded: self.discarded.clone(),
            rejected: self.rejected.clone(),
        }
    }
}

/// Built description, ready to register
#[derive(Clone)]
pub struct ResourceTransformationDescription {
    element: Option<PathElement>,
    path: PathAddressTransformer,
    transformer: Arc<DescribedTransformer>,
    operations: IndexMap<String, OperationTransformer>,
    children: Vec<ResourceTransformationDescription>,
    discarded: Vec<PathElement>,
    rejected: Vec<PathElement>,
}

impl ResourceTransformationDescription {
    pub fn element(&self) -> Option<&PathElement> {
        self.element.as_ref()
    }

    /// Register on `registration`
    ///
    /// A subsystem instance is applied to the handle itself; a child
    /// description is registered beneath it under its element.
    pub fn register(&self, registration: &mut TransformersSubRegistration<'_>) {
        match &self.element {
            None => self.apply(registration),
            Some(element) => {
                let mut child = registration
                    .register_sub_resource_with_path(element.clone(), self.path.clone());
                self.apply(&mut child);
            }
        }
    }

    /// Register a subsystem instance for `subsystem` at `versions`
    pub fn register_subsystem(
        &self,
        registry: &mut TransformerRegistry,
        subsystem: &str,
        versions: impl Into<ModelVersionRange>,
    ) {
        let mut registration = registry.register_subsystem_transformers(subsystem, versions);
        self.register(&mut registration);
    }

    fn apply(&self, registration: &mut TransformersSubRegistration<'_>) {
        let transformer = self.transformer.clone();
        registration.set_resource_transformer(ResourceTransformer::Custom(transformer.clone()));
        for name in [ADD, WRITE_ATTRIBUTE, UNDEFINE_ATTRIBUTE] {
            registration
                .register_operation_transformer(name, OperationTransformer::Custom(transformer.clone()));
        }
        for (name, override_transformer) in &self.operations {
            registration.register_operation_transformer(name.clone(), override_transformer.clone());
        }
        for element in &self.discarded {
            registration.discard_sub_resource(element.clone());
        }
        for element in &self.rejected {
            registration.reject_sub_resource(element.clone());
        }
        for child in &self.children {
            child.register(registration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::operation::{undefine_attribute_operation, write_attribute_operation};
    use crate::model::{ModelVersion, ResourceRegistration};
    use crate::transform::registry::ResolvedPolicy;
    use crate::transform::target::{TransformationTarget, TransformationTargetType};

    fn target(version: ModelVersion) -> TransformationTarget {
        TransformationTarget::new(
            Arc::new(TransformerRegistry::new()),
            "slave",
            version,
            TransformationTargetType::Host,
        )
    }

    fn rules(builder: &ResourceTransformationDescriptionBuilder) -> &AttributeTransformationRules {
        &builder.transformer.rules
    }

    #[test]
    fn test_discard_skips_reject_and_rename() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);

        let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
        builder
            .discard(DiscardAttributeChecker::Undefined, &["a"])
            .reject(RejectAttributeChecker::Undefined, &["a"])
            .rename("a", "b");

        let mut model = ModelValue::object();
        let problems = rules(&builder).apply(&context, &PathAddress::empty(), &mut model);

        assert!(problems.is_empty());
        assert!(!model.has("a"));
        assert!(!model.has("b"));
    }

    #[test]
    fn test_default_value_discard() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);
        let checker = DiscardAttributeChecker::DefaultValue(ModelValue::from(false));

        assert!(checker.is_discardable("x", &ModelValue::from(false), &context));
        assert!(checker.is_discardable("x", &ModelValue::Undefined, &context));
        assert!(!checker.is_discardable("x", &ModelValue::from(true), &context));
    }

    #[test]
    fn test_custom_discard_keeps_expressions_unless_allowed() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);
        let strict = DiscardAttributeChecker::custom(false, true, |_, _, _| true);
        let lenient = DiscardAttributeChecker::custom(true, false, |_, _, _| true);
        let expression = ModelValue::expression("${x:1}");

        assert!(!strict.is_discardable("x", &expression, &context));
        assert!(strict.is_discardable("x", &ModelValue::Undefined, &context));
        assert!(lenient.is_discardable("x", &expression, &context));
        assert!(!lenient.is_discardable("x", &ModelValue::Undefined, &context));
    }

    #[test]
    fn test_rejections_group_by_message() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);

        let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
        builder
            .reject(RejectAttributeChecker::SimpleExpressions, &["a", "b"])
            .reject(RejectAttributeChecker::Defined, &["c"]);
        let mut model = ModelValue::object()
            .with("a", ModelValue::expression("${a}"))
            .with("b", ModelValue::expression("${b}"))
            .with("c", 1);

        let problems = rules(&builder).apply(&context, &PathAddress::empty(), &mut model);

        assert_eq!(
            problems,
            vec![
                AttributeProblem::new(MESSAGE_NO_EXPRESSIONS, vec!["a".to_string(), "b".to_string()]),
                AttributeProblem::new(MESSAGE_NOT_UNDERSTOOD, vec!["c".to_string()]),
            ]
        );
    }

    #[test]
    fn test_convert_then_rename_and_added_attribute() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);

        let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
        builder
            .convert(
                |_, _, value, _| *value = ModelValue::from(value.as_i64().unwrap_or(0) * 2),
                &["size"],
            )
            .rename("size", "capacity")
            .add_attribute("mode", |_, _, value, _| *value = ModelValue::from("legacy"));
        let mut model = ModelValue::object().with("size", 21);

        rules(&builder).apply(&context, &PathAddress::empty(), &mut model);

        assert_eq!(model.get("capacity"), Some(&ModelValue::from(42i64)));
        assert_eq!(model.get("mode"), Some(&ModelValue::from("legacy")));
        assert!(!model.has("size"));
    }

    #[test]
    fn test_write_attribute_paths() {
        let target = target(ModelVersion::new(1, 4, 0));
        let root = Resource::new();
        let registration = ResourceRegistration::new();
        let context = TransformationContext::new(&target, &root, &registration);
        let address = PathAddress::of(&[("subsystem", "ee")]);

        let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
        builder
            .discard(DiscardAttributeChecker::Undefined, &["gone"])
            .reject(RejectAttributeChecker::SimpleExpressions, &["plain"])
            .rename("old", "new");
        let transformer = builder.build().transformer;

        let discarded = transformer
            .transform_operation(&context, &address, &undefine_attribute_operation(&address, "gone"))
            .unwrap();
        assert!(discarded.is_discarded());

        let rejected = transformer
            .transform_operation(
                &context,
                &address,
                &write_attribute_operation(&address, "plain", ModelValue::expression("${p}")),
            )
            .unwrap();
        assert!(rejected.reject_operation(&ModelValue::Undefined));
        assert!(rejected.failure_description().contains(MESSAGE_NO_EXPRESSIONS));

        let renamed = transformer
            .transform_operation(&context, &address, &write_attribute_operation(&address, "old", 1))
            .unwrap();
        assert_eq!(
            renamed.operation().and_then(|op| op.get(NAME)),
            Some(&ModelValue::from("new"))
        );
    }

    #[test]
    fn test_register_child_description() {
        let mut registry = TransformerRegistry::new();
        let mut builder = ResourceTransformationDescriptionBuilder::create_subsystem_instance();
        builder
            .add_child_redirection(
                PathElement::wildcard("thread-factory"),
                PathElement::wildcard("factory"),
            )
            .discard(DiscardAttributeChecker::Always, &["priority"]);
        builder.discard_child_resource(PathElement::wildcard("scheduled-executor"));
        builder
            .build()
            .register_subsystem(&mut registry, "ee", ModelVersion::new(1, 1, 0));

        let resolved = registry.resolve(
            &PathAddress::of(&[("subsystem", "ee"), ("thread-factory", "tf")]),
            ModelVersion::new(1, 4, 0),
            &|_| Some(ModelVersion::new(1, 1, 0)),
        );
        assert_eq!(
            resolved
                .path_transformer()
                .transform_element(&PathElement::new("thread-factory", "tf")),
            vec![PathElement::new("factory", "tf")]
        );
        assert!(resolved.entry().and_then(|e| e.resource_transformer()).is_some());

        let discarded = registry.resolve(
            &PathAddress::of(&[("subsystem", "ee"), ("scheduled-executor", "s")]),
            ModelVersion::new(1, 4, 0),
            &|_| Some(ModelVersion::new(1, 1, 0)),
        );
        assert_eq!(discarded.policy(), ResolvedPolicy::Discard);
    }
}
