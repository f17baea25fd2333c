//! Schema-level description of the resource tree
//!
//! A [`ResourceRegistration`] says which attributes a resource at a given
//! address may carry and which child types exist beneath it. The transformer
//! uses it to validate incoming models, to decide default discard behaviour
//! for remote and runtime-only resources, and as input to the model matcher.

use indexmap::IndexMap;

use super::address::{PathAddress, PathElement};
use super::value::{ModelType, ModelValue};
use crate::errors::{Result, TransformError};

const DESC_ATTRIBUTES: &str = "attributes";
const DESC_CHILDREN: &str = "children";
const DESC_TYPE: &str = "type";
const DESC_NILLABLE: &str = "nillable";
const DESC_EXPRESSIONS_ALLOWED: &str = "expressions-allowed";
const DESC_STORAGE: &str = "storage";
const DESC_DEFAULT: &str = "default";
const DESC_REMOTE: &str = "remote";
const DESC_RUNTIME_ONLY: &str = "runtime-only";
const DESC_ALIAS: &str = "alias";

/// Where an attribute's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStorage {
    Configuration,
    Runtime,
}

/// Definition of one attribute of a registration
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub name: String,
    pub value_type: ModelType,
    pub nillable: bool,
    pub allows_expressions: bool,
    pub storage: AttributeStorage,
    pub default_value: Option<ModelValue>,
}

impl AttributeDefinition {
    /// A nillable configuration attribute that does not allow expressions
    pub fn new(name: impl Into<String>, value_type: ModelType) -> Self {
        Self {
            name: name.into(),
            value_type,
            nillable: true,
            allows_expressions: false,
            storage: AttributeStorage::Configuration,
            default_value: None,
        }
    }

    pub fn nillable(mut self, nillable: bool) -> Self {
        self.nillable = nillable;
        self
    }

    pub fn allow_expressions(mut self, allow: bool) -> Self {
        self.allows_expressions = allow;
        self
    }

    pub fn storage(mut self, storage: AttributeStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn default_value(mut self, value: impl Into<ModelValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Registration of one resource type in the schema tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceRegistration {
    attributes: IndexMap<String, AttributeDefinition>,
    children: IndexMap<PathElement, ResourceRegistration>,
    remote: bool,
    runtime_only: bool,
    alias: bool,
}

impl ResourceRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, definition: AttributeDefinition) -> Self {
        self.attributes.insert(definition.name.clone(), definition);
        self
    }

    /// Add a nillable configuration attribute of the given type
    pub fn with_simple_attribute(self, name: &str, value_type: ModelType) -> Self {
        self.with_attribute(AttributeDefinition::new(name, value_type))
    }

    pub fn with_child(mut self, element: PathElement, child: ResourceRegistration) -> Self {
        self.children.insert(element, child);
        self
    }

    pub fn remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    pub fn runtime_only(mut self, runtime_only: bool) -> Self {
        self.runtime_only = runtime_only;
        self
    }

    pub fn alias(mut self, alias: bool) -> Self {
        self.alias = alias;
        self
    }

    pub fn register_sub_model(&mut self, element: PathElement, child: ResourceRegistration) {
        self.children.insert(element, child);
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    /// Child elements as registered (wildcard or concrete)
    pub fn child_addresses(&self) -> Vec<&PathElement> {
        self.children.keys().collect()
    }

    /// Direct child registration for `element`, concrete match first
    pub fn child(&self, element: &PathElement) -> Option<&ResourceRegistration> {
        self.children.get(element).or_else(|| {
            self.children
                .get(&PathElement::wildcard(element.key.clone()))
        })
    }

    /// Registration at a relative address
    pub fn sub_model(&self, address: &PathAddress) -> Option<&ResourceRegistration> {
        address
            .iter()
            .try_fold(self, |current, element| current.child(element))
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn is_runtime_only(&self) -> bool {
        self.runtime_only
    }

    pub fn is_alias(&self) -> bool {
        self.alias
    }

    /// Encode as the persisted description value tree
    pub fn to_description(&self) -> ModelValue {
        let mut attributes = ModelValue::object();
        for def in self.attributes.values() {
            let mut attr = ModelValue::object()
                .with(DESC_TYPE, def.value_type.to_string())
                .with(DESC_NILLABLE, def.nillable)
                .with(DESC_EXPRESSIONS_ALLOWED, def.allows_expressions)
                .with(
                    DESC_STORAGE,
                    match def.storage {
                        AttributeStorage::Configuration => "configuration",
                        AttributeStorage::Runtime => "runtime",
                    },
                );
            if let Some(default) = &def.default_value {
                attr.insert(DESC_DEFAULT, default.clone());
            }
            attributes.insert(def.name.clone(), attr);
        }

        let mut children = ModelValue::object();
        for (element, child) in &self.children {
            let entry = children.get_mut(&element.key);
            match entry {
                Some(named) => {
                    named.insert(element.value.clone(), child.to_description());
                }
                None => {
                    children.insert(
                        element.key.clone(),
                        ModelValue::object().with(element.value.clone(), child.to_description()),
                    );
                }
            }
        }

        let mut description = ModelValue::object()
            .with(DESC_ATTRIBUTES, attributes)
            .with(DESC_CHILDREN, children);
        if self.remote {
            description.insert(DESC_REMOTE, true);
        }
        if self.runtime_only {
            description.insert(DESC_RUNTIME_ONLY, true);
        }
        if self.alias {
            description.insert(DESC_ALIAS, true);
        }
        description
    }

    /// Decode a persisted description value tree
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescription` naming the offending address when the
    /// value is not an object, an attribute has an unknown type, or a flag
    /// is not a boolean.
    pub fn from_description(description: &ModelValue) -> Result<Self> {
        Self::decode(description, &PathAddress::empty())
    }

    fn decode(description: &ModelValue, address: &PathAddress) -> Result<Self> {
        let invalid = |reason: String| TransformError::InvalidDescription {
            address: address.to_string(),
            reason,
        };
        if description.as_object().is_none() {
            return Err(invalid("description is not an object".to_string()));
        }

        let mut registration = ResourceRegistration::new();

        if let Some(attributes) = description.get(DESC_ATTRIBUTES).and_then(ModelValue::as_object) {
            for (name, attr) in attributes {
                let type_name = attr
                    .get(DESC_TYPE)
                    .and_then(ModelValue::as_str)
                    .ok_or_else(|| invalid(format!("attribute '{}' has no type", name)))?;
                let value_type = parse_type_name(type_name)
                    .ok_or_else(|| invalid(format!("attribute '{}' has unknown type {}", name, type_name)))?;
                let storage = match attr.get(DESC_STORAGE).and_then(ModelValue::as_str) {
                    None | Some("configuration") => AttributeStorage::Configuration,
                    Some("runtime") => AttributeStorage::Runtime,
                    Some(other) => {
                        return Err(invalid(format!(
                            "attribute '{}' has unknown storage {}",
                            name, other
                        )))
                    }
                };
                registration.attributes.insert(
                    name.clone(),
                    AttributeDefinition {
                        name: name.clone(),
                        value_type,
                        nillable: flag(attr, DESC_NILLABLE, true).map_err(&invalid)?,
                        allows_expressions: flag(attr, DESC_EXPRESSIONS_ALLOWED, false)
                            .map_err(&invalid)?,
                        storage,
                        default_value: attr.get(DESC_DEFAULT).filter(|v| v.is_defined()).cloned(),
                    },
                );
            }
        }

        if let Some(children) = description.get(DESC_CHILDREN).and_then(ModelValue::as_object) {
            for (child_type, named) in children {
                let named = named
                    .as_object()
                    .ok_or_else(|| invalid(format!("child type '{}' is not an object", child_type)))?;
                for (name, child_description) in named {
                    let element = PathElement::new(child_type.clone(), name.clone());
                    let child = Self::decode(child_description, &address.append(element.clone()))?;
                    registration.children.insert(element, child);
                }
            }
        }

        registration.remote = flag(description, DESC_REMOTE, false).map_err(&invalid)?;
        registration.runtime_only = flag(description, DESC_RUNTIME_ONLY, false).map_err(&invalid)?;
        registration.alias = flag(description, DESC_ALIAS, false).map_err(&invalid)?;
        Ok(registration)
    }
}

fn flag(value: &ModelValue, key: &str, default: bool) -> std::result::Result<bool, String> {
    match value.get(key) {
        None | Some(ModelValue::Undefined) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| format!("'{}' must be a boolean, got {}", key, v)),
    }
}

fn parse_type_name(name: &str) -> Option<ModelType> {
    let value_type = match name.to_ascii_uppercase().as_str() {
        "UNDEFINED" => ModelType::Undefined,
        "BOOLEAN" => ModelType::Boolean,
        "INT" => ModelType::Int,
        "LONG" => ModelType::Long,
        "DOUBLE" => ModelType::Double,
        "STRING" => ModelType::String,
        "BYTES" => ModelType::Bytes,
        "EXPRESSION" => ModelType::Expression,
        "LIST" => ModelType::List,
        "OBJECT" => ModelType::Object,
        "PROPERTY" => ModelType::Property,
        _ => return None,
    };
    Some(value_type)
}
