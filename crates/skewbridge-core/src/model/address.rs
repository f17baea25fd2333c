use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ModelValue;
use crate::errors::{Result, TransformError};

/// Value of a path element that stands for every concrete name of its type
pub const WILDCARD_VALUE: &str = "*";

/// One `(key, value)` segment of a [`PathAddress`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a wildcard element for the given type key
    pub fn wildcard(key: impl Into<String>) -> Self {
        Self::new(key, WILDCARD_VALUE)
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD_VALUE
    }

    /// Whether this element, used as a schema-level definition, covers `other`
    pub fn matches(&self, other: &PathElement) -> bool {
        self.key == other.key && (self.is_wildcard() || self.value == other.value)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Immutable ordered sequence of path elements identifying a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    /// The root address
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// Convenience constructor from `(key, value)` pairs
    pub fn of(pairs: &[(&str, &str)]) -> Self {
        Self(pairs.iter().map(|(k, v)| PathElement::new(*k, *v)).collect())
    }

    /// A new address with `element` appended
    pub fn append(&self, element: PathElement) -> Self {
        let mut elements = self.0.clone();
        elements.push(element);
        Self(elements)
    }

    /// A new address with every element of `other` appended
    pub fn append_address(&self, other: &PathAddress) -> Self {
        let mut elements = self.0.clone();
        elements.extend(other.0.iter().cloned());
        Self(elements)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.0.iter()
    }

    pub fn element(&self, index: usize) -> Option<&PathElement> {
        self.0.get(index)
    }

    pub fn last_element(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// The address without its last element; the root is its own parent
    pub fn parent(&self) -> Self {
        let mut elements = self.0.clone();
        elements.pop();
        Self(elements)
    }

    /// Suffix starting at `start`
    pub fn sub_address(&self, start: usize) -> Self {
        Self(self.0.iter().skip(start).cloned().collect())
    }

    /// Prefix of `len` elements
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0.iter().take(len).cloned().collect())
    }

    /// Whether any element is a wildcard
    pub fn is_multi_target(&self) -> bool {
        self.0.iter().any(PathElement::is_wildcard)
    }

    /// The subsystem named by the first `subsystem=` element, if any
    pub fn subsystem_name(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.key == crate::model::operation::SUBSYSTEM)
            .map(|e| e.value.as_str())
    }

    /// Operation `address` representation: a list of properties
    pub fn to_model_value(&self) -> ModelValue {
        ModelValue::List(
            self.0
                .iter()
                .map(|e| ModelValue::property(e.key.clone(), ModelValue::from(e.value.as_str())))
                .collect(),
        )
    }

    /// Parse an operation `address` value
    ///
    /// Accepts a list of properties, a list of single-key objects, or an
    /// undefined value (the root).
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if an entry is neither a property nor a
    /// single-key object with a string value.
    pub fn from_model_value(value: &ModelValue) -> Result<Self> {
        let items = match value {
            ModelValue::Undefined => return Ok(Self::empty()),
            ModelValue::List(items) => items,
            other => {
                return Err(TransformError::InvalidAddress {
                    reason: format!("expected a list, got {}", other.model_type()),
                })
            }
        };

        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let (key, value) = match item {
                ModelValue::Property(key, value) => (key.as_str(), value.as_ref()),
                ModelValue::Object(map) if map.len() == 1 => {
                    let (key, value) = map.iter().next().ok_or_else(|| {
                        TransformError::InvalidAddress {
                            reason: "empty address element".to_string(),
                        }
                    })?;
                    (key.as_str(), value)
                }
                other => {
                    return Err(TransformError::InvalidAddress {
                        reason: format!("unsupported address element {}", other),
                    })
                }
            };
            let value = value.as_str().ok_or_else(|| TransformError::InvalidAddress {
                reason: format!("element '{}' has a non-string value {}", key, value),
            })?;
            elements.push(PathElement::new(key, value));
        }
        Ok(Self(elements))
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for element in &self.0 {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl From<PathElement> for PathAddress {
    fn from(element: PathElement) -> Self {
        Self(vec![element])
    }
}

impl<'a> IntoIterator for &'a PathAddress {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_matches_any_value() {
        let def = PathElement::wildcard("thread-factory");

        assert!(def.matches(&PathElement::new("thread-factory", "default")));
        assert!(!def.matches(&PathElement::new("executor", "default")));
        assert!(!PathElement::new("a", "b").matches(&PathElement::new("a", "c")));
    }

    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(PathAddress::empty().parent(), PathAddress::empty());
    }

    #[test]
    fn test_model_value_roundtrip() {
        let address = PathAddress::of(&[("profile", "full"), ("subsystem", "ee")]);
        let parsed = PathAddress::from_model_value(&address.to_model_value()).unwrap();

        assert_eq!(parsed, address);
        assert_eq!(parsed.subsystem_name(), Some("ee"));
    }

    #[test]
    fn test_from_model_value_rejects_scalars() {
        let err = PathAddress::from_model_value(&ModelValue::from("oops")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidAddress { .. }));
    }

    #[test]
    fn test_display() {
        let address = PathAddress::of(&[("subsystem", "ee"), ("context-service", "*")]);
        assert_eq!(address.to_string(), "/subsystem=ee/context-service=*");
        assert_eq!(PathAddress::empty().to_string(), "/");
    }
}
