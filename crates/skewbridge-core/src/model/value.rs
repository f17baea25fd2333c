use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`ModelValue`], used by attribute definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Undefined,
    Boolean,
    Int,
    Long,
    Double,
    String,
    Bytes,
    Expression,
    List,
    Object,
    Property,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelType::Undefined => "UNDEFINED",
            ModelType::Boolean => "BOOLEAN",
            ModelType::Int => "INT",
            ModelType::Long => "LONG",
            ModelType::Double => "DOUBLE",
            ModelType::String => "STRING",
            ModelType::Bytes => "BYTES",
            ModelType::Expression => "EXPRESSION",
            ModelType::List => "LIST",
            ModelType::Object => "OBJECT",
            ModelType::Property => "PROPERTY",
        };
        f.write_str(name)
    }
}

/// Typed value tree used for configuration models and operation payloads.
///
/// Objects keep their keys in insertion order. A key can be present with an
/// `Undefined` value, which is distinct from the key being absent: `has`
/// reports the former, `has_defined` does not.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelValue {
    #[default]
    Undefined,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Unresolved `${...}` expression, kept verbatim
    Expression(String),
    List(Vec<ModelValue>),
    Object(IndexMap<String, ModelValue>),
    Property(String, Box<ModelValue>),
}

impl ModelValue {
    /// Create an empty object value
    pub fn object() -> Self {
        ModelValue::Object(IndexMap::new())
    }

    /// Create an expression value
    pub fn expression(expression: impl Into<String>) -> Self {
        ModelValue::Expression(expression.into())
    }

    /// Create a property value
    pub fn property(name: impl Into<String>, value: ModelValue) -> Self {
        ModelValue::Property(name.into(), Box::new(value))
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ModelValue::Undefined => ModelType::Undefined,
            ModelValue::Boolean(_) => ModelType::Boolean,
            ModelValue::Int(_) => ModelType::Int,
            ModelValue::Long(_) => ModelType::Long,
            ModelValue::Double(_) => ModelType::Double,
            ModelValue::String(_) => ModelType::String,
            ModelValue::Bytes(_) => ModelType::Bytes,
            ModelValue::Expression(_) => ModelType::Expression,
            ModelValue::List(_) => ModelType::List,
            ModelValue::Object(_) => ModelType::Object,
            ModelValue::Property(_, _) => ModelType::Property,
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, ModelValue::Undefined)
    }

    /// Look up a key of an object value
    ///
    /// Returns `None` if the key is absent or this value is not an object.
    pub fn get(&self, key: &str) -> Option<&ModelValue> {
        match self {
            ModelValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ModelValue> {
        match self {
            ModelValue::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    /// Insert a key into an object value, returning the previous value
    ///
    /// An `Undefined` receiver becomes an empty object first.
    ///
    /// # Panics
    ///
    /// Panics if the receiver is defined but not an object.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ModelValue>) -> Option<ModelValue> {
        if !self.is_defined() {
            *self = ModelValue::object();
        }
        match self {
            ModelValue::Object(map) => map.insert(key.into(), value.into()),
            other => panic!("cannot insert a key into a {} value", other.model_type()),
        }
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a key from an object value, keeping the order of the others
    pub fn remove(&mut self, key: &str) -> Option<ModelValue> {
        match self {
            ModelValue::Object(map) => map.shift_remove(key),
            _ => None,
        }
    }

    /// Whether the object value carries the key at all
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether the object value carries the key with a defined value
    pub fn has_defined(&self, key: &str) -> bool {
        self.get(key).map(ModelValue::is_defined).unwrap_or(false)
    }

    /// Keys of an object value, in insertion order
    pub fn keys(&self) -> Vec<&str> {
        match self {
            ModelValue::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ModelValue>> {
        match self {
            ModelValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, ModelValue>> {
        match self {
            ModelValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ModelValue]> {
        match self {
            ModelValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// String content of a string or expression value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::String(s) | ModelValue::Expression(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ModelValue::Int(i) => Some(i64::from(*i)),
            ModelValue::Long(l) => Some(*l),
            ModelValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelValue::Boolean(b) => Some(*b),
            ModelValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Name and value of a property value
    pub fn as_property(&self) -> Option<(&str, &ModelValue)> {
        match self {
            ModelValue::Property(name, value) => Some((name, value)),
            _ => None,
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        ModelValue::String(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        ModelValue::String(value)
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        ModelValue::Boolean(value)
    }
}

impl From<i32> for ModelValue {
    fn from(value: i32) -> Self {
        ModelValue::Int(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        ModelValue::Long(value)
    }
}

impl From<f64> for ModelValue {
    fn from(value: f64) -> Self {
        ModelValue::Double(value)
    }
}

impl From<Vec<ModelValue>> for ModelValue {
    fn from(value: Vec<ModelValue>) -> Self {
        ModelValue::List(value)
    }
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Undefined => f.write_str("undefined"),
            ModelValue::Boolean(b) => write!(f, "{}", b),
            ModelValue::Int(i) => write!(f, "{}", i),
            ModelValue::Long(l) => write!(f, "{}L", l),
            ModelValue::Double(d) => write!(f, "{}", d),
            ModelValue::String(s) => write!(f, "{:?}", s),
            ModelValue::Bytes(bytes) => {
                f.write_str("bytes {")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "0x{:02x}", b)?;
                }
                f.write_str("}")
            }
            ModelValue::Expression(e) => write!(f, "expression {:?}", e),
            ModelValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ModelValue::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?} => {}", key, value)?;
                }
                f.write_str("}")
            }
            ModelValue::Property(name, value) => write!(f, "({:?} => {})", name, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_becomes_object_on_insert() {
        let mut value = ModelValue::Undefined;
        value.insert("a", "b");

        assert_eq!(value.model_type(), ModelType::Object);
        assert_eq!(value.get("a"), Some(&ModelValue::from("b")));
    }

    #[test]
    fn test_has_vs_has_defined() {
        let value = ModelValue::object()
            .with("set", 1)
            .with("unset", ModelValue::Undefined);

        assert!(value.has("set"));
        assert!(value.has("unset"));
        assert!(value.has_defined("set"));
        assert!(!value.has_defined("unset"));
        assert!(!value.has("missing"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut value = ModelValue::object().with("a", 1).with("b", 2).with("c", 3);
        value.remove("b");

        assert_eq!(value.keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_display_is_dmr_like() {
        let value = ModelValue::object()
            .with("name", "x")
            .with("expr", ModelValue::expression("${a}"));

        assert_eq!(
            value.to_string(),
            "{\"name\" => \"x\", \"expr\" => expression \"${a}\"}"
        );
    }

    #[test]
    #[should_panic(expected = "cannot insert a key into a STRING value")]
    fn test_insert_into_scalar_panics() {
        let mut value = ModelValue::from("scalar");
        value.insert("a", 1);
    }

    #[test]
    fn test_serde_roundtrip_preserves_types() {
        let value = ModelValue::object()
            .with("i", 1)
            .with("l", 2i64)
            .with("p", ModelValue::property("k", ModelValue::from("v")));

        let json = serde_json::to_string(&value).unwrap();
        let back: ModelValue = serde_json::from_str(&json).unwrap();

        assert_eq!(back, value);
        assert_eq!(back.get("i").map(ModelValue::model_type), Some(ModelType::Int));
    }
}
