//! JSON form of persisted definitions
//!
//! Definition files hold plain JSON rather than the tagged serde form of
//! [`ModelValue`], so they can be written and reviewed by hand. The mapping
//! follows the DMR JSON conventions:
//!
//! - `null` is `Undefined`; integers that fit 32 bits are `Int`, others `Long`
//! - `{"EXPRESSION_VALUE": "${...}"}` is an expression
//! - `{"BYTES_VALUE": "<hex>"}` is a byte array
//! - a property encodes as a one-entry object and decodes as an object

use serde_json::{Map, Number, Value};
use skewbridge_core::ModelValue;

const EXPRESSION_VALUE: &str = "EXPRESSION_VALUE";
const BYTES_VALUE: &str = "BYTES_VALUE";

/// Decode a plain JSON value into a model value
pub fn from_json(value: &Value) -> ModelValue {
    match value {
        Value::Null => ModelValue::Undefined,
        Value::Bool(b) => ModelValue::Boolean(*b),
        Value::Number(n) => number_from_json(n),
        Value::String(s) => ModelValue::String(s.clone()),
        Value::Array(items) => ModelValue::List(items.iter().map(from_json).collect()),
        Value::Object(map) => {
            if let Some(decoded) = tagged_from_json(map) {
                return decoded;
            }
            let mut object = ModelValue::object();
            for (key, item) in map {
                object.insert(key.clone(), from_json(item));
            }
            object
        }
    }
}

fn number_from_json(n: &Number) -> ModelValue {
    match n.as_i64() {
        Some(i) => match i32::try_from(i) {
            Ok(small) => ModelValue::Int(small),
            Err(_) => ModelValue::Long(i),
        },
        None => ModelValue::Double(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn tagged_from_json(map: &Map<String, Value>) -> Option<ModelValue> {
    if map.len() != 1 {
        return None;
    }
    if let Some(Value::String(expression)) = map.get(EXPRESSION_VALUE) {
        return Some(ModelValue::expression(expression.clone()));
    }
    if let Some(Value::String(encoded)) = map.get(BYTES_VALUE) {
        return hex::decode(encoded).ok().map(ModelValue::Bytes);
    }
    None
}

/// Encode a model value as plain JSON
pub fn to_json(value: &ModelValue) -> Value {
    match value {
        ModelValue::Undefined => Value::Null,
        ModelValue::Boolean(b) => Value::Bool(*b),
        ModelValue::Int(i) => Value::from(*i),
        ModelValue::Long(l) => Value::from(*l),
        ModelValue::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
        ModelValue::String(s) => Value::String(s.clone()),
        ModelValue::Bytes(bytes) => single(BYTES_VALUE, Value::String(hex::encode(bytes))),
        ModelValue::Expression(e) => single(EXPRESSION_VALUE, Value::String(e.clone())),
        ModelValue::List(items) => Value::Array(items.iter().map(to_json).collect()),
        ModelValue::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), to_json(item)))
                .collect(),
        ),
        ModelValue::Property(name, item) => single(name, to_json(item)),
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
