//! Operation and result value helpers
//!
//! Operations are plain [`ModelValue`] objects carrying at least `operation`
//! and `address`. Composite operations carry their sub-operations under
//! `steps`; composite results carry one entry per step under `result`,
//! keyed `step-1` to `step-N`.

use super::address::PathAddress;
use super::value::ModelValue;
use crate::errors::{Result, TransformError};

pub const OP: &str = "operation";
pub const OP_ADDR: &str = "address";
pub const COMPOSITE: &str = "composite";
pub const STEPS: &str = "steps";
pub const ADD: &str = "add";
pub const REMOVE: &str = "remove";
pub const WRITE_ATTRIBUTE: &str = "write-attribute";
pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";
pub const READ_RESOURCE: &str = "read-resource";
pub const NAME: &str = "name";
pub const VALUE: &str = "value";
pub const OUTCOME: &str = "outcome";
pub const SUCCESS: &str = "success";
pub const FAILED: &str = "failed";
pub const IGNORED: &str = "ignored";
pub const RESULT: &str = "result";
pub const FAILURE_DESCRIPTION: &str = "failure-description";
pub const SUBSYSTEM: &str = "subsystem";

/// Fields that every operation carries and that are never treated as parameters
pub const OPERATION_FIELDS: &[&str] = &[OP, OP_ADDR];

pub fn create_operation(name: &str, address: &PathAddress) -> ModelValue {
    ModelValue::object()
        .with(OP, name)
        .with(OP_ADDR, address.to_model_value())
}

pub fn create_add_operation(address: &PathAddress) -> ModelValue {
    create_operation(ADD, address)
}

pub fn create_remove_operation(address: &PathAddress) -> ModelValue {
    create_operation(REMOVE, address)
}

pub fn write_attribute_operation(
    address: &PathAddress,
    name: &str,
    value: impl Into<ModelValue>,
) -> ModelValue {
    create_operation(WRITE_ATTRIBUTE, address)
        .with(NAME, name)
        .with(VALUE, value)
}

pub fn undefine_attribute_operation(address: &PathAddress, name: &str) -> ModelValue {
    create_operation(UNDEFINE_ATTRIBUTE, address).with(NAME, name)
}

/// Composite operation at the root address
pub fn composite_operation(steps: Vec<ModelValue>) -> ModelValue {
    create_operation(COMPOSITE, &PathAddress::empty()).with(STEPS, ModelValue::List(steps))
}

/// Name of an operation
///
/// # Errors
///
/// Returns `MissingOperationField` if `operation` is absent or not a string.
pub fn operation_name(operation: &ModelValue) -> Result<&str> {
    operation
        .get(OP)
        .and_then(ModelValue::as_str)
        .ok_or_else(|| TransformError::MissingOperationField {
            field: OP.to_string(),
        })
}

/// Address of an operation
///
/// # Errors
///
/// Returns `MissingOperationField` if `address` is absent, or
/// `InvalidAddress` if it cannot be parsed.
pub fn operation_address(operation: &ModelValue) -> Result<PathAddress> {
    let value = operation
        .get(OP_ADDR)
        .ok_or_else(|| TransformError::MissingOperationField {
            field: OP_ADDR.to_string(),
        })?;
    PathAddress::from_model_value(value)
}

/// Operation parameters, excluding `operation` and `address`
pub fn operation_parameters(operation: &ModelValue) -> Vec<(&str, &ModelValue)> {
    operation
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(k, _)| !OPERATION_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v))
                .collect()
        })
        .unwrap_or_default()
}

pub fn success_result(result: ModelValue) -> ModelValue {
    ModelValue::object()
        .with(OUTCOME, SUCCESS)
        .with(RESULT, result)
}

pub fn failed_result(description: &str) -> ModelValue {
    ModelValue::object()
        .with(OUTCOME, FAILED)
        .with(FAILURE_DESCRIPTION, description)
        .with(RESULT, ModelValue::Undefined)
}

pub fn ignored_result() -> ModelValue {
    ModelValue::object()
        .with(OUTCOME, IGNORED)
        .with(RESULT, ModelValue::Undefined)
}

/// Result value as an object that outcome fields can be written into
///
/// A defined non-object value, as a misbehaving target might report, is
/// kept as the `result` field of a new object.
pub fn result_object(result: ModelValue) -> ModelValue {
    match result {
        ModelValue::Object(_) | ModelValue::Undefined => result,
        other => ModelValue::object().with(RESULT, other),
    }
}

/// Key of a composite step result; `index` is zero based
pub fn step_key(index: usize) -> String {
    format!("step-{}", index + 1)
}

/// Whether a result value reports the given outcome
pub fn has_outcome(result: &ModelValue, outcome: &str) -> bool {
    result.get(OUTCOME).and_then(ModelValue::as_str) == Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_attribute_operation_shape() {
        let address = PathAddress::of(&[("subsystem", "ee")]);
        let op = write_attribute_operation(&address, "annotation-property-replacement", true);

        assert_eq!(operation_name(&op).unwrap(), WRITE_ATTRIBUTE);
        assert_eq!(operation_address(&op).unwrap(), address);
        assert_eq!(op.get(VALUE), Some(&ModelValue::Boolean(true)));
    }

    #[test]
    fn test_operation_parameters_skip_header_fields() {
        let op = create_add_operation(&PathAddress::empty()).with("a", 1).with("b", 2);
        let names: Vec<&str> = operation_parameters(&op).into_iter().map(|(k, _)| k).collect();

        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_operation_name() {
        let err = operation_name(&ModelValue::object()).unwrap_err();
        assert!(matches!(err, TransformError::MissingOperationField { .. }));
    }

    #[test]
    fn test_result_object_wraps_scalars() {
        let wrapped = result_object(ModelValue::from("oops"));
        let kept = result_object(success_result(ModelValue::from(1)));

        assert_eq!(wrapped.get(RESULT), Some(&ModelValue::from("oops")));
        assert!(has_outcome(&kept, SUCCESS));
        assert_eq!(result_object(ModelValue::Undefined), ModelValue::Undefined);
    }

    #[test]
    fn test_step_key_is_one_based() {
        assert_eq!(step_key(0), "step-1");
        assert_eq!(step_key(4), "step-5");
    }
}
