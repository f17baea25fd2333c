//! Attribute transformation requirement checks
//!
//! Pure predicates answering "does this attribute's current value need
//! transformation for the target?". They drive both the reject checks of
//! the description builder and the expression-rejecting transformer.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::context::TransformationContext;
use crate::model::ModelValue;

pub const MESSAGE_NO_EXPRESSIONS: &str = "The following attributes do not support expressions:";
pub const MESSAGE_NOT_UNDERSTOOD: &str =
    "The following attributes are not understood in the target model version and this resource will need to be ignored on the target host:";
pub const MESSAGE_MUST_BE_DEFINED: &str =
    "The following attributes must be defined in the target model version:";

/// Predicate signature for custom checks: attribute name, current value, context
pub type AttributePredicate =
    Arc<dyn Fn(&str, &ModelValue, &TransformationContext<'_>) -> bool + Send + Sync>;

static EXPRESSION_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn expression_pattern() -> Option<&'static Regex> {
    EXPRESSION_PATTERN
        .get_or_init(|| Regex::new(r"^.*\$\{.*\}.*$").ok())
        .as_ref()
}

/// Whether a value holds an unresolved `${...}` expression anywhere
///
/// Expression values always count. String values count when they match the
/// expression pattern. Lists, objects and properties are searched
/// recursively.
pub fn contains_expression(value: &ModelValue) -> bool {
    match value {
        ModelValue::Expression(_) => true,
        ModelValue::String(s) => expression_pattern().is_some_and(|re| re.is_match(s)),
        ModelValue::List(items) => items.iter().any(contains_expression),
        ModelValue::Object(map) => map.values().any(contains_expression),
        ModelValue::Property(_, inner) => contains_expression(inner),
        _ => false,
    }
}

#[derive(Clone)]
pub enum RequirementChecker {
    /// Value contains an expression
    SimpleExpressions,
    /// Value is defined
    Defined,
    /// Value is undefined; absence itself is the condition
    Undefined,
    Custom(AttributePredicate),
}

impl RequirementChecker {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str, &ModelValue, &TransformationContext<'_>) -> bool + Send + Sync + 'static,
    {
        RequirementChecker::Custom(Arc::new(predicate))
    }

    pub fn is_transformation_needed(
        &self,
        attribute_name: &str,
        value: &ModelValue,
        context: &TransformationContext<'_>,
    ) -> bool {
        match self {
            RequirementChecker::SimpleExpressions => contains_expression(value),
            RequirementChecker::Defined => value.is_defined(),
            RequirementChecker::Undefined => !value.is_defined(),
            RequirementChecker::Custom(predicate) => predicate(attribute_name, value, context),
        }
    }
}

impl fmt::Debug for RequirementChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementChecker::SimpleExpressions => f.write_str("SimpleExpressions"),
            RequirementChecker::Defined => f.write_str("Defined"),
            RequirementChecker::Undefined => f.write_str("Undefined"),
            RequirementChecker::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
