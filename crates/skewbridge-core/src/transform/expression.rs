//! Expression resolution for targets that cannot resolve expressions
//!
//! An [`ExpressionSnapshot`] captures properties and the process
//! environment once, so every transformation pass against a target sees the
//! same values. Supported syntax:
//!
//! * `${name}` and `${name:default}`
//! * `${a,b:default}`: the first alternative with a value wins
//! * `${env.NAME}`: environment variable
//! * `$$`: a literal `$`, so `$${x}` yields `${x}`
//! * expressions nested inside a default, several expressions in one string

use std::collections::HashMap;

use crate::errors::{Result, TransformError};
use crate::model::ModelValue;

const ENV_PREFIX: &str = "env.";

pub trait TransformerExpressionResolver: Send + Sync {
    /// Copy of `value` with every expression replaced by its string value
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedExpression` when an expression has no value and no default.
    fn resolve_expressions(&self, value: &ModelValue) -> Result<ModelValue>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionSnapshot {
    properties: HashMap<String, String>,
    environment: HashMap<String, String>,
}

impl ExpressionSnapshot {
    /// Snapshot of the current process environment, with no properties
    pub fn capture() -> Self {
        Self {
            properties: HashMap::new(),
            environment: std::env::vars().collect(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_environment_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name.strip_prefix(ENV_PREFIX) {
            Some(variable) => self.environment.get(variable).map(String::as_str),
            None => self.property(name),
        }
    }

    /// Resolve every expression in a string
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedExpression` naming the first expression without a value.
    pub fn resolve_string(&self, input: &str) -> Result<String> {
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len());
        let mut i = 0;
        while i < chars.len() {
            match (chars[i], chars.get(i + 1)) {
                ('$', Some('$')) => {
                    out.push('$');
                    i += 2;
                }
                ('$', Some('{')) => match matching_brace(&chars, i + 2) {
                    Some(end) => {
                        let body: String = chars[i + 2..end].iter().collect();
                        out.push_str(&self.resolve_body(&body)?);
                        i = end + 1;
                    }
                    None => {
                        out.extend(&chars[i..]);
                        break;
                    }
                },
                (c, _) => {
                    out.push(c);
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    fn resolve_body(&self, body: &str) -> Result<String> {
        let (names, default) = split_default(body);
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if let Some(value) = self.lookup(name) {
                return Ok(value.to_string());
            }
        }
        match default {
            Some(default) => self.resolve_string(default),
            None => Err(TransformError::UnresolvedExpression {
                expression: format!("${{{}}}", body),
            }),
        }
    }
}

impl TransformerExpressionResolver for ExpressionSnapshot {
    fn resolve_expressions(&self, value: &ModelValue) -> Result<ModelValue> {
        Ok(match value {
            ModelValue::Expression(expression) => {
                ModelValue::String(self.resolve_string(expression)?)
            }
            ModelValue::List(items) => ModelValue::List(
                items
                    .iter()
                    .map(|item| self.resolve_expressions(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ModelValue::Object(map) => {
                let mut resolved = ModelValue::object();
                for (key, item) in map {
                    resolved.insert(key.clone(), self.resolve_expressions(item)?);
                }
                resolved
            }
            ModelValue::Property(name, inner) => {
                ModelValue::property(name.clone(), self.resolve_expressions(inner)?)
            }
            other => other.clone(),
        })
    }
}

/// Index of the `}` closing an expression whose body starts at `start`
fn matching_brace(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '$' if chars.get(i + 1) == Some(&'{') => {
                depth += 1;
                i += 1;
            }
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split `names:default` at the first colon outside a nested expression
fn split_default(body: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let bytes = body.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'{' if i > 0 && bytes[i - 1] == b'$' => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            b':' if depth == 0 => return (&body[..i], Some(&body[i + 1..])),
            _ => {}
        }
    }
    (body, None)
}
