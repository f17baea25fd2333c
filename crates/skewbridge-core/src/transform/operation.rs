//! Operation transformation units
//!
//! An [`OperationTransformer`] rewrites one operation into a
//! [`TransformedOperation`]: the rewritten operation (or none, when it is
//! discarded) plus a rejection policy and a result transformer that are
//! applied later, once the real execution result from the target is known.

use std::fmt;
use std::sync::{Arc, Mutex};

use super::context::TransformationContext;
use crate::errors::Result;
use crate::model::operation::{result_object, FAILED, FAILURE_DESCRIPTION, OUTCOME};
use crate::model::{ModelValue, PathAddress};

pub trait OperationTransformerHandler: Send + Sync {
    /// Transform `operation` addressed at `address`
    ///
    /// Implementations must clone before modifying; the input is shared
    /// with the caller.
    ///
    /// # Errors
    ///
    /// Returns an error when the operation cannot be represented at all.
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation>;
}

/// Decides whether the target's result for a transformed operation means
/// the operation must be reported as rejected
pub trait OperationRejectionPolicy: Send + Sync {
    fn reject_operation(&self, pre_published_result: &ModelValue) -> bool;
    fn failure_description(&self) -> String;
}

/// Maps the target's raw result back into the shape the client expects
pub trait OperationResultTransformer: Send + Sync {
    fn transform_result(&self, result: ModelValue) -> ModelValue;
}

#[derive(Clone, Default)]
pub enum OperationTransformer {
    #[default]
    PassThrough,
    Discard,
    Custom(Arc<dyn OperationTransformerHandler>),
}

impl OperationTransformer {
    pub fn custom(handler: impl OperationTransformerHandler + 'static) -> Self {
        OperationTransformer::Custom(Arc::new(handler))
    }

    /// # Errors
    ///
    /// Propagates errors raised by a custom handler.
    pub fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        match self {
            OperationTransformer::PassThrough => Ok(TransformedOperation::new(operation.clone())),
            OperationTransformer::Discard => Ok(TransformedOperation::discarded()),
            OperationTransformer::Custom(handler) => {
                handler.transform_operation(context, address, operation)
            }
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, OperationTransformer::Discard)
    }
}

impl fmt::Debug for OperationTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationTransformer::PassThrough => f.write_str("PassThrough"),
            OperationTransformer::Discard => f.write_str("Discard"),
            OperationTransformer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum RejectionPolicy {
    #[default]
    Never,
    Reject {
        description: String,
    },
    Custom(Arc<dyn OperationRejectionPolicy>),
}

impl RejectionPolicy {
    pub fn reject(description: impl Into<String>) -> Self {
        RejectionPolicy::Reject {
            description: description.into(),
        }
    }

    pub fn reject_operation(&self, pre_published_result: &ModelValue) -> bool {
        match self {
            RejectionPolicy::Never => false,
            RejectionPolicy::Reject { .. } => true,
            RejectionPolicy::Custom(policy) => policy.reject_operation(pre_published_result),
        }
    }

    pub fn failure_description(&self) -> String {
        match self {
            RejectionPolicy::Never => String::new(),
            RejectionPolicy::Reject { description } => description.clone(),
            RejectionPolicy::Custom(policy) => policy.failure_description(),
        }
    }
}

impl fmt::Debug for RejectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionPolicy::Never => f.write_str("Never"),
            RejectionPolicy::Reject { description } => {
                f.debug_struct("Reject").field("description", description).finish()
            }
            RejectionPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum ResultTransformer {
    #[default]
    Original,
    Custom(Arc<dyn OperationResultTransformer>),
}

impl ResultTransformer {
    pub fn transform_result(&self, result: ModelValue) -> ModelValue {
        match self {
            ResultTransformer::Original => result,
            ResultTransformer::Custom(transformer) => transformer.transform_result(result),
        }
    }
}

impl fmt::Debug for ResultTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultTransformer::Original => f.write_str("Original"),
            ResultTransformer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Outcome of transforming one operation
///
/// A discarded operation always carries the `Never` policy: a step that is
/// not sent to the target succeeds trivially.
#[derive(Debug, Clone)]
pub struct TransformedOperation {
    operation: Option<ModelValue>,
    rejection: RejectionPolicy,
    result: ResultTransformer,
}

impl TransformedOperation {
    /// Forward `operation` unchanged in outcome
    pub fn new(operation: ModelValue) -> Self {
        Self::with_policies(operation, RejectionPolicy::Never, ResultTransformer::Original)
    }

    pub fn discarded() -> Self {
        Self {
            operation: None,
            rejection: RejectionPolicy::Never,
            result: ResultTransformer::Original,
        }
    }

    /// Forward `operation` but report it as rejected
    pub fn rejected(operation: ModelValue, description: impl Into<String>) -> Self {
        Self::with_policies(
            operation,
            RejectionPolicy::reject(description),
            ResultTransformer::Original,
        )
    }

    pub fn with_policies(
        operation: ModelValue,
        rejection: RejectionPolicy,
        result: ResultTransformer,
    ) -> Self {
        Self {
            operation: Some(operation),
            rejection,
            result,
        }
    }

    /// Rewritten operation; `None` when discarded
    pub fn operation(&self) -> Option<&ModelValue> {
        self.operation.as_ref()
    }

    pub fn operation_mut(&mut self) -> Option<&mut ModelValue> {
        self.operation.as_mut()
    }

    pub fn into_operation(self) -> Option<ModelValue> {
        self.operation
    }

    pub fn is_discarded(&self) -> bool {
        self.operation.is_none()
    }

    pub fn rejection_policy(&self) -> &RejectionPolicy {
        &self.rejection
    }

    pub fn result_transformer(&self) -> &ResultTransformer {
        &self.result
    }

    pub fn reject_operation(&self, pre_published_result: &ModelValue) -> bool {
        self.rejection.reject_operation(pre_published_result)
    }

    pub fn failure_description(&self) -> String {
        self.rejection.failure_description()
    }

    pub fn transform_result(&self, result: ModelValue) -> ModelValue {
        self.result.transform_result(result)
    }

    /// Apply the rejection policy and then the result transformer
    ///
    /// A rejected operation has its outcome overwritten with `failed` and
    /// the policy's failure description before the transformer runs.
    pub fn process_result(&self, result: ModelValue) -> ModelValue {
        let mut result = result_object(result);
        if self.reject_operation(&result) {
            result.insert(OUTCOME, FAILED);
            result.insert(FAILURE_DESCRIPTION, self.failure_description());
        }
        self.transform_result(result)
    }
}

/// Applies a list of transformers, each to the previous output
///
/// Stops as soon as a link discards. The combined rejection policy reports
/// the first rejecting link; result transformers run in reverse link order.
#[derive(Debug, Clone, Default)]
pub struct ChainedOperationTransformer {
    links: Vec<OperationTransformer>,
}

impl ChainedOperationTransformer {
    pub fn new(links: Vec<OperationTransformer>) -> Self {
        Self { links }
    }

    pub fn then(mut self, link: OperationTransformer) -> Self {
        self.links.push(link);
        self
    }
}

struct ChainedPolicies {
    rejections: Vec<RejectionPolicy>,
    results: Vec<ResultTransformer>,
    rejected_by: Mutex<Option<usize>>,
}

impl ChainedPolicies {
    fn new(rejections: Vec<RejectionPolicy>, results: Vec<ResultTransformer>) -> Self {
        Self {
            rejections,
            results,
            rejected_by: Mutex::new(None),
        }
    }
}

impl OperationRejectionPolicy for ChainedPolicies {
    fn reject_operation(&self, pre_published_result: &ModelValue) -> bool {
        let first = self
            .rejections
            .iter()
            .position(|p| p.reject_operation(pre_published_result));
        self.rejected_by.lock().map(|mut r| *r = first).ok();
        first.is_some()
    }

    fn failure_description(&self) -> String {
        let index = self.rejected_by.lock().map(|r| *r).unwrap_or(None);
        index
            .and_then(|i| self.rejections.get(i))
            .map(RejectionPolicy::failure_description)
            .unwrap_or_default()
    }
}

impl OperationResultTransformer for ChainedPolicies {
    fn transform_result(&self, result: ModelValue) -> ModelValue {
        self.results
            .iter()
            .rev()
            .fold(result, |acc, t| t.transform_result(acc))
    }
}

impl OperationTransformerHandler for ChainedOperationTransformer {
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let mut current = operation.clone();
        let mut rejections = Vec::new();
        let mut results = Vec::new();

        for link in &self.links {
            let transformed = link.transform_operation(context, address, &current)?;
            let TransformedOperation {
                operation,
                rejection,
                result,
            } = transformed;
            match operation {
                Some(op) => current = op,
                None => return Ok(TransformedOperation::discarded()),
            }
            if !matches!(rejection, RejectionPolicy::Never) {
                rejections.push(rejection);
            }
            if !matches!(result, ResultTransformer::Original) {
                results.push(result);
            }
        }

        if rejections.is_empty() && results.is_empty() {
            return Ok(TransformedOperation::new(current));
        }
        let policies = Arc::new(ChainedPolicies::new(rejections, results));
        Ok(TransformedOperation::with_policies(
            current,
            RejectionPolicy::Custom(policies.clone()),
            ResultTransformer::Custom(policies),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::operation::{failed_result, has_outcome, success_result, SUCCESS};

    #[test]
    fn test_discarded_never_rejects() {
        let discarded = TransformedOperation::discarded();

        assert!(discarded.is_discarded());
        assert!(!discarded.reject_operation(&failed_result("boom")));
        assert_eq!(discarded.failure_description(), "");
    }

    #[test]
    fn test_process_result_overwrites_outcome_on_reject() {
        let transformed = TransformedOperation::rejected(ModelValue::object(), "not supported");
        let processed = transformed.process_result(success_result(ModelValue::Undefined));

        assert!(has_outcome(&processed, FAILED));
        assert_eq!(
            processed.get(FAILURE_DESCRIPTION).and_then(ModelValue::as_str),
            Some("not supported")
        );
    }

    #[test]
    fn test_original_result_passes_through() {
        let transformed = TransformedOperation::new(ModelValue::object());
        let processed = transformed.process_result(success_result(ModelValue::from(7)));

        assert!(has_outcome(&processed, SUCCESS));
        assert_eq!(processed.get("result"), Some(&ModelValue::Int(7)));
    }

    #[test]
    fn test_rejected_scalar_result_is_wrapped() {
        let transformed = TransformedOperation::rejected(ModelValue::object(), "not supported");
        let processed = transformed.process_result(ModelValue::from("garbage"));

        assert!(has_outcome(&processed, FAILED));
        assert_eq!(processed.get("result"), Some(&ModelValue::from("garbage")));
    }

    struct Suffix(&'static str);

    impl OperationResultTransformer for Suffix {
        fn transform_result(&self, result: ModelValue) -> ModelValue {
            let current = result.as_str().unwrap_or_default().to_string();
            ModelValue::from(format!("{}{}", current, self.0))
        }
    }

    #[test]
    fn test_chained_results_apply_in_reverse() {
        let policies = ChainedPolicies::new(
            vec![
                RejectionPolicy::Never,
                RejectionPolicy::reject("second"),
                RejectionPolicy::reject("third"),
            ],
            vec![
                ResultTransformer::Custom(Arc::new(Suffix("-a"))),
                ResultTransformer::Custom(Arc::new(Suffix("-b"))),
            ],
        );

        assert!(policies.reject_operation(&ModelValue::Undefined));
        assert_eq!(policies.failure_description(), "second");
        assert_eq!(
            policies.transform_result(ModelValue::from("r")),
            ModelValue::from("r-b-a")
        );
    }
}
