//! Composite operation fan-out and result re-aggregation

use std::sync::{Arc, Mutex};

use super::context::TransformationContext;
use super::operation::{
    OperationRejectionPolicy, OperationResultTransformer, OperationTransformerHandler,
    RejectionPolicy, ResultTransformer, TransformedOperation,
};
use super::transformers::transform_step;
use crate::errors::{Result, TransformError};
use crate::model::operation::{
    has_outcome, result_object, step_key, success_result, FAILED, FAILURE_DESCRIPTION, IGNORED,
    OUTCOME, RESULT, STEPS,
};
use crate::model::{ModelValue, PathAddress};

/// Transforms each step of a `composite` operation independently
///
/// Discarded steps are left out of the rewritten step list. The returned
/// operation carries a [`CompositeResultTransformer`] as both its rejection
/// policy and its result transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeOperationTransformer;

impl OperationTransformerHandler for CompositeOperationTransformer {
    fn transform_operation(
        &self,
        context: &TransformationContext<'_>,
        _address: &PathAddress,
        operation: &ModelValue,
    ) -> Result<TransformedOperation> {
        let steps = operation
            .get(STEPS)
            .and_then(ModelValue::as_list)
            .ok_or_else(|| TransformError::MissingOperationField {
                field: STEPS.to_string(),
            })?;

        let mut rewritten = Vec::with_capacity(steps.len());
        let mut tracked = Vec::with_capacity(steps.len());
        for step in steps {
            let transformed = transform_step(context, step)?;
            let resulting_index = transformed.operation().map(|op| {
                rewritten.push(op.clone());
                rewritten.len() - 1
            });
            tracked.push(CompositeStep {
                resulting_index,
                transformed,
            });
        }
        tracing::debug!(
            steps = tracked.len(),
            forwarded = rewritten.len(),
            "transformed composite operation"
        );

        let mut composite = operation.clone();
        composite.insert(STEPS, ModelValue::List(rewritten));
        let policies = Arc::new(CompositeResultTransformer::new(tracked));
        Ok(TransformedOperation::with_policies(
            composite,
            RejectionPolicy::Custom(policies.clone()),
            ResultTransformer::Custom(policies),
        ))
    }
}

#[derive(Debug)]
struct CompositeStep {
    /// Position in the rewritten composite; `None` when discarded
    resulting_index: Option<usize>,
    transformed: TransformedOperation,
}

/// Rejection and result mapping for a transformed composite
///
/// Rejection is first-failure: the first forwarded step, in original
/// order, whose own policy rejects its result decides the outcome. Steps
/// the target reported as ignored are skipped. Result mapping restores the
/// original step numbering.
#[derive(Debug)]
pub struct CompositeResultTransformer {
    steps: Vec<CompositeStep>,
    failed: Mutex<Option<(usize, String)>>,
}

impl CompositeResultTransformer {
    fn new(steps: Vec<CompositeStep>) -> Self {
        Self {
            steps,
            failed: Mutex::new(None),
        }
    }

    /// Number of steps in the original composite
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Rewritten position of original step `index`, both zero based
    pub fn resulting_index(&self, index: usize) -> Option<usize> {
        self.steps.get(index).and_then(|s| s.resulting_index)
    }

    /// Original index of the step that rejected the composite, if any
    pub fn failed_step(&self) -> Option<usize> {
        self.failed
            .lock()
            .ok()
            .and_then(|f| f.as_ref().map(|(i, _)| *i))
    }

    fn failure(&self) -> Option<(usize, String)> {
        self.failed.lock().ok().and_then(|f| f.clone())
    }
}

fn step_result(composite_result: &ModelValue, resulting_index: usize) -> ModelValue {
    composite_result
        .get(RESULT)
        .and_then(|r| r.get(&step_key(resulting_index)))
        .cloned()
        .unwrap_or_default()
}

impl OperationRejectionPolicy for CompositeResultTransformer {
    fn reject_operation(&self, pre_published_result: &ModelValue) -> bool {
        let first = self.steps.iter().enumerate().find_map(|(index, step)| {
            let resulting = step.resulting_index?;
            let result = step_result(pre_published_result, resulting);
            if has_outcome(&result, IGNORED) || !step.transformed.reject_operation(&result) {
                return None;
            }
            Some((index, step.transformed.failure_description()))
        });
        let rejected = first.is_some();
        if let Ok(mut failed) = self.failed.lock() {
            *failed = first;
        }
        rejected
    }

    fn failure_description(&self) -> String {
        self.failure()
            .map(|(_, description)| description)
            .unwrap_or_default()
    }
}

impl OperationResultTransformer for CompositeResultTransformer {
    fn transform_result(&self, result: ModelValue) -> ModelValue {
        let failure = self.failure();
        let mut steps = ModelValue::object();
        for (index, step) in self.steps.iter().enumerate() {
            let mapped = match step.resulting_index {
                None => success_result(ModelValue::Undefined),
                Some(resulting) => {
                    let mut raw = result_object(step_result(&result, resulting));
                    if has_outcome(&raw, IGNORED) {
                        success_result(ModelValue::Undefined)
                    } else {
                        if let Some((_, description)) =
                            failure.as_ref().filter(|(failed, _)| *failed == index)
                        {
                            raw.insert(OUTCOME, FAILED);
                            raw.insert(FAILURE_DESCRIPTION, description.clone());
                        }
                        step.transformed.transform_result(raw)
                    }
                }
            };
            steps.insert(step_key(index), mapped);
        }

        let mut result = result_object(result);
        result.insert(RESULT, steps);
        if let Some((index, description)) = failure {
            result.insert(OUTCOME, FAILED);
            result.insert(
                FAILURE_DESCRIPTION,
                format!("Operation {} failed: {}", step_key(index), description),
            );
        }
        result
    }
}
