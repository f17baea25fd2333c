//! Skewbridge Core - management model version transformation
//!
//! This crate adapts operations and resource trees written against the
//! current management model so that an older process can understand them,
//! including:
//! - A typed value tree, addresses, versions and schema registrations
//! - A versioned transformer registry with path rewriting
//! - Attribute discard/reject/convert policies and a declarative builder
//! - Composite operation fan-out with first-failure result mapping
//! - Schema diffing between two registration trees
//!
//! Compatibility problems are ordinary `Result` values; broken output-tree
//! invariants panic.

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod transform;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, TransformError};
pub use model::{
    ModelType, ModelValue, ModelVersion, ModelVersionRange, PathAddress, PathElement, Resource,
    ResourceRegistration,
};
pub use transform::{
    TransformationContext, TransformationTarget, TransformationTargetType, TransformedOperation,
    TransformerRegistry, Transformers,
};
