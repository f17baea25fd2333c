pub mod attributes;
pub mod checker;
pub mod composite;
pub mod context;
pub mod description;
pub mod expression;
pub mod logger;
pub mod matcher;
pub mod operation;
pub mod path;
pub mod registry;
pub mod resource;
pub mod similarity;
pub mod target;
pub mod transformers;

pub use attributes::{
    ChainedResourceTransformer, ChainedResourceTransformerEntry, DiscardAttributesTransformer,
    DiscardUndefinedAttributesTransformer, RejectExpressionValuesTransformer,
};
pub use checker::{contains_expression, RequirementChecker};
pub use composite::{CompositeOperationTransformer, CompositeResultTransformer};
pub use context::{
    AttributeProblem, ResourceTransformationContext, TransformationContext, TransformedTree,
};
pub use description::{
    DiscardAttributeChecker, RejectAttributeChecker, ResourceTransformationDescription,
    ResourceTransformationDescriptionBuilder,
};
pub use expression::{ExpressionSnapshot, TransformerExpressionResolver};
pub use logger::TransformersLogger;
pub use matcher::{AttributeRule, Model, ModelMatcher};
pub use operation::{
    ChainedOperationTransformer, OperationRejectionPolicy, OperationResultTransformer,
    OperationTransformer, OperationTransformerHandler, RejectionPolicy, ResultTransformer,
    TransformedOperation,
};
pub use path::{transform_address, AddressChainError, AddressFold, PathAddressTransformer};
pub use registry::{
    ResolvedPolicy, ResolvedTransformers, TransformerEntry, TransformerRegistry,
    TransformersSubRegistration,
};
pub use resource::{ResourceTransformer, ResourceTransformerHandler};
pub use similarity::SimilarityIndex;
pub use target::{IgnoredResources, TransformationTarget, TransformationTargetType};
pub use transformers::Transformers;
