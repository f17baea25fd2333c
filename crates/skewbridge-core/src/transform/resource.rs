use std::fmt;
use std::sync::Arc;

use super::context::ResourceTransformationContext;
use crate::errors::Result;
use crate::model::{PathAddress, Resource};

/// Custom resource transformation
///
/// Handlers write into the output tree through the context
/// (`add_transformed_resource` and friends) instead of returning a value,
/// since one input resource may become zero, one or many output nodes.
pub trait ResourceTransformerHandler: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the resource cannot be represented on the
    /// target and silently dropping it is not acceptable.
    fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()>;
}

#[derive(Clone, Default)]
pub enum ResourceTransformer {
    /// Copy the model and descend into the children
    #[default]
    PassThrough,
    /// Drop the resource and its whole subtree
    Discard,
    Custom(Arc<dyn ResourceTransformerHandler>),
}

impl ResourceTransformer {
    pub fn custom(handler: impl ResourceTransformerHandler + 'static) -> Self {
        ResourceTransformer::Custom(Arc::new(handler))
    }

    /// # Errors
    ///
    /// Propagates errors from custom handlers anywhere in the subtree.
    pub fn transform_resource(
        &self,
        context: &mut ResourceTransformationContext<'_, '_>,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<()> {
        match self {
            ResourceTransformer::PassThrough => {
                // Proxies and runtime resources are not part of the target's model.
                if resource.is_proxy() || resource.is_runtime() {
                    return Ok(());
                }
                let mut child = context.add_transformed_resource(&PathAddress::empty(), resource);
                child.process_children(resource)
            }
            ResourceTransformer::Discard => Ok(()),
            ResourceTransformer::Custom(handler) => {
                handler.transform_resource(context, address, resource)
            }
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, ResourceTransformer::Discard)
    }
}

impl fmt::Debug for ResourceTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceTransformer::PassThrough => f.write_str("PassThrough"),
            ResourceTransformer::Discard => f.write_str("Discard"),
            ResourceTransformer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
