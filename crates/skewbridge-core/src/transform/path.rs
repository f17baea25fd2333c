//! Address rewriting
//!
//! Every level of a registered transformer path carries one
//! [`PathAddressTransformer`]. Rewriting an address is a fold of that chain
//! over the address elements: each step consumes exactly one original
//! element and contributes zero or more elements to the rewritten prefix.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::model::{PathAddress, PathElement};

pub type ElementRewrite = Arc<dyn Fn(&PathElement) -> Vec<PathElement> + Send + Sync>;

#[derive(Clone, Default)]
pub enum PathAddressTransformer {
    #[default]
    PassThrough,
    /// Substitute a fixed element
    Replace(PathElement),
    /// Rename the key, keep the value
    RenameKey(String),
    Custom(ElementRewrite),
}

impl PathAddressTransformer {
    pub fn custom<F>(rewrite: F) -> Self
    where
        F: Fn(&PathElement) -> Vec<PathElement> + Send + Sync + 'static,
    {
        PathAddressTransformer::Custom(Arc::new(rewrite))
    }

    pub fn transform_element(&self, element: &PathElement) -> Vec<PathElement> {
        match self {
            PathAddressTransformer::PassThrough => vec![element.clone()],
            PathAddressTransformer::Replace(replacement) => vec![replacement.clone()],
            PathAddressTransformer::RenameKey(key) => {
                vec![PathElement::new(key.clone(), element.value.clone())]
            }
            PathAddressTransformer::Custom(rewrite) => rewrite(element),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, PathAddressTransformer::PassThrough)
    }
}

impl fmt::Debug for PathAddressTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathAddressTransformer::PassThrough => f.write_str("PassThrough"),
            PathAddressTransformer::Replace(e) => write!(f, "Replace({})", e),
            PathAddressTransformer::RenameKey(k) => write!(f, "RenameKey({})", k),
            PathAddressTransformer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A transformer chain whose length does not match the address depth
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressChainError {
    #[error("address {address} has no element left for transformer {position}")]
    ElementsExhausted { address: String, position: usize },

    #[error("transformer chain exhausted for {address} with {remaining} left unconsumed")]
    TransformersExhausted { address: String, remaining: String },
}

/// Intermediate state of an address rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFold {
    original: PathAddress,
    current: PathAddress,
    consumed: usize,
}

impl AddressFold {
    pub fn new(original: &PathAddress) -> Self {
        Self {
            original: original.clone(),
            current: PathAddress::empty(),
            consumed: 0,
        }
    }

    pub fn original(&self) -> &PathAddress {
        &self.original
    }

    /// Already rewritten prefix
    pub fn current(&self) -> &PathAddress {
        &self.current
    }

    /// Original elements not yet consumed
    pub fn remaining(&self) -> PathAddress {
        self.original.sub_address(self.consumed)
    }

    /// Consume the next original element through `transformer`
    ///
    /// # Errors
    ///
    /// Returns `ElementsExhausted` when every element is already consumed.
    pub fn step(self, transformer: &PathAddressTransformer) -> Result<Self, AddressChainError> {
        let element = self.original.element(self.consumed).ok_or_else(|| {
            AddressChainError::ElementsExhausted {
                address: self.original.to_string(),
                position: self.consumed,
            }
        })?;
        let rewritten = transformer.transform_element(element);
        Ok(Self {
            current: self
                .current
                .append_address(&PathAddress::from_elements(rewritten)),
            consumed: self.consumed + 1,
            original: self.original,
        })
    }

    /// Rewritten address, once every element is consumed
    ///
    /// # Errors
    ///
    /// Returns `TransformersExhausted` when original elements remain.
    pub fn finish(self) -> Result<PathAddress, AddressChainError> {
        if self.consumed < self.original.len() {
            return Err(AddressChainError::TransformersExhausted {
                address: self.original.to_string(),
                remaining: self.remaining().to_string(),
            });
        }
        Ok(self.current)
    }
}

/// Rewrite `address` through a chain with one transformer per element
///
/// # Errors
///
/// Fails when the chain length differs from the address depth.
pub fn transform_address(
    chain: &[PathAddressTransformer],
    address: &PathAddress,
) -> Result<PathAddress, AddressChainError> {
    chain
        .iter()
        .try_fold(AddressFold::new(address), |fold, transformer| fold.step(transformer))?
        .finish()
}
