use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TransformError;

/// Schema generation of the core model or of a subsystem
///
/// Ordering is lexicographic on `(major, minor, micro)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl ModelVersion {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// `major.0.0`
    pub const fn create(major: u32) -> Self {
        Self::new(major, 0, 0)
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for ModelVersion {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransformError::InvalidVersion {
            version: s.to_string(),
        };
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

/// Explicit set of versions a registration applies to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelVersionRange {
    versions: Vec<ModelVersion>,
}

impl ModelVersionRange {
    pub fn new(versions: impl IntoIterator<Item = ModelVersion>) -> Self {
        let mut versions: Vec<ModelVersion> = versions.into_iter().collect();
        versions.sort();
        versions.dedup();
        Self { versions }
    }

    pub fn single(version: ModelVersion) -> Self {
        Self {
            versions: vec![version],
        }
    }

    pub fn contains(&self, version: &ModelVersion) -> bool {
        self.versions.binary_search(version).is_ok()
    }

    pub fn versions(&self) -> &[ModelVersion] {
        &self.versions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelVersion> {
        self.versions.iter()
    }
}

impl From<ModelVersion> for ModelVersionRange {
    fn from(version: ModelVersion) -> Self {
        Self::single(version)
    }
}
