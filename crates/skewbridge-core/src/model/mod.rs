pub mod address;
pub mod operation;
pub mod registration;
pub mod resource;
pub mod value;
pub mod version;

pub use address::{PathAddress, PathElement, WILDCARD_VALUE};
pub use registration::{AttributeDefinition, AttributeStorage, ResourceRegistration};
pub use resource::Resource;
pub use value::{ModelType, ModelValue};
pub use version::{ModelVersion, ModelVersionRange};
