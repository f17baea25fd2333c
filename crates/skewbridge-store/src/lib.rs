//! Skewbridge Store - Persisted legacy model definitions
//!
//! Provides:
//! - JSON codec between on-disk `.dmr` files and description value trees
//! - A caching loader for legacy subsystem and core model registrations
//! - Helper constructors for the store's `ExError`s

#![allow(clippy::result_large_err)]

pub mod codec;
pub mod errors;
pub mod loader;

// Re-export key types
pub use errors::Result;
pub use loader::{read_registration, LegacyDefinition, LegacyDefinitionLoader};
