//! Core types shared across skewbridge crates
//!
//! This crate provides the canonical field keys and event names used by the
//! structured logging facility and by the transformation warning batches.

pub mod schema;
