//! Structured logging facility for skewbridge
//!
//! This module provides the canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Transformation warnings are not logged one by one; they are batched per
//! target host by [`crate::transform::TransformersLogger`] and flushed as a
//! single event at the end of each pass.
//!
//! # Usage
//!
//! ```rust
//! use skewbridge_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
