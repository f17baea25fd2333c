//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Transformation identifiers
pub const FIELD_HOST: &str = "host";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_OPERATION: &str = "operation";
pub const FIELD_MODEL_VERSION: &str = "model_version";
pub const FIELD_SUBSYSTEM: &str = "subsystem";

// Collection sizes
pub const FIELD_STEP_COUNT: &str = "step_count";
pub const FIELD_PROBLEM_COUNT: &str = "problem_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_TRANSFORM_WARNINGS: &str = "transform_warnings";
