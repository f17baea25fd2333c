//! Operation boundary macros
//!
//! Every engine entry point logs one `start` event and then exactly one of
//! `end` or `end_error`, all at the caller's module path. Extra
//! `key = value` fields (usually `host`) are passed through to `tracing`.

/// Log entry into an engine operation
///
/// ```
/// # use skewbridge_core::log_op_start;
/// log_op_start!("load_definition");
/// log_op_start!("transform_operation", host = "slave-a");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = skewbridge_core_types::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful completion of an engine operation
///
/// `duration_ms` is required and comes first.
///
/// ```
/// # use skewbridge_core::log_op_end;
/// log_op_end!("transform_resource", duration_ms = 3u64, host = "slave-a");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = skewbridge_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log the failure of an engine operation
///
/// `$err` is anything convertible into [`crate::errors::ExError`]; its
/// kind, stable code and rendered text are attached to the event.
///
/// ```
/// # use skewbridge_core::{errors::TransformError, log_op_error};
/// let err = TransformError::RejectedResource { address: "/subsystem=ee".to_string() };
/// log_op_error!("transform_resource", err, duration_ms = 1u64, host = "slave-a");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = skewbridge_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err,
            $($($field)*)?
        );
    }};
}
