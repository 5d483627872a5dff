//! Canonical logging macros
//!
//! Every scenario operation is bracketed by one `start` event and exactly one
//! `end` or `end_error` event. The end macros take either an explicit
//! `duration_ms` or the `Instant` the operation `started` at.

/// Milliseconds elapsed since `start`, as logged in `duration_ms`
#[doc(hidden)]
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use msdl_core::log_op_start;
/// log_op_start!("set_item_relation");
/// log_op_start!("remove_unit", object_handle = "u1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::msdl_core_types::schema::EVENT_START,
            $($($field)*)?
        );
    }};
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use msdl_core::log_op_end;
/// let start = std::time::Instant::now();
/// log_op_end!("load", started = start, unit_count = 6);
/// log_op_end!("set_item_relation", duration_ms = 3);
///
/// let outcome: Result<(), ()> = Ok(());
/// match outcome {
///     Ok(()) => log_op_end!("remove_unit", started = start),
///     Err(()) => {}
/// }
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, started = $start:expr $(, $($field:tt)*)?) => {
        $crate::log_op_end!(
            $op,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start)
            $(, $($field)*)?
        )
    };
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::msdl_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    }};
}

/// Log an operation error with its stable `err.code`
///
/// The error is converted into an [`ExError`](crate::errors::ExError) so the
/// event carries the same kind and code as the error facility reports.
///
/// # Example
///
/// ```
/// # use msdl_core::{log_op_error, errors::MsdlError};
/// let err = MsdlError::UnitNotFound { handle: "u1".to_string() };
/// log_op_error!("remove_unit", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, started = $start:expr $(, $($field:tt)*)?) => {
        $crate::log_op_error!(
            $op,
            $err,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start)
            $(, $($field)*)?
        )
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::msdl_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            message = ex_err.message(),
            $($($field)*)?
        );
    }};
}
