//! Lifecycle logging macros
//!
//! Every adapter operation emits one `start` event and then exactly one of
//! `end` or `end_error`. All three carry `component`, `op` and `event`;
//! extra fields go after the required ones.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr, $($rest:tt)*) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($rest)*
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use logbridge_core::log_op_start;
/// log_op_start!("log_adapter.enable");
/// log_op_start!("log_adapter.disable", registration_id = "r1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(info, $op, $crate::schema::EVENT_START, $($($field)+)?)
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use logbridge_core::log_op_end;
/// log_op_end!("log_adapter.try_enable", duration_ms = 3, enabled = false);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Log the failed end of an operation
///
/// `$err` is converted into `ExError` and tagged with `$op`, so the event
/// carries a stable `err.code`, the registration id when the error has one,
/// and the rendered error as its message.
///
/// ```
/// # use logbridge_core::{log_op_error, errors::AdapterError};
/// let err = AdapterError::Registration { message: "offline".to_string() };
/// log_op_error!("log_adapter.enable", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err = $crate::errors::ExError::from($err).with_op($op);
        $crate::__log_op_event!(
            error,
            $op,
            $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            registration_id = ex_err.registration_id().map(|id| id.as_str()),
            $($($field)+ ,)?
            "{}",
            ex_err
        )
    }};
}
