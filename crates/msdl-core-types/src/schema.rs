//! Field keys and event names shared by every scenario log line
//!
//! An operation logs [`EVENT_START`] once and then exactly one terminal event,
//! [`EVENT_END`] or [`EVENT_END_ERROR`].

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Operation name, e.g. `load` or `set_item_relation`
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

pub const FIELD_OBJECT_HANDLE: &str = "object_handle";
pub const FIELD_SOURCE_HANDLE: &str = "source_handle";
pub const FIELD_TARGET_HANDLE: &str = "target_handle";
/// `make-child`, `reorder-above` or `reorder-below`
pub const FIELD_INSTRUCTION: &str = "instruction";
/// Tag of a command passed to `apply`
pub const FIELD_COMMAND: &str = "command";

/// Size of the document handed to `load`
pub const FIELD_BYTES: &str = "bytes";
pub const FIELD_UNIT_COUNT: &str = "unit_count";
pub const FIELD_EQUIPMENT_COUNT: &str = "equipment_count";
pub const FIELD_FORCE_SIDE_COUNT: &str = "force_side_count";

pub const FIELD_ERR_KIND: &str = "err_kind";
/// Stable `ERR_*` code of the failure
pub const FIELD_ERR_CODE: &str = "err.code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Whether `event` closes an operation
pub fn is_terminal(event: &str) -> bool {
    event == EVENT_END || event == EVENT_END_ERROR
}
