//! Structured logs for scenario operations
//!
//! Hosts call [`init`] once with a [`Profile`]. Each `Scenario` operation then
//! emits a `start` event through [`log_op_start!`](crate::log_op_start) and
//! closes with [`log_op_end!`](crate::log_op_end) or
//! [`log_op_error!`](crate::log_op_error). Tests read those events back
//! through [`init_test_capture`].
//!
//! ```rust
//! use msdl_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
