//! Core types shared across MSDL facilities
//!
//! This crate provides the canonical field keys and event names used by the
//! structured logging and error reporting of `msdl-core`.

pub mod schema;
