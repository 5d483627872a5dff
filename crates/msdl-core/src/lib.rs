//! MSDL Core - in-memory object model for MSDL scenario documents
//!
//! This crate loads Military Scenario Definition Language documents into a
//! navigable object graph and writes them back out, including:
//! - An arena-backed XML tree that reproduces unmodified input byte for byte
//! - Typed entities (Unit, EquipmentItem, ForceSide, Federate) over it
//! - The unit command tree, the side/force tree and equipment ownership,
//!   with reparenting and sibling reordering that keep tree and graph in step
//! - A coordinate codec for the MGRS, GDC, GCC and UTM location encodings
//! - Graph invariant checks, snapshots and digests
//! - An all-or-nothing command boundary (`apply`)

pub mod apply;
pub mod commands;
pub mod config;
pub mod coords;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod scenario;
pub mod snapshot;
pub mod xml;

pub use msdl_core_types;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use config::{ScenarioConfig, SubordinateRemoval};
pub use coords::{CoordinateChoice, Position};
pub use errors::{ExError, ExErrorKind, MsdlError, Result};
pub use model::{
    CommandRelationshipType, EntityKind, EntityRef, EquipmentItem, Federate, ForceSide,
    MsdlEntity, ScenarioIdModel, StandardIdentity, Superior, Symbolized, Unit,
};
pub use ops::{RelationInstruction, RelationRequest, Store};
pub use scenario::Scenario;
pub use snapshot::GraphSnapshot;
