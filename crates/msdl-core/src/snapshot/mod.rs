//! Graph snapshots of a scenario
//!
//! A `GraphSnapshot` records identifiers, superiors/owners and every ordered
//! child list of the three hierarchies. Two scenarios with equal snapshots
//! have isomorphic graphs, which is how a serialize/parse round trip after
//! mutation is checked.
//!
//! The primary side is an in-memory designation and is not captured.

pub mod digest;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::model::{CommandRelationshipType, MsdlEntity, Superior};
use crate::ops::Store;

pub use digest::compute_graph_digest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub superior: Option<Superior>,
    pub relationship_type: Option<CommandRelationshipType>,
    pub subordinates: Vec<String>,
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub owner: Option<Superior>,
    pub organic_superior: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceSideEntry {
    pub allegiance: Option<String>,
    pub root_units: Vec<String>,
    pub equipment: Vec<String>,
    pub forces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederateEntry {
    pub units: Vec<String>,
    pub equipment: Vec<String>,
}

/// Canonical, order-preserving view of the scenario graph
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub units: BTreeMap<String, UnitEntry>,
    pub equipment: BTreeMap<String, EquipmentEntry>,
    pub force_sides: BTreeMap<String, ForceSideEntry>,
    pub federates: BTreeMap<String, FederateEntry>,
}

impl GraphSnapshot {
    pub fn capture(store: &Store) -> Self {
        let tree = store.tree();
        let units = store
            .units
            .values()
            .map(|unit| {
                let entry = UnitEntry {
                    superior: unit.superior(tree),
                    relationship_type: match unit.superior(tree) {
                        Some(Superior::Unit(_)) => unit.relationship_type(tree),
                        _ => None,
                    },
                    subordinates: unit.subordinates().to_vec(),
                    equipment: unit.equipment().to_vec(),
                };
                (unit.object_handle().to_string(), entry)
            })
            .collect();
        let equipment = store
            .equipment
            .values()
            .map(|item| {
                let entry = EquipmentEntry {
                    owner: item.owner(tree),
                    organic_superior: item.organic_superior_handle(tree),
                };
                (item.object_handle().to_string(), entry)
            })
            .collect();
        let force_sides = store
            .force_sides
            .values()
            .map(|side| {
                let entry = ForceSideEntry {
                    allegiance: side.parent_side_handle(tree),
                    root_units: side.root_units().to_vec(),
                    equipment: side.equipment().to_vec(),
                    forces: side.forces().to_vec(),
                };
                (side.object_handle().to_string(), entry)
            })
            .collect();
        let federates = store
            .federates
            .values()
            .map(|federate| {
                let entry = FederateEntry {
                    units: federate.units(tree),
                    equipment: federate.equipment(tree),
                };
                (federate.object_handle().to_string(), entry)
            })
            .collect();
        Self {
            units,
            equipment,
            force_sides,
            federates,
        }
    }

    /// SHA-256 hex digest of the canonical JSON form
    ///
    /// # Errors
    ///
    /// Returns `MsdlError::Serialization` if JSON serialization fails.
    pub fn digest(&self) -> Result<String> {
        compute_graph_digest(self)
    }
}
