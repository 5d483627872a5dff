//! Command types for every structural scenario mutation
//!
//! Commands are processed by [`crate::apply::apply`], the all-or-nothing
//! entry point for scenario mutations. They are plain data (serde) so a
//! host can queue, log or replay them.

use serde::{Deserialize, Serialize};

use crate::model::{CommandRelationshipType, Superior};
use crate::ops::RelationRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Reparent or reorder a Unit or EquipmentItem
    SetItemRelation(RelationRequest),

    /// Make a Unit subordinate to a Unit or root of a ForceSide
    SetUnitForceRelation {
        unit: String,
        superior: String,
        relationship_type: Option<CommandRelationshipType>,
    },

    /// Create a Unit, under `superior` or as a root of the primary side
    AddUnit {
        object_handle: Option<String>,
        name: String,
        symbol_identifier: String,
        superior: Option<Superior>,
    },

    /// Create an EquipmentItem owned by `owner` or by the primary side
    AddEquipmentItem {
        object_handle: Option<String>,
        name: String,
        symbol_identifier: String,
        owner: Option<String>,
    },

    /// Create a side, or a force when `allegiance` names a side
    AddForceSide {
        object_handle: Option<String>,
        name: String,
        allegiance: Option<String>,
    },

    AddFederate {
        object_handle: Option<String>,
        name: String,
    },

    RemoveUnit { handle: String },

    RemoveEquipmentItem { handle: String },

    RemoveForceSide { handle: String },

    RemoveFederate { handle: String },

    AssignToFederate { federate: String, entity: String },

    SetPrimarySide { handle: String },
}

impl Command {
    /// Operation name used in logs
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::SetItemRelation(_) => "set_item_relation",
            Command::SetUnitForceRelation { .. } => "set_unit_force_relation",
            Command::AddUnit { .. } => "add_unit",
            Command::AddEquipmentItem { .. } => "add_equipment_item",
            Command::AddForceSide { .. } => "add_force_side",
            Command::AddFederate { .. } => "add_federate",
            Command::RemoveUnit { .. } => "remove_unit",
            Command::RemoveEquipmentItem { .. } => "remove_equipment_item",
            Command::RemoveForceSide { .. } => "remove_force_side",
            Command::RemoveFederate { .. } => "remove_federate",
            Command::AssignToFederate { .. } => "assign_to_federate",
            Command::SetPrimarySide { .. } => "set_primary_side",
        }
    }

    /// Whether the command changes a hierarchy edge
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Command::AddFederate { .. }
                | Command::RemoveFederate { .. }
                | Command::AssignToFederate { .. }
                | Command::SetPrimarySide { .. }
        )
    }
}
