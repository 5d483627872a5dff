//! All-or-nothing command application
//!
//! [`apply`] is the canonical entry point for queued or replayed scenario
//! mutations.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either the command succeeds and the scenario holds
//!   the new valid state, or it fails and the scenario is restored to the
//!   state it had before the call
//! - **No panics**: invalid input returns typed errors
//! - **Validated**: commands that change a hierarchy edge re-run
//!   [`validate_graph`](crate::rules::validate_graph) before returning
//!
//! ## Example
//!
//! ```
//! use msdl_core::{apply, Command, Scenario, ScenarioIdModel};
//!
//! let mut scenario = Scenario::create(ScenarioIdModel {
//!     name: "Exercise".to_string(),
//!     ..ScenarioIdModel::default()
//! })
//! .unwrap();
//! apply(&mut scenario, Command::AddForceSide {
//!     object_handle: Some("blue".to_string()),
//!     name: "Blue".to_string(),
//!     allegiance: None,
//! })
//! .unwrap();
//! assert_eq!(scenario.sides().len(), 1);
//! ```

use std::time::Instant;

use crate::commands::Command;
use crate::errors::Result;
use crate::model::{EquipmentItem, Federate, ForceSide, Unit};
use crate::ops::{equipment_ops, federate_ops, force_side_ops, relation_ops, unit_ops};
use crate::rules::validation;
use crate::scenario::Scenario;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a command to a scenario
///
/// # Errors
///
/// Returns the error of the failing operation, or the first broken graph
/// invariant. The scenario is left exactly as it was before the call.
pub fn apply(scenario: &mut Scenario, cmd: Command) -> Result<()> {
    let op = cmd.op_name();
    log_op_start!("apply", command = op);
    let start = Instant::now();

    let backup = scenario.clone();
    match apply_command(scenario, cmd) {
        Ok(()) => {
            log_op_end!("apply", started = start, command = op);
            Ok(())
        }
        Err(err) => {
            *scenario = backup;
            log_op_error!("apply", err.clone(), started = start, command = op);
            Err(err)
        }
    }
}

fn apply_command(scenario: &mut Scenario, cmd: Command) -> Result<()> {
    let structural = cmd.is_structural();
    let store = scenario.store_mut();

    match cmd {
        Command::SetItemRelation(request) => {
            relation_ops::set_item_relation(store, &request)?;
        }

        Command::SetUnitForceRelation {
            unit,
            superior,
            relationship_type,
        } => {
            relation_ops::set_unit_force_relation(store, &unit, &superior, relationship_type)?;
        }

        Command::AddUnit {
            object_handle,
            name,
            symbol_identifier,
            superior,
        } => {
            let unit = match object_handle {
                Some(handle) => {
                    Unit::create_with_handle(&mut store.tree, &handle, &name, &symbol_identifier)
                }
                None => Unit::create(&mut store.tree, &name, &symbol_identifier),
            };
            unit_ops::add_unit(store, unit, superior)?;
        }

        Command::AddEquipmentItem {
            object_handle,
            name,
            symbol_identifier,
            owner,
        } => {
            let item = match object_handle {
                Some(handle) => EquipmentItem::create_with_handle(
                    &mut store.tree,
                    &handle,
                    &name,
                    &symbol_identifier,
                ),
                None => EquipmentItem::create(&mut store.tree, &name, &symbol_identifier),
            };
            equipment_ops::add_equipment_item(store, item, owner.as_deref())?;
        }

        Command::AddForceSide {
            object_handle,
            name,
            allegiance,
        } => {
            let side = match object_handle {
                Some(handle) => ForceSide::create_with_handle(&mut store.tree, &handle, &name),
                None => ForceSide::create(&mut store.tree, &name),
            };
            force_side_ops::add_force_side(store, side, allegiance.as_deref())?;
        }

        Command::AddFederate {
            object_handle,
            name,
        } => {
            let federate = match object_handle {
                Some(handle) => Federate::create_with_handle(&mut store.tree, &handle, &name),
                None => Federate::create(&mut store.tree, &name),
            };
            federate_ops::add_federate(store, federate)?;
        }

        Command::RemoveUnit { handle } => unit_ops::remove_unit(store, &handle)?,

        Command::RemoveEquipmentItem { handle } => {
            equipment_ops::remove_equipment_item(store, &handle)?;
        }

        Command::RemoveForceSide { handle } => force_side_ops::remove_force_side(store, &handle)?,

        Command::RemoveFederate { handle } => federate_ops::remove_federate(store, &handle)?,

        Command::AssignToFederate { federate, entity } => {
            federate_ops::assign_to_federate(store, &federate, &entity)?;
        }

        Command::SetPrimarySide { handle } => force_side_ops::set_primary_side(store, &handle)?,
    }

    if structural {
        validation::validate_graph(store)?;
    }
    Ok(())
}
