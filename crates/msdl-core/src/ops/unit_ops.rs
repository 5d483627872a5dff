use std::collections::HashSet;

use super::equipment_ops;
use super::federate_ops;
use super::relation_ops::{ensure_no_cycle, move_unit, Placement};
use super::store::{Store, UNITS_PATH};
use crate::config::SubordinateRemoval;
use crate::errors::{MsdlError, Result};
use crate::model::{EntityKind, MsdlEntity, Superior, Unit};

/// Add a Unit to the scenario
///
/// The unit is placed, in order of preference, under `superior`, under the
/// superior already recorded on its node, or as a root unit of the primary
/// side. It becomes the last child of that superior.
///
/// # Errors
/// * `DuplicateHandle` - handle already used by another entity
/// * `TargetNotFound` - explicit superior does not resolve
/// * `NoPrimarySide` - nothing to attach to
/// * `ForeignEntity` - unit node is not a detached `Unit` of this document
pub fn add_unit(store: &mut Store, unit: Unit, superior: Option<Superior>) -> Result<()> {
    let handle = unit.object_handle().to_string();
    if store.is_known(&handle) {
        return Err(MsdlError::DuplicateHandle { handle });
    }
    store.check_new_entity(unit.node(), "Unit", &handle)?;

    let superior = match superior {
        Some(explicit) => {
            if store.resolve_superior(&explicit).is_none() {
                return Err(MsdlError::TargetNotFound {
                    handle: explicit.handle().to_string(),
                });
            }
            explicit
        }
        None => unit
            .superior(&store.tree)
            .filter(|recorded| store.resolve_superior(recorded).is_some())
            .map_or_else(|| default_attachment(store), Ok)?,
    };
    let relationship_type = match &superior {
        Superior::Unit(_) => Some(
            unit.relationship_type(&store.tree)
                .unwrap_or(store.config.default_relationship_type),
        ),
        Superior::ForceSide(_) => None,
    };

    store.attach_new(UNITS_PATH, unit.node());
    store.units.insert(handle.clone(), unit);
    move_unit(store, &handle, superior, Placement::End, relationship_type)?;
    tracing::debug!(object_handle = %handle, "unit added");
    Ok(())
}

/// Root position of the primary side
pub(crate) fn default_attachment(store: &Store) -> Result<Superior> {
    store
        .primary_side
        .clone()
        .filter(|h| store.force_sides.contains_key(h))
        .map(Superior::ForceSide)
        .ok_or(MsdlError::NoPrimarySide)
}

/// Remove a Unit, its equipment and every reference to it
///
/// Subordinates are handled per `ScenarioConfig::subordinate_removal`:
/// promoted into the removed unit's place, or removed with it.
///
/// # Errors
/// * `UnitNotFound` - handle does not name a Unit
/// * `NoPrimarySide` - subordinates of an unattached unit have nowhere to go
pub fn remove_unit(store: &mut Store, handle: &str) -> Result<()> {
    let policy = store.config.subordinate_removal;
    remove_unit_with(store, handle, policy)
}

/// [`remove_unit`] with an explicit subordinate policy
///
/// The scenario's configured policy is ignored and left untouched.
///
/// # Errors
/// Same as [`remove_unit`].
pub fn remove_unit_with(
    store: &mut Store,
    handle: &str,
    policy: SubordinateRemoval,
) -> Result<()> {
    let unit = store
        .get_unit_by_id(handle)
        .ok_or_else(|| MsdlError::UnitNotFound {
            handle: handle.to_string(),
        })?;
    let subordinates = unit.subordinates().to_vec();

    match policy {
        SubordinateRemoval::Cascade => {
            for descendant in subtree(store, handle).into_iter().rev() {
                if descendant != handle {
                    remove_single_unit(store, &descendant)?;
                }
            }
        }
        SubordinateRemoval::Promote => promote_subordinates(store, handle, &subordinates)?,
    }
    remove_single_unit(store, handle)
}

/// Handles of `root` and every unit below it, in pre-order
pub(crate) fn subtree(store: &Store, root: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root.to_string()];
    while let Some(handle) = stack.pop() {
        if !seen.insert(handle.clone()) {
            continue;
        }
        if let Some(unit) = store.get_unit_by_id(&handle) {
            stack.extend(unit.subordinates().iter().rev().cloned());
        }
        order.push(handle);
    }
    order
}

fn promote_subordinates(store: &mut Store, handle: &str, subordinates: &[String]) -> Result<()> {
    if subordinates.is_empty() {
        return Ok(());
    }
    let removed_node = store.require_node(handle)?;
    let superior = store
        .superior_of(handle)
        .filter(|s| store.resolve_superior(s).is_some());

    let Some(superior) = superior else {
        let side = default_attachment(store)?;
        for sub in subordinates {
            move_unit(store, sub, side.clone(), Placement::End, None)?;
        }
        return Ok(());
    };

    let relationship_default = store.config.default_relationship_type;
    for sub in subordinates {
        let (unit, tree) = store.unit_mut(sub)?;
        tree.insert_before(removed_node, unit.node());
        let relationship_type = unit.relationship_type(tree).unwrap_or(relationship_default);
        unit.set_superior(tree, superior.clone(), relationship_type);
    }
    if let Some(list) = store.child_list_mut(&superior, EntityKind::Unit) {
        let position = list.iter().position(|h| h == handle).unwrap_or(list.len());
        list.splice(position..position, subordinates.iter().cloned());
    }
    if let Some(unit) = store.units.get_mut(handle) {
        unit.subordinates.clear();
    }
    tracing::debug!(object_handle = %handle, promoted = subordinates.len(), "subordinates promoted");
    Ok(())
}

/// Remove one unit; its subordinate list must already be dealt with
fn remove_single_unit(store: &mut Store, handle: &str) -> Result<()> {
    let owned = store
        .get_unit_by_id(handle)
        .map(|u| u.equipment().to_vec())
        .unwrap_or_default();
    for item in owned {
        equipment_ops::remove_single_item(store, &item)?;
    }

    let organic: Vec<String> = store
        .equipment
        .values()
        .filter(|item| item.organic_superior_handle(&store.tree).as_deref() == Some(handle))
        .map(|item| item.object_handle().to_string())
        .collect();
    for item in organic {
        let (item, tree) = store.equipment_mut(&item)?;
        item.clear_organic_superior(tree);
    }

    if let Some(superior) = store.superior_of(handle) {
        if let Some(list) = store.child_list_mut(&superior, EntityKind::Unit) {
            list.retain(|h| h != handle);
        }
    }
    federate_ops::forget_entity(store, EntityKind::Unit, handle);

    if let Some(unit) = store.units.remove(handle) {
        store.tree.detach(unit.node());
    }
    tracing::debug!(object_handle = %handle, "unit removed");
    Ok(())
}

/// First unit in document order with this `Name`
pub fn find_unit_by_name<'a>(store: &'a Store, name: &str) -> Option<&'a Unit> {
    store
        .units_in_order()
        .into_iter()
        .find(|unit| unit.name(&store.tree).as_deref() == Some(name))
}

/// Whether `candidate` is `ancestor` or lies below it
pub fn is_descendant_of(store: &Store, candidate: &str, ancestor: &str) -> bool {
    ensure_no_cycle(store, ancestor, candidate).is_err()
}
