use super::federate_ops;
use super::relation_ops::{move_equipment, Placement};
use super::store::{Store, EQUIPMENT_PATH};
use super::unit_ops::default_attachment;
use crate::errors::{MsdlError, Result};
use crate::model::{EntityKind, EquipmentItem, MsdlEntity, Superior};

/// Add an EquipmentItem, owned by `owner` when given
///
/// Without an explicit owner the owner recorded on the node is kept if it
/// resolves; otherwise the item goes to the primary side.
///
/// # Errors
/// * `DuplicateHandle` - handle already used by another entity
/// * `OwnerNotFound` - `owner` names neither a Unit nor a ForceSide
/// * `NoPrimarySide` - nothing to attach to
/// * `ForeignEntity` - node is not a detached `EquipmentItem` of this document
pub fn add_equipment_item(
    store: &mut Store,
    item: EquipmentItem,
    owner: Option<&str>,
) -> Result<()> {
    let handle = item.object_handle().to_string();
    if store.is_known(&handle) {
        return Err(MsdlError::DuplicateHandle { handle });
    }
    store.check_new_entity(item.node(), "EquipmentItem", &handle)?;

    let owner = match owner {
        Some(owner) => owner_superior(store, owner)?,
        None => item
            .owner(&store.tree)
            .filter(|recorded| store.resolve_superior(recorded).is_some())
            .map_or_else(|| default_attachment(store), Ok)?,
    };

    store.attach_new(EQUIPMENT_PATH, item.node());
    store.equipment.insert(handle.clone(), item);
    move_equipment(store, &handle, owner, Placement::End)?;
    tracing::debug!(object_handle = %handle, "equipment added");
    Ok(())
}

fn owner_superior(store: &Store, owner: &str) -> Result<Superior> {
    match store.kind_of(owner) {
        Some(EntityKind::Unit) => Ok(Superior::Unit(owner.to_string())),
        Some(EntityKind::ForceSide) => Ok(Superior::ForceSide(owner.to_string())),
        _ => Err(MsdlError::OwnerNotFound {
            handle: owner.to_string(),
        }),
    }
}

/// Remove an EquipmentItem and every reference to it
///
/// # Errors
/// * `EquipmentNotFound` - handle does not name an EquipmentItem
pub fn remove_equipment_item(store: &mut Store, handle: &str) -> Result<()> {
    if store.get_equipment_by_id(handle).is_none() {
        return Err(MsdlError::EquipmentNotFound {
            handle: handle.to_string(),
        });
    }
    remove_single_item(store, handle)
}

pub(crate) fn remove_single_item(store: &mut Store, handle: &str) -> Result<()> {
    if let Some(owner) = store.superior_of(handle) {
        if let Some(list) = store.child_list_mut(&owner, EntityKind::EquipmentItem) {
            list.retain(|h| h != handle);
        }
    }
    federate_ops::forget_entity(store, EntityKind::EquipmentItem, handle);
    if let Some(item) = store.equipment.remove(handle) {
        store.tree.detach(item.node());
    }
    tracing::debug!(object_handle = %handle, "equipment removed");
    Ok(())
}
