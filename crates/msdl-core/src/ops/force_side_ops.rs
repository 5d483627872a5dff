//! Sides, forces and the primary side

use std::collections::HashSet;

use super::equipment_ops;
use super::store::{Store, FORCE_SIDES_PATH};
use super::unit_ops;
use crate::config::SubordinateRemoval;
use crate::errors::{MsdlError, Result};
use crate::model::{EntityRef, ForceSide, MsdlEntity, StandardIdentity, Symbolized, Unit};

/// Add a ForceSide
///
/// With `allegiance` the new entry becomes a force of that side; without it
/// the allegiance on its node decides, and an entry with no allegiance (or
/// allegiance to itself) is a side. The first side of a scenario becomes
/// its primary side.
///
/// # Errors
/// * `DuplicateHandle` - handle already used by another entity
/// * `ForceSideNotFound` - allegiance names no ForceSide
/// * `NotASide` - allegiance names a force rather than a side
/// * `ForeignEntity` - node is not a detached `ForceSide` of this document
pub fn add_force_side(
    store: &mut Store,
    mut side: ForceSide,
    allegiance: Option<&str>,
) -> Result<()> {
    let handle = side.object_handle().to_string();
    if store.is_known(&handle) {
        return Err(MsdlError::DuplicateHandle { handle });
    }
    store.check_new_entity(side.node(), "ForceSide", &handle)?;

    let parent = match allegiance {
        Some(parent) => Some(parent.to_string()),
        None => side.parent_side_handle(&store.tree),
    };
    if let Some(parent) = &parent {
        let parent_side =
            store
                .get_force_side_by_id(parent)
                .ok_or_else(|| MsdlError::ForceSideNotFound {
                    handle: parent.clone(),
                })?;
        if !parent_side.is_side(&store.tree) {
            return Err(MsdlError::NotASide {
                handle: parent.clone(),
            });
        }
    }

    store.attach_new(FORCE_SIDES_PATH, side.node());
    if let Some(parent) = &parent {
        side.set_allegiance_handle(&mut store.tree, parent);
        if let Some(parent_side) = store.force_sides.get_mut(parent) {
            parent_side.forces.push(handle.clone());
        }
    }
    store.force_sides.insert(handle.clone(), side);
    if parent.is_none() && store.primary_side().is_none() {
        store.primary_side = Some(handle.clone());
    }
    tracing::debug!(object_handle = %handle, force = parent.is_some(), "force side added");
    Ok(())
}

/// Remove a ForceSide with everything below it
///
/// Its forces, the whole subtrees of its root units and its equipment are
/// removed, and other sides drop their Associations to it. When the primary
/// side goes, the first remaining side takes its place.
///
/// # Errors
/// * `ForceSideNotFound` - handle does not name a ForceSide
pub fn remove_force_side(store: &mut Store, handle: &str) -> Result<()> {
    let side = store
        .get_force_side_by_id(handle)
        .ok_or_else(|| MsdlError::ForceSideNotFound {
            handle: handle.to_string(),
        })?;
    let forces = side.forces().to_vec();
    let root_units = side.root_units().to_vec();
    let equipment = side.equipment().to_vec();
    let parent = side.parent_side_handle(&store.tree);

    for force in forces {
        if store.force_sides.contains_key(&force) {
            remove_force_side(store, &force)?;
        }
    }
    for root in root_units {
        unit_ops::remove_unit_with(store, &root, SubordinateRemoval::Cascade)?;
    }
    for item in equipment {
        equipment_ops::remove_single_item(store, &item)?;
    }

    if let Some(parent) = parent {
        if let Some(parent_side) = store.force_sides.get_mut(&parent) {
            parent_side.forces.retain(|h| h != handle);
        }
    }
    let mut pruned = 0;
    for other in store.force_sides.values() {
        if other.object_handle() != handle {
            pruned += other.remove_associations_to(&mut store.tree, handle);
        }
    }

    if let Some(side) = store.force_sides.remove(handle) {
        store.tree.detach(side.node());
    }
    if store.primary_side.as_deref() == Some(handle) {
        store.primary_side = sides(store)
            .first()
            .map(|s| s.object_handle().to_string());
    }
    tracing::debug!(object_handle = %handle, associations = pruned, "force side removed");
    Ok(())
}


/// ForceSides that are sides (not forces), in document order
pub fn sides(store: &Store) -> Vec<&ForceSide> {
    store
        .force_sides_in_order()
        .into_iter()
        .filter(|side| side.is_side(&store.tree))
        .collect()
}

/// Root units of every ForceSide, sides and forces in document order
pub fn root_units(store: &Store) -> Vec<&Unit> {
    store
        .force_sides_in_order()
        .into_iter()
        .flat_map(|side| side.root_units().iter())
        .filter_map(|handle| store.get_unit_by_id(handle))
        .collect()
}

/// Side owning an entity: walks superiors and owners up to a ForceSide,
/// then from a force to its side
pub fn side_of<'a>(store: &'a Store, handle: &str) -> Option<&'a ForceSide> {
    let mut visited = HashSet::new();
    let mut current = store.get_entity(handle)?;
    loop {
        if !visited.insert(current.object_handle().to_string()) {
            return None;
        }
        match current {
            EntityRef::ForceSide(side) => {
                return match side.parent_side_handle(&store.tree) {
                    Some(parent) => store.get_force_side_by_id(&parent).or(Some(side)),
                    None => Some(side),
                };
            }
            EntityRef::Unit(_) | EntityRef::EquipmentItem(_) => {
                current = store.get_item_parent(current.object_handle())?;
            }
        }
    }
}

/// Units and equipment belonging to a side and its forces
fn members(store: &Store, side: &str) -> (Vec<String>, Vec<String>) {
    let mut sides = vec![side.to_string()];
    if let Some(s) = store.get_force_side_by_id(side) {
        sides.extend(s.forces().iter().cloned());
    }
    let mut units = Vec::new();
    let mut equipment = Vec::new();
    for handle in &sides {
        let Some(s) = store.get_force_side_by_id(handle) else {
            continue;
        };
        equipment.extend(s.equipment().iter().cloned());
        for root in s.root_units() {
            for unit in unit_ops::subtree(store, root) {
                if let Some(u) = store.get_unit_by_id(&unit) {
                    equipment.extend(u.equipment().iter().cloned());
                }
                units.push(unit);
            }
        }
    }
    (units, equipment)
}

fn first_identity(store: &Store, units: &[String], equipment: &[String]) -> Option<StandardIdentity> {
    units
        .iter()
        .filter_map(|h| store.get_unit_by_id(h))
        .find_map(|u| u.identity(&store.tree))
        .or_else(|| {
            equipment
                .iter()
                .filter_map(|h| store.get_equipment_by_id(h))
                .find_map(|e| e.identity(&store.tree))
        })
}

fn assign_identity(
    store: &mut Store,
    units: &[String],
    equipment: &[String],
    identity: StandardIdentity,
) -> Result<()> {
    for handle in units {
        let (unit, tree) = store.unit_mut(handle)?;
        unit.set_identity(tree, identity);
    }
    for handle in equipment {
        let (item, tree) = store.equipment_mut(handle)?;
        item.set_identity(tree, identity);
    }
    Ok(())
}

/// Designate the primary side
///
/// The identities of the old and new primary hierarchies are swapped so the
/// primary side keeps rendering as the old primary did. Each identity is
/// taken from the first unit, then the first item, of its hierarchy whose
/// symbol identifier carries one. A hierarchy without any counts as Friend
/// for the old primary and as Hostile for the new one. Identifiers too short
/// to carry an identity are left as they are.
///
/// # Errors
/// * `ForceSideNotFound` - handle does not name a ForceSide
/// * `NotASide` - handle names a force
pub fn set_primary_side(store: &mut Store, handle: &str) -> Result<()> {
    let side = store
        .get_force_side_by_id(handle)
        .ok_or_else(|| MsdlError::ForceSideNotFound {
            handle: handle.to_string(),
        })?;
    if !side.is_side(&store.tree) {
        return Err(MsdlError::NotASide {
            handle: handle.to_string(),
        });
    }

    let previous = store
        .primary_side()
        .map(|s| s.object_handle().to_string());
    if previous.as_deref() == Some(handle) {
        return Ok(());
    }

    if let Some(previous) = &previous {
        let (old_units, old_equipment) = members(store, previous);
        let (new_units, new_equipment) = members(store, handle);
        let old_identity = first_identity(store, &old_units, &old_equipment)
            .unwrap_or(StandardIdentity::Friend);
        let new_identity = first_identity(store, &new_units, &new_equipment)
            .unwrap_or(StandardIdentity::Hostile);

        assign_identity(store, &new_units, &new_equipment, old_identity)?;
        assign_identity(store, &old_units, &old_equipment, new_identity)?;
    }

    store.primary_side = Some(handle.to_string());
    tracing::debug!(object_handle = %handle, previous = ?previous, "primary side changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::model::{EquipmentItem, Superior};
    use crate::xml::XmlTree;

    fn store() -> Store {
        let tree = XmlTree::parse("<MilitaryScenario/>").unwrap();
        let root = tree.root_element().unwrap();
        let mut store = Store::load(tree, root, ScenarioConfig::default());
        for (handle, sidc) in [("blue", "SFGPU------"), ("red", "SHGPU------")] {
            let side = ForceSide::create_with_handle(&mut store.tree, handle, handle);
            add_force_side(&mut store, side, None).unwrap();
            let unit =
                Unit::create_with_handle(&mut store.tree, &format!("{handle}-hq"), "HQ", sidc);
            unit_ops::add_unit(&mut store, unit, Some(Superior::ForceSide(handle.into()))).unwrap();
        }
        let force = ForceSide::create_with_handle(&mut store.tree, "blue-2", "Second");
        add_force_side(&mut store, force, Some("blue")).unwrap();
        let item = EquipmentItem::create_with_handle(&mut store.tree, "tank", "Tank", "SFGPE------");
        equipment_ops::add_equipment_item(&mut store, item, Some("blue-hq")).unwrap();
        store
    }

    #[test]
    fn test_first_side_is_primary_and_forces_are_linked() {
        let store = store();
        assert_eq!(store.primary_side().map(|s| s.object_handle()), Some("blue"));
        assert_eq!(sides(&store).len(), 2);
        assert_eq!(
            store.get_force_side_by_id("blue").unwrap().forces(),
            &["blue-2".to_string()]
        );
        assert_eq!(side_of(&store, "tank").map(|s| s.object_handle()), Some("blue"));
        assert_eq!(side_of(&store, "blue-2").map(|s| s.object_handle()), Some("blue"));
        assert_eq!(root_units(&store).len(), 2);
    }

    #[test]
    fn test_force_must_join_a_side() {
        let mut store = store();
        let nested = ForceSide::create_with_handle(&mut store.tree, "nested", "Nested");
        assert_eq!(
            add_force_side(&mut store, nested, Some("blue-2")),
            Err(MsdlError::NotASide {
                handle: "blue-2".to_string()
            })
        );
    }

    #[test]
    fn test_set_primary_swaps_identities() {
        let mut store = store();
        set_primary_side(&mut store, "red").unwrap();

        let tree = store.tree();
        assert_eq!(
            store.get_unit_by_id("red-hq").unwrap().identity(tree),
            Some(StandardIdentity::Friend)
        );
        assert_eq!(
            store.get_unit_by_id("blue-hq").unwrap().identity(tree),
            Some(StandardIdentity::Hostile)
        );
        assert_eq!(
            store.get_equipment_by_id("tank").unwrap().identity(tree),
            Some(StandardIdentity::Hostile)
        );
        assert_eq!(
            set_primary_side(&mut store, "blue-2"),
            Err(MsdlError::NotASide {
                handle: "blue-2".to_string()
            })
        );
    }

    #[test]
    fn test_set_primary_without_identity_on_new_side_assumes_hostile() {
        let mut store = store();
        let green = ForceSide::create_with_handle(&mut store.tree, "green", "Green");
        add_force_side(&mut store, green, None).unwrap();
        let unmarked = Unit::create_with_handle(&mut store.tree, "green-hq", "HQ", "S");
        unit_ops::add_unit(&mut store, unmarked, Some(Superior::ForceSide("green".into())))
            .unwrap();

        set_primary_side(&mut store, "green").unwrap();

        let tree = store.tree();
        assert_eq!(
            store.get_unit_by_id("blue-hq").unwrap().identity(tree),
            Some(StandardIdentity::Hostile)
        );
        assert_eq!(
            store.get_unit_by_id("green-hq").unwrap().symbol_identifier(tree).as_deref(),
            Some("S")
        );
        assert_eq!(store.primary_side().map(|s| s.object_handle()), Some("green"));
    }

    #[test]
    fn test_set_primary_from_side_without_identity_assumes_friend() {
        let tree = XmlTree::parse("<MilitaryScenario/>").unwrap();
        let root = tree.root_element().unwrap();
        let mut store = Store::load(tree, root, ScenarioConfig::default());
        for handle in ["grey", "red"] {
            let side = ForceSide::create_with_handle(&mut store.tree, handle, handle);
            add_force_side(&mut store, side, None).unwrap();
        }
        let red_hq = Unit::create_with_handle(&mut store.tree, "red-hq", "HQ", "SHGPU------");
        unit_ops::add_unit(&mut store, red_hq, Some(Superior::ForceSide("red".into()))).unwrap();

        set_primary_side(&mut store, "red").unwrap();

        assert_eq!(
            store.get_unit_by_id("red-hq").unwrap().identity(store.tree()),
            Some(StandardIdentity::Friend)
        );
    }

    #[test]
    fn test_remove_side_leaves_unit_policy_alone() {
        let mut store = store();
        assert_eq!(store.config().subordinate_removal, SubordinateRemoval::Promote);
        let sub = Unit::create_with_handle(&mut store.tree, "blue-1", "1st", "SFGPU------");
        unit_ops::add_unit(&mut store, sub, Some(Superior::Unit("blue-hq".into()))).unwrap();

        remove_force_side(&mut store, "blue").unwrap();

        assert!(store.get_unit_by_id("blue-1").is_none());
        assert_eq!(store.config().subordinate_removal, SubordinateRemoval::Promote);
    }

    #[test]
    fn test_remove_side_takes_hierarchy_and_reassigns_primary() {
        let mut store = store();
        remove_force_side(&mut store, "blue").unwrap();
        assert!(store.get_unit_by_id("blue-hq").is_none());
        assert!(store.get_equipment_by_id("tank").is_none());
        assert!(store.get_force_side_by_id("blue-2").is_none());
        assert_eq!(store.primary_side().map(|s| s.object_handle()), Some("red"));
    }
}
