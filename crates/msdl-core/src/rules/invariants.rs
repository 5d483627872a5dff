use std::collections::{HashMap, HashSet};

use crate::model::{EntityKind, MsdlEntity, Superior};
use crate::ops::Store;

/// Check if a Unit is part of a cycle in the command tree
pub fn has_cycle(store: &Store, unit: &str) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(unit.to_string());

    while let Some(handle) = current {
        if !visited.insert(handle.clone()) {
            return true;
        }
        current = match store
            .get_unit_by_id(&handle)
            .and_then(|u| u.superior(store.tree()))
        {
            Some(Superior::Unit(superior)) => Some(superior),
            _ => None,
        };
    }

    false
}

fn recorded_edges(store: &Store) -> Vec<(EntityKind, String, Superior)> {
    let tree = store.tree();
    let units = store.units_in_order().into_iter().filter_map(|u| {
        Some((
            EntityKind::Unit,
            u.object_handle().to_string(),
            u.superior(tree)?,
        ))
    });
    let equipment = store.equipment_in_order().into_iter().filter_map(|e| {
        Some((
            EntityKind::EquipmentItem,
            e.object_handle().to_string(),
            e.owner(tree)?,
        ))
    });
    units.chain(equipment).collect()
}

/// Find entities whose recorded superior/owner exists but does not list
/// them exactly once
///
/// Superiors that do not resolve are skipped; they are a data-quality issue
/// reported at load time.
///
/// Returns list of (child, superior) tuples
pub fn find_membership_inconsistencies(store: &Store) -> Vec<(String, String)> {
    let mut inconsistent = Vec::new();
    for (kind, handle, superior) in recorded_edges(store) {
        let Some(list) = store.child_list(&superior, kind) else {
            continue;
        };
        if list.iter().filter(|h| **h == handle).count() != 1 {
            inconsistent.push((handle, superior.handle().to_string()));
        }
    }
    inconsistent
}

/// Find child-list entries whose member is unknown or records another
/// superior/owner
///
/// Returns list of (parent, child) tuples
pub fn find_stray_children(store: &Store) -> Vec<(String, String)> {
    let mut stray = Vec::new();
    let mut check = |parent: Superior, kind: EntityKind, list: &[String]| {
        for child in list {
            let recorded = match kind {
                EntityKind::Unit => store.get_unit_by_id(child).map(|_| store.superior_of(child)),
                _ => store
                    .get_equipment_by_id(child)
                    .map(|_| store.superior_of(child)),
            };
            if recorded.flatten().as_ref() != Some(&parent) {
                stray.push((parent.handle().to_string(), child.clone()));
            }
        }
    };
    for unit in store.units_in_order() {
        let parent = Superior::Unit(unit.object_handle().to_string());
        check(parent.clone(), EntityKind::Unit, unit.subordinates());
        check(parent, EntityKind::EquipmentItem, unit.equipment());
    }
    for side in store.force_sides_in_order() {
        let parent = Superior::ForceSide(side.object_handle().to_string());
        check(parent.clone(), EntityKind::Unit, side.root_units());
        check(parent, EntityKind::EquipmentItem, side.equipment());
    }
    stray
}

fn is_in_document_order(list: &[String], positions: &HashMap<&str, usize>) -> bool {
    let indices: Vec<usize> = list
        .iter()
        .filter_map(|h| positions.get(h.as_str()).copied())
        .collect();
    indices.windows(2).all(|pair| pair[0] < pair[1])
}

/// Find parents whose ordered child list disagrees with document order
pub fn find_order_mismatches(store: &Store) -> Vec<String> {
    let unit_positions: HashMap<&str, usize> = store
        .units_in_order()
        .into_iter()
        .enumerate()
        .map(|(i, u)| (u.object_handle(), i))
        .collect();
    let equipment_positions: HashMap<&str, usize> = store
        .equipment_in_order()
        .into_iter()
        .enumerate()
        .map(|(i, e)| (e.object_handle(), i))
        .collect();

    let mut mismatches = Vec::new();
    for unit in store.units_in_order() {
        if !is_in_document_order(unit.subordinates(), &unit_positions)
            || !is_in_document_order(unit.equipment(), &equipment_positions)
        {
            mismatches.push(unit.object_handle().to_string());
        }
    }
    for side in store.force_sides_in_order() {
        if !is_in_document_order(side.root_units(), &unit_positions)
            || !is_in_document_order(side.equipment(), &equipment_positions)
        {
            mismatches.push(side.object_handle().to_string());
        }
    }
    mismatches
}

/// Find indexed entities whose node is not in the document
pub fn find_detached_entities(store: &Store) -> Vec<String> {
    let tree = store.tree();
    let mut detached: Vec<String> = store
        .units
        .values()
        .map(|u| (u.object_handle(), u.node()))
        .chain(store.equipment.values().map(|e| (e.object_handle(), e.node())))
        .chain(store.force_sides.values().map(|s| (s.object_handle(), s.node())))
        .chain(store.federates.values().map(|f| (f.object_handle(), f.node())))
        .filter(|(_, node)| !tree.is_attached(*node))
        .map(|(handle, _)| handle.to_string())
        .collect();
    detached.sort();
    detached
}

/// Find forces missing from their side's `forces`, and `forces` entries
/// that are not forces of that side
///
/// Returns list of (side, force) tuples
pub fn find_force_inconsistencies(store: &Store) -> Vec<(String, String)> {
    let tree = store.tree();
    let mut inconsistent = Vec::new();
    for force in store.force_sides_in_order() {
        let Some(parent) = force.parent_side_handle(tree) else {
            continue;
        };
        if let Some(side) = store.get_force_side_by_id(&parent) {
            if !side.forces().iter().any(|h| h == force.object_handle()) {
                inconsistent.push((parent, force.object_handle().to_string()));
            }
        }
    }
    for side in store.force_sides_in_order() {
        for force in side.forces() {
            let parent = store
                .get_force_side_by_id(force)
                .and_then(|f| f.parent_side_handle(tree));
            if parent.as_deref() != Some(side.object_handle()) {
                inconsistent.push((side.object_handle().to_string(), force.clone()));
            }
        }
    }
    inconsistent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::xml::XmlTree;

    fn store(xml: &str) -> Store {
        let tree = XmlTree::parse(xml).unwrap();
        let root = tree.root_element().unwrap();
        Store::load(tree, root, ScenarioConfig::default())
    }

    fn unit(handle: &str, superior: &str) -> String {
        format!(
            "<Unit><ObjectHandle>{handle}</ObjectHandle><Relations><ForceRelation>\
             <ForceRelationChoice>UNIT</ForceRelationChoice><ForceRelationData><CommandRelation>\
             <CommandingSuperiorHandle>{superior}</CommandingSuperiorHandle>\
             <CommandRelationshipType>NONE</CommandRelationshipType></CommandRelation>\
             </ForceRelationData></ForceRelation></Relations></Unit>"
        )
    }

    #[test]
    fn test_has_cycle_detects_loop_in_document() {
        let store = store(&format!(
            "<MilitaryScenario><Organizations><Units>{}{}</Units></Organizations></MilitaryScenario>",
            unit("a", "b"),
            unit("b", "a")
        ));
        assert!(has_cycle(&store, "a"));
        assert!(find_membership_inconsistencies(&store).is_empty());
    }

    #[test]
    fn test_loaded_graph_is_consistent() {
        let store = store(&format!(
            "<MilitaryScenario><Organizations><Units>{}{}{}</Units></Organizations></MilitaryScenario>",
            unit("hq", "nobody"),
            unit("a", "hq"),
            unit("b", "hq")
        ));
        assert!(!has_cycle(&store, "b"));
        assert!(find_membership_inconsistencies(&store).is_empty());
        assert!(find_stray_children(&store).is_empty());
        assert!(find_order_mismatches(&store).is_empty());
        assert!(find_detached_entities(&store).is_empty());
    }

    #[test]
    fn test_broken_list_is_reported() {
        let mut store = store(&format!(
            "<MilitaryScenario><Organizations><Units>{}{}{}</Units></Organizations></MilitaryScenario>",
            unit("hq", "nobody"),
            unit("a", "hq"),
            unit("b", "hq")
        ));
        if let Some(hq) = store.units.get_mut("hq") {
            hq.subordinates.reverse();
        }
        assert_eq!(find_order_mismatches(&store), vec!["hq".to_string()]);

        if let Some(hq) = store.units.get_mut("hq") {
            hq.subordinates.retain(|h| h != "a");
        }
        assert_eq!(
            find_membership_inconsistencies(&store),
            vec![("a".to_string(), "hq".to_string())]
        );
    }
}
