//! Cascade Removal Tests
//!
//! Removing units, equipment, sides and federates and every reference that
//! points at them.
//!
//! ## Scenarios Covered
//!
//! 1. Promote policy: subordinates move into the removed unit's place
//! 2. Cascade policy: the whole subtree and its equipment disappear
//! 3. Federate references are dropped with the entity
//! 4. Removing a side removes its forces, units, equipment and associations
//! 5. Unknown handles are typed errors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use msdl_core::{
    CommandRelationshipType, MsdlEntity, MsdlError, ScenarioConfig, SubordinateRemoval, Superior,
};

fn cascade_config() -> ScenarioConfig {
    ScenarioConfig {
        subordinate_removal: SubordinateRemoval::Cascade,
        ..ScenarioConfig::default()
    }
}

#[test]
fn test_promote_moves_subordinates_into_place() {
    // GIVEN the default (promote) policy
    let mut scenario = load_scenario();

    // WHEN HQ is removed
    scenario.remove_unit(HQ).unwrap();

    // THEN its subordinates become the Friendly roots in its place
    assert!(scenario.get_unit_by_id(HQ).is_none());
    assert_eq!(scenario.units().len(), 5);
    assert_eq!(
        scenario.get_force_side_by_id(FRIENDLY).unwrap().root_units(),
        &[FIRST.to_string(), SECOND.to_string()]
    );
    assert_eq!(
        scenario.get_unit_by_id(FIRST).unwrap().superior(scenario.tree()),
        Some(Superior::ForceSide(FRIENDLY.to_string()))
    );

    // AND only HQ's own equipment goes with it
    assert!(scenario.get_equipment_by_id(TRUCK).is_none());
    assert!(scenario.get_equipment_by_id(TANK).is_some());
    assert_eq!(scenario.equipment().len(), 2);
    scenario.validate().unwrap();
}

#[test]
fn test_promote_under_a_unit_keeps_relationship_types() {
    // GIVEN "1th" with a subordinate of its own
    let mut scenario = load_scenario();
    scenario
        .set_unit_force_relation(E1, FIRST, Some(CommandRelationshipType::Tacon))
        .unwrap();

    // WHEN "1th" is removed
    scenario.remove_unit(FIRST).unwrap();

    // THEN E1 takes its place under HQ, before "2nd"
    assert_eq!(
        scenario.get_unit_by_id(HQ).unwrap().subordinates(),
        &[E1.to_string(), SECOND.to_string()]
    );
    assert_eq!(
        scenario
            .get_unit_by_id(E1)
            .unwrap()
            .relationship_type(scenario.tree()),
        Some(CommandRelationshipType::Tacon)
    );
    assert!(scenario.get_equipment_by_id(TANK).is_none());
    scenario.validate().unwrap();

    let reloaded = reload(&scenario);
    assert_eq!(reloaded.snapshot(), scenario.snapshot());
}

#[test]
fn test_cascade_removes_whole_subtree() {
    // GIVEN the cascade policy
    let mut scenario = load_scenario_with(cascade_config());

    // WHEN HQ is removed
    scenario.remove_unit(HQ).unwrap();

    // THEN every unit and item below it is gone
    for handle in [HQ, FIRST, SECOND] {
        assert!(scenario.get_unit_by_id(handle).is_none(), "{handle}");
    }
    for handle in [TANK, TRUCK] {
        assert!(scenario.get_equipment_by_id(handle).is_none(), "{handle}");
    }
    assert_eq!(scenario.units().len(), 3);
    assert_eq!(handles(&scenario.equipment()), vec![RADAR.to_string()]);
    assert!(scenario
        .get_force_side_by_id(FRIENDLY)
        .unwrap()
        .root_units()
        .is_empty());

    // AND the document no longer mentions them
    let xml = scenario.to_xml();
    for handle in [HQ, FIRST, SECOND, TANK, TRUCK] {
        assert!(!xml.contains(handle), "{handle} still in document");
    }
    scenario.validate().unwrap();
}

#[test]
fn test_removal_drops_federate_references() {
    let mut scenario = load_scenario();
    let federate = scenario.get_federate_by_id(FEDERATE).unwrap();
    assert_eq!(federate.units(scenario.tree()).len(), 2);

    scenario.remove_unit(FIRST).unwrap();

    let federate = scenario.get_federate_by_id(FEDERATE).unwrap();
    assert_eq!(federate.units(scenario.tree()), vec![HQ.to_string()]);
    assert!(federate.equipment(scenario.tree()).is_empty());
    assert_eq!(scenario.federates_of(HQ).len(), 1);
}

#[test]
fn test_remove_equipment_item() {
    let mut scenario = load_scenario();

    scenario.remove_equipment_item(TANK).unwrap();

    assert!(scenario.get_unit_by_id(FIRST).unwrap().equipment().is_empty());
    assert!(scenario
        .get_federate_by_id(FEDERATE)
        .unwrap()
        .equipment(scenario.tree())
        .is_empty());
    assert_eq!(scenario.equipment().len(), 2);
    scenario.validate().unwrap();
}

#[test]
fn test_remove_force_side_takes_everything_below_it() {
    // GIVEN Friendly with a force, root units and equipment
    let mut scenario = load_scenario();

    // WHEN the side is removed
    scenario.remove_force_side(FRIENDLY).unwrap();

    // THEN only the Hostile side and its units remain
    assert_eq!(handles(&scenario.force_sides()), vec![HOSTILE.to_string()]);
    assert_eq!(
        handles(&scenario.units()),
        vec![ENEMY_HQ.to_string(), E1.to_string()]
    );
    assert!(scenario.equipment().is_empty());

    // AND the primary side moves to the remaining side
    assert_eq!(
        scenario.primary_side().map(|s| s.object_handle()),
        Some(HOSTILE)
    );

    // AND Hostile no longer associates with it
    let hostile = scenario.get_force_side_by_id(HOSTILE).unwrap();
    assert!(hostile.associations(scenario.tree()).is_empty());

    // AND the federate no longer deploys anything
    let federate = scenario.get_federate_by_id(FEDERATE).unwrap();
    assert!(federate.units(scenario.tree()).is_empty());
    scenario.validate().unwrap();
}

#[test]
fn test_remove_force_only_touches_the_force() {
    let mut scenario = load_scenario();

    scenario.remove_force_side(FRIENDLY_RESERVE).unwrap();

    assert!(scenario.get_unit_by_id(RECON).is_none());
    assert!(scenario
        .get_force_side_by_id(FRIENDLY)
        .unwrap()
        .forces()
        .is_empty());
    assert_eq!(scenario.units().len(), 5);
    assert_eq!(
        scenario.primary_side().map(|s| s.object_handle()),
        Some(FRIENDLY)
    );
    scenario.validate().unwrap();
}

#[test]
fn test_remove_federate_keeps_entities() {
    let mut scenario = load_scenario();

    scenario.remove_federate(FEDERATE).unwrap();

    assert!(scenario.federates().is_empty());
    assert_eq!(scenario.units().len(), 6);
    assert!(!scenario.to_xml().contains("VR-Forces"));
}

#[test]
fn test_unknown_handles_are_rejected() {
    let mut scenario = load_scenario();
    let before = scenario.to_xml();

    assert_eq!(
        scenario.remove_unit(TANK).unwrap_err(),
        MsdlError::UnitNotFound {
            handle: TANK.to_string()
        }
    );
    assert_eq!(
        scenario.remove_equipment_item(HQ).unwrap_err(),
        MsdlError::EquipmentNotFound {
            handle: HQ.to_string()
        }
    );
    assert_eq!(
        scenario.remove_force_side(HQ).unwrap_err(),
        MsdlError::ForceSideNotFound {
            handle: HQ.to_string()
        }
    );
    assert_eq!(
        scenario.remove_federate("ghost").unwrap_err(),
        MsdlError::FederateNotFound {
            handle: "ghost".to_string()
        }
    );
    assert_eq!(scenario.to_xml(), before);
}
