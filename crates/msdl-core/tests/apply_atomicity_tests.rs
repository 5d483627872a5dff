//! Apply Atomicity Tests
//!
//! Commands applied through [`msdl_core::apply`] either take full effect or
//! leave the scenario as it was.
//!
//! ## Scenarios Covered
//!
//! 1. A sequence of successful commands builds on the loaded document
//! 2. A failing command restores document and graph exactly
//! 3. Commands can be decoded from JSON
//! 4. Removing a side through a command takes its units along

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use msdl_core::{
    apply, Command, CommandRelationshipType, MsdlError, RelationInstruction, RelationRequest,
    Superior,
};

#[test]
fn test_successful_commands_take_effect() {
    // GIVEN a loaded scenario
    let mut scenario = load_scenario();

    // WHEN a unit is added under HQ, given a tank and placed first
    let commands = vec![
        Command::AddUnit {
            object_handle: Some("third".to_string()),
            name: "3rd".to_string(),
            symbol_identifier: "SFGPUCI---D----".to_string(),
            superior: Some(Superior::Unit(HQ.to_string())),
        },
        Command::AddEquipmentItem {
            object_handle: Some("third-tank".to_string()),
            name: "Tank".to_string(),
            symbol_identifier: "SFGPEVATL------".to_string(),
            owner: Some("third".to_string()),
        },
        Command::SetItemRelation(RelationRequest::new(
            "third",
            FIRST,
            RelationInstruction::ReorderAbove,
        )),
        Command::AssignToFederate {
            federate: FEDERATE.to_string(),
            entity: "third".to_string(),
        },
    ];
    for cmd in commands {
        apply(&mut scenario, cmd).unwrap();
    }

    // THEN the graph and the document agree
    assert_eq!(
        scenario.get_unit_by_id(HQ).unwrap().subordinates(),
        &["third".to_string(), FIRST.to_string(), SECOND.to_string()]
    );
    assert_eq!(
        scenario.get_unit_by_id("third").unwrap().equipment(),
        &["third-tank".to_string()]
    );
    assert_eq!(scenario.federates_of("third").len(), 1);
    let reloaded = reload(&scenario);
    assert_eq!(reloaded.snapshot(), scenario.snapshot());
    reloaded.validate().unwrap();
}

#[test]
fn test_failing_commands_restore_the_scenario() {
    // GIVEN a loaded scenario
    let mut scenario = load_scenario();
    let before = scenario.to_xml();
    let snapshot = scenario.snapshot();

    // WHEN commands fail for different reasons
    let failures = vec![
        (
            Command::AddUnit {
                object_handle: Some(HQ.to_string()),
                name: "Copy".to_string(),
                symbol_identifier: "SFGPUCI---D----".to_string(),
                superior: None,
            },
            MsdlError::DuplicateHandle {
                handle: HQ.to_string(),
            },
        ),
        (
            Command::AddEquipmentItem {
                object_handle: Some("orphan".to_string()),
                name: "Orphan".to_string(),
                symbol_identifier: "SFGPE----------".to_string(),
                owner: Some("ghost".to_string()),
            },
            MsdlError::OwnerNotFound {
                handle: "ghost".to_string(),
            },
        ),
        (
            Command::SetUnitForceRelation {
                unit: ENEMY_HQ.to_string(),
                superior: E1.to_string(),
                relationship_type: Some(CommandRelationshipType::Opcon),
            },
            MsdlError::CycleDetected {
                handle: ENEMY_HQ.to_string(),
            },
        ),
        (
            Command::RemoveUnit {
                handle: TANK.to_string(),
            },
            MsdlError::UnitNotFound {
                handle: TANK.to_string(),
            },
        ),
        (
            Command::AssignToFederate {
                federate: "ghost".to_string(),
                entity: HQ.to_string(),
            },
            MsdlError::FederateNotFound {
                handle: "ghost".to_string(),
            },
        ),
    ];

    // THEN each returns its error and nothing changes
    for (cmd, expected) in failures {
        let op = cmd.op_name();
        assert_eq!(apply(&mut scenario, cmd).unwrap_err(), expected, "{op}");
        assert_eq!(scenario.to_xml(), before, "{op}");
    }
    assert_eq!(scenario.snapshot(), snapshot);
    assert!(scenario.get_equipment_by_id("orphan").is_none());
}

#[test]
fn test_commands_decode_from_json() {
    let mut scenario = load_scenario();
    let queue = format!(
        r#"[
            {{"command": "set_unit_force_relation", "unit": "{E1}", "superior": "{HQ}", "relationship_type": "TACON"}},
            {{"command": "remove_equipment_item", "handle": "{RADAR}"}},
            {{"command": "set_item_relation", "source": "{SECOND}", "target": "{FIRST}", "instruction": "reorder-above"}}
        ]"#
    );
    let commands: Vec<Command> = serde_json::from_str(&queue).unwrap();

    for cmd in commands {
        apply(&mut scenario, cmd).unwrap();
    }

    let e1 = scenario.get_unit_by_id(E1).unwrap();
    assert_eq!(
        e1.relationship_type(scenario.tree()),
        Some(CommandRelationshipType::Tacon)
    );
    assert!(scenario.get_equipment_by_id(RADAR).is_none());
    assert_eq!(
        scenario.get_unit_by_id(HQ).unwrap().subordinates(),
        &[SECOND.to_string(), FIRST.to_string(), E1.to_string()]
    );
}

#[test]
fn test_remove_force_side_command_cascades() {
    let mut scenario = load_scenario();

    apply(
        &mut scenario,
        Command::RemoveForceSide {
            handle: HOSTILE.to_string(),
        },
    )
    .unwrap();

    assert_eq!(scenario.sides().len(), 1);
    assert!(scenario.get_unit_by_id(ENEMY_HQ).is_none());
    assert!(scenario.get_unit_by_id(E1).is_none());
    scenario.validate().unwrap();
}
