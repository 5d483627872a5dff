//! Round Trip Tests
//!
//! Serializing a scenario and loading the output again.
//!
//! ## Scenarios Covered
//!
//! 1. An unmodified document is written back byte for byte
//! 2. A mutated scenario reloads into the same graph
//! 3. Prefixed (NETN) documents keep their prefix on new elements
//! 4. Created scenarios reload with their header intact
//! 5. Entities added to a prefixed document are written in its namespace
//! 6. Entities built for another document are rejected before touching XML

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use msdl_core::{
    MsdlEntity, MsdlError, RelationInstruction, RelationRequest, Scenario, ScenarioIdModel,
    Superior, Symbolized, StandardIdentity,
};

const NETN_SUPPLY: &str = "c3f1e2d0-0000-4000-8000-000000000011";
const NETN_BLUE: &str = "c3f1e2d0-0000-4000-8000-000000000001";

/// Element tags written without the `msdl:` prefix
fn unprefixed_tags(xml: &str) -> Vec<String> {
    xml.split('<')
        .skip(1)
        .filter(|tag| !tag.starts_with(|c: char| c == '?' || c == '!'))
        .map(|tag| tag.trim_start_matches('/'))
        .filter(|tag| !tag.starts_with("msdl:"))
        .map(|tag| tag.chars().take_while(|c| c.is_alphanumeric()).collect())
        .collect()
}

#[test]
fn test_unmodified_document_is_reproduced_exactly() {
    // GIVEN a loaded scenario
    let scenario = load_scenario();

    // WHEN it is serialized without changes
    // THEN the output is the input
    assert_eq!(scenario.to_xml(), SCENARIO_XML);

    let netn = Scenario::load(NETN_XML).unwrap();
    assert_eq!(netn.to_xml(), NETN_XML);
}

#[test]
fn test_mutated_scenario_reloads_into_the_same_graph() {
    // GIVEN a scenario with reparented, reordered and removed entities
    let mut scenario = load_scenario();
    scenario
        .set_item_relation(&RelationRequest::make_child(E1, HQ))
        .unwrap();
    scenario
        .set_item_relation(&RelationRequest::new(
            SECOND,
            FIRST,
            RelationInstruction::ReorderAbove,
        ))
        .unwrap();
    scenario
        .set_item_relation(&RelationRequest::make_child(TRUCK, FRIENDLY))
        .unwrap();
    scenario.remove_equipment_item(RADAR).unwrap();
    let digest = scenario.snapshot().digest().unwrap();

    // WHEN it is written and loaded again
    let reloaded = reload(&scenario);

    // THEN both graphs are identical
    assert_eq!(reloaded.snapshot(), scenario.snapshot());
    assert_eq!(reloaded.snapshot().digest().unwrap(), digest);
    assert_eq!(
        reloaded.get_unit_by_id(HQ).unwrap().subordinates(),
        &[SECOND.to_string(), FIRST.to_string(), E1.to_string()]
    );
    reloaded.validate().unwrap();
}

#[test]
fn test_new_entities_survive_a_round_trip() {
    let mut scenario = load_scenario();
    let unit = scenario.create_unit("3rd", "SFGPUCI---D----");
    let handle = unit.object_handle().to_string();
    scenario
        .add_unit(unit, Some(Superior::Unit(HQ.to_string())))
        .unwrap();
    let item = scenario.create_equipment_item("Mortar", "SFGPEWM--------");
    let item_handle = item.object_handle().to_string();
    scenario.add_equipment_item(item, Some(&handle)).unwrap();

    let reloaded = reload(&scenario);

    let unit = reloaded.get_unit_by_id(&handle).unwrap();
    assert_eq!(unit.name(reloaded.tree()).as_deref(), Some("3rd"));
    assert_eq!(unit.equipment(), &[item_handle]);
    assert_eq!(reloaded.snapshot(), scenario.snapshot());
}

#[test]
fn test_prefixed_document_keeps_its_prefix() {
    // GIVEN a document with every element in the msdl: prefix
    let mut netn = Scenario::load(NETN_XML).unwrap();
    let fuel = netn.find_unit_by_name("Fuel Coy").unwrap();
    let fuel_handle = fuel.object_handle().to_string();

    // WHEN a field that did not exist is written
    {
        let (unit, tree) = netn.unit_mut(&fuel_handle).unwrap();
        unit.set_identity(tree, StandardIdentity::Neutral);
        unit.symbol_modifiers_mut(tree).set_echelon(tree, "COMPANY");
    }

    // THEN the new wrapper elements inherit the prefix
    let xml = netn.to_xml();
    assert!(xml.contains("<msdl:UnitSymbolModifiers>"));
    assert!(xml.contains("<msdl:Echelon>COMPANY</msdl:Echelon>"));
    assert!(xml.contains("<msdl:SymbolIdentifier>SNGPUSS---D----</msdl:SymbolIdentifier>"));

    let reloaded = reload(&netn);
    let fuel = reloaded.get_unit_by_id(&fuel_handle).unwrap();
    assert_eq!(
        fuel.symbol_modifiers()
            .and_then(|m| m.echelon(reloaded.tree())),
        Some("COMPANY".to_string())
    );
    assert_eq!(reloaded.snapshot(), netn.snapshot());
}

#[test]
fn test_created_scenario_reloads() {
    let mut scenario = Scenario::create(ScenarioIdModel {
        name: "Night Drop".to_string(),
        description: Some("Airborne <insertion> & link-up".to_string()),
        ..ScenarioIdModel::default()
    })
    .unwrap();
    let side = scenario.create_force_side("Blue");
    scenario.add_force_side(side, None).unwrap();
    let unit = scenario.create_unit("Pathfinders", "SFGPUCIA-------");
    scenario.add_unit(unit, None).unwrap();

    let reloaded = reload(&scenario);

    let id = reloaded.scenario_id().unwrap();
    assert_eq!(id.name(reloaded.tree()).as_deref(), Some("Night Drop"));
    assert_eq!(
        id.description(reloaded.tree()).as_deref(),
        Some("Airborne <insertion> & link-up")
    );
    assert_eq!(reloaded.root_units().len(), 1);
    assert_eq!(reloaded.snapshot(), scenario.snapshot());
}

#[test]
fn test_entities_added_to_prefixed_document_take_its_prefix() {
    // GIVEN the msdl:-prefixed NETN document
    let mut netn = Scenario::load(NETN_XML).unwrap();
    assert!(unprefixed_tags(NETN_XML).is_empty());

    // WHEN one entity of every kind is added
    let unit = netn.create_unit("Water Pt", "SFGPUSS---C----");
    let unit_handle = unit.object_handle().to_string();
    netn.add_unit(unit, Some(Superior::Unit(NETN_SUPPLY.to_string())))
        .unwrap();
    let item = netn.create_equipment_item("Pump", "SFGPE----------");
    netn.add_equipment_item(item, Some(&unit_handle)).unwrap();
    let force = netn.create_force_side("Blue Logistics");
    netn.add_force_side(force, Some(NETN_BLUE)).unwrap();
    let federate = netn.create_federate("LogSim");
    let federate_handle = federate.object_handle().to_string();
    netn.add_federate(federate).unwrap();
    netn.assign_to_federate(&federate_handle, &unit_handle)
        .unwrap();

    // THEN every element of the document is still in the msdl: namespace
    let xml = netn.to_xml();
    assert_eq!(unprefixed_tags(&xml), Vec::<String>::new());
    assert!(xml.contains(&format!(
        "<msdl:Unit><msdl:ObjectHandle>{unit_handle}</msdl:ObjectHandle>"
    )));
    assert!(xml.contains("<msdl:Deployment><msdl:Federate>"));

    let reloaded = reload(&netn);
    assert_eq!(reloaded.snapshot(), netn.snapshot());
    assert_eq!(
        reloaded.get_unit_by_id(NETN_SUPPLY).unwrap().subordinates().len(),
        2
    );
    reloaded.validate().unwrap();
}

#[test]
fn test_entity_from_another_scenario_is_rejected() {
    // GIVEN two scenarios loaded from the same document
    let mut source = load_scenario();
    let mut target = load_scenario();

    // WHEN an entity built on one is added to the other
    let unit = source.create_unit("Foreign", "SFGPUCI---D----");
    let unit_handle = unit.object_handle().to_string();
    let item = source.create_equipment_item("Foreign Tank", "SFGPEVATL------");
    let federate = source.create_federate("Foreign Sim");

    // THEN each add fails and the target document is untouched
    assert!(matches!(
        target.add_unit(unit, None),
        Err(MsdlError::ForeignEntity { handle, .. }) if handle == unit_handle
    ));
    assert!(matches!(
        target.add_equipment_item(item, Some(HQ)),
        Err(MsdlError::ForeignEntity { .. })
    ));
    assert!(matches!(
        target.add_federate(federate),
        Err(MsdlError::ForeignEntity { .. })
    ));
    assert_eq!(target.to_xml(), SCENARIO_XML);
    assert_eq!(target.units().len(), 6);
    assert!(target.get_unit_by_id(&unit_handle).is_none());
    target.validate().unwrap();
}

#[test]
fn test_entity_from_a_clone_is_rejected() {
    // GIVEN a scenario and a clone, each with a freshly built unit
    let mut scenario = load_scenario();
    let mut twin = scenario.clone();
    let own = scenario.create_unit("Own", "SFGPUCI---D----");
    let twin_unit = twin.create_unit("Twin", "SFGPUCI---D----");
    let twin_handle = twin_unit.object_handle().to_string();

    // WHEN the clone's unit is added to the original
    let result = scenario.add_unit(twin_unit, None);

    // THEN it is rejected even though both nodes sit at the same index
    assert!(matches!(
        result,
        Err(MsdlError::ForeignEntity { handle, .. }) if handle == twin_handle
    ));
    assert_eq!(scenario.to_xml(), SCENARIO_XML);

    let own_handle = own.object_handle().to_string();
    scenario.add_unit(own, None).unwrap();
    assert!(scenario.get_unit_by_id(&own_handle).is_some());
}
