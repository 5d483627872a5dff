use msdl_core::{MsdlEntity, Scenario, ScenarioConfig, Unit};

pub const SCENARIO_XML: &str = include_str!("../fixtures/scenario.xml");
pub const NETN_XML: &str = include_str!("../fixtures/netn.xml");

// Handles of the scenario fixture
#[allow(dead_code)]
pub const FRIENDLY: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000001";
#[allow(dead_code)]
pub const HOSTILE: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000002";
#[allow(dead_code)]
pub const FRIENDLY_RESERVE: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000003";
#[allow(dead_code)]
pub const HQ: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000011";
#[allow(dead_code)]
pub const FIRST: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000012";
#[allow(dead_code)]
pub const SECOND: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000013";
#[allow(dead_code)]
pub const ENEMY_HQ: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000021";
#[allow(dead_code)]
pub const E1: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000022";
#[allow(dead_code)]
pub const RECON: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000031";
#[allow(dead_code)]
pub const TANK: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000041";
#[allow(dead_code)]
pub const TRUCK: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000042";
#[allow(dead_code)]
pub const RADAR: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000043";
#[allow(dead_code)]
pub const FEDERATE: &str = "7d0c4a52-1d1e-4c35-9a6e-2b1f00000051";

/// Load the three-side example scenario
#[allow(dead_code)]
pub fn load_scenario() -> Scenario {
    Scenario::load(SCENARIO_XML).unwrap()
}

#[allow(dead_code)]
pub fn load_scenario_with(config: ScenarioConfig) -> Scenario {
    Scenario::load_with_config(SCENARIO_XML, config).unwrap()
}

/// Serialize, parse again and return the new scenario
#[allow(dead_code)]
pub fn reload(scenario: &Scenario) -> Scenario {
    Scenario::load_with_config(&scenario.to_xml(), scenario.config().clone()).unwrap()
}

/// Unit by its `Name`
#[allow(dead_code)]
pub fn unit_by_label<'a>(scenario: &'a Scenario, name: &str) -> &'a Unit {
    scenario
        .find_unit_by_name(name)
        .unwrap_or_else(|| panic!("no unit named {name}"))
}

/// Handles of a list of entities
#[allow(dead_code)]
pub fn handles<T: MsdlEntity>(entities: &[&T]) -> Vec<String> {
    entities
        .iter()
        .map(|e| e.object_handle().to_string())
        .collect()
}

/// Collapse whitespace between tags
#[allow(dead_code)]
pub fn normalize_whitespace(xml: &str) -> String {
    xml.split('>')
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(">")
}
