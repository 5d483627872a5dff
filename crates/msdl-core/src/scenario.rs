//! Scenario facade
//!
//! `Scenario` is the document-level entry point: load or create an MSDL
//! document, query its entities, mutate the three hierarchies and serialize
//! it again. Every mutation is logged with the canonical start/end events.

use std::time::Instant;

use chrono::Local;

use crate::config::ScenarioConfig;
use crate::errors::{MsdlError, Result};
use crate::model::{
    CommandRelationshipType, EntityRef, EquipmentItem, Federate, ForceSide, MsdlEntity, Options,
    ScenarioId, ScenarioIdModel, Superior, Unit,
};
use crate::ops::{
    equipment_ops, federate_ops, force_side_ops, relation_ops, unit_ops, RelationRequest, Store,
};
use crate::rules::validation;
use crate::snapshot::GraphSnapshot;
use crate::xml::XmlTree;
use crate::{log_op_end, log_op_error, log_op_start};

pub const MSDL_NAMESPACE: &str = "urn:sisostds:scenario:military:data:draft:msdl:1";
pub const MSDL_VERSION: &str = "1.0";
const ROOT_ELEMENT: &str = "MilitaryScenario";

/// A loaded MSDL scenario document
#[derive(Debug, Clone)]
pub struct Scenario {
    store: Store,
    scenario_id: Option<ScenarioId>,
    options: Option<Options>,
}

impl Scenario {
    /// Parse an MSDL document with the default configuration
    ///
    /// # Errors
    /// * `InvalidXml` - the text is not well-formed XML
    /// * `NotAScenario` - the root element is not `MilitaryScenario`
    pub fn load(xml: &str) -> Result<Self> {
        Self::load_with_config(xml, ScenarioConfig::default())
    }

    /// # Errors
    /// * `InvalidXml` - the text is not well-formed XML
    /// * `NotAScenario` - the root element is not `MilitaryScenario`
    pub fn load_with_config(xml: &str, config: ScenarioConfig) -> Result<Self> {
        log_op_start!("load", bytes = xml.len());
        let start = Instant::now();

        let result = Self::load_impl(xml, config);
        match &result {
            Ok(scenario) => {
                log_op_end!(
                    "load",
                    started = start,
                    unit_count = scenario.store.units.len(),
                    equipment_count = scenario.store.equipment.len(),
                    force_side_count = scenario.store.force_sides.len()
                );
            }
            Err(err) => {
                log_op_error!("load", err.clone(), started = start);
            }
        }
        result
    }

    fn load_impl(xml: &str, config: ScenarioConfig) -> Result<Self> {
        let tree = XmlTree::parse(xml)?;
        let root = tree.root_element().ok_or_else(|| MsdlError::InvalidXml {
            message: "document has no root element".to_string(),
        })?;
        if tree.local_name(root) != ROOT_ELEMENT {
            return Err(MsdlError::NotAScenario {
                root: tree.local_name(root).to_string(),
            });
        }

        let scenario_id = tree
            .first_child(root, "ScenarioID")
            .map(|node| ScenarioId::from_node(&tree, node));
        if scenario_id.is_none() {
            tracing::warn!("scenario has no ScenarioID");
        }
        let options = tree
            .first_child(root, "Options")
            .map(|node| Options::from_node(&tree, node));

        Ok(Self {
            store: Store::load(tree, root, config),
            scenario_id,
            options,
        })
    }

    /// Build an empty scenario from a `ScenarioID` model
    ///
    /// A missing `modification_date` is stamped with today's date.
    ///
    /// # Errors
    /// * `MissingScenarioId` - the model has an empty name
    pub fn create(model: ScenarioIdModel) -> Result<Self> {
        Self::create_with_config(model, ScenarioConfig::default())
    }

    /// # Errors
    /// * `MissingScenarioId` - the model has an empty name
    pub fn create_with_config(mut model: ScenarioIdModel, config: ScenarioConfig) -> Result<Self> {
        if model.name.trim().is_empty() {
            return Err(MsdlError::MissingScenarioId);
        }
        if model.modification_date.is_none() {
            model.modification_date = Some(Local::now().date_naive());
        }

        let mut tree = XmlTree::parse(&format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <{ROOT_ELEMENT} xmlns=\"{MSDL_NAMESPACE}\"></{ROOT_ELEMENT}>"
        ))?;
        let root = tree.root_element().ok_or_else(|| MsdlError::Internal {
            message: "scenario template has no root".to_string(),
        })?;

        let id_node = tree.ensure_child(root, "ScenarioID");
        let scenario_id = ScenarioId::write(&mut tree, id_node, &model);
        let options_node = tree.ensure_child(root, "Options");
        let mut options = Options::from_node(&tree, options_node);
        options.set_msdl_version(&mut tree, MSDL_VERSION);
        tree.ensure_child(root, "ForceSides");
        tree.ensure_path(root, &["Organizations", "Units"]);
        tree.ensure_path(root, &["Organizations", "Equipment"]);

        tracing::debug!(name = %model.name, "scenario created");
        Ok(Self {
            store: Store::load(tree, root, config),
            scenario_id: Some(scenario_id),
            options: Some(options),
        })
    }

    pub fn to_xml(&self) -> String {
        self.store.tree().to_xml_string()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn tree(&self) -> &XmlTree {
        self.store.tree()
    }

    pub fn config(&self) -> &ScenarioConfig {
        self.store.config()
    }

    pub fn scenario_id(&self) -> Option<&ScenarioId> {
        self.scenario_id.as_ref()
    }

    pub fn scenario_id_mut(&mut self) -> Option<(&mut ScenarioId, &mut XmlTree)> {
        let id = self.scenario_id.as_mut()?;
        Some((id, &mut self.store.tree))
    }

    pub fn options(&self) -> Option<&Options> {
        self.options.as_ref()
    }

    /// Whether the document uses NETN extension elements
    pub fn is_netn(&self) -> bool {
        let tree = self.store.tree();
        let root = self.store.scenario_root();
        tree.descendant(root, "OrganicRelation").is_some()
            || tree.descendant(root, "SymbolId-2525D").is_some()
    }

    // Queries

    pub fn units(&self) -> Vec<&Unit> {
        self.store.units_in_order()
    }

    pub fn equipment(&self) -> Vec<&EquipmentItem> {
        self.store.equipment_in_order()
    }

    pub fn force_sides(&self) -> Vec<&ForceSide> {
        self.store.force_sides_in_order()
    }

    pub fn federates(&self) -> Vec<&Federate> {
        self.store.federates_in_order()
    }

    pub fn get_unit_by_id(&self, handle: &str) -> Option<&Unit> {
        self.store.get_unit_by_id(handle)
    }

    pub fn get_equipment_by_id(&self, handle: &str) -> Option<&EquipmentItem> {
        self.store.get_equipment_by_id(handle)
    }

    pub fn get_force_side_by_id(&self, handle: &str) -> Option<&ForceSide> {
        self.store.get_force_side_by_id(handle)
    }

    pub fn get_federate_by_id(&self, handle: &str) -> Option<&Federate> {
        self.store.get_federate_by_id(handle)
    }

    pub fn get_unit_or_force_side_by_id(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.store.get_unit_or_force_side_by_id(handle)
    }

    pub fn get_unit_or_equipment_by_id(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.store.get_unit_or_equipment_by_id(handle)
    }

    pub fn get_item_parent(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.store.get_item_parent(handle)
    }

    /// Root units of every side and force
    pub fn root_units(&self) -> Vec<&Unit> {
        force_side_ops::root_units(&self.store)
    }

    pub fn sides(&self) -> Vec<&ForceSide> {
        force_side_ops::sides(&self.store)
    }

    pub fn primary_side(&self) -> Option<&ForceSide> {
        self.store.primary_side()
    }

    pub fn side_of(&self, handle: &str) -> Option<&ForceSide> {
        force_side_ops::side_of(&self.store, handle)
    }

    pub fn find_unit_by_name(&self, name: &str) -> Option<&Unit> {
        unit_ops::find_unit_by_name(&self.store, name)
    }

    pub fn federates_of(&self, handle: &str) -> Vec<&Federate> {
        federate_ops::federates_of(&self.store, handle)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.store)
    }

    /// # Errors
    /// Returns the first broken graph invariant.
    pub fn validate(&self) -> Result<()> {
        validation::validate_graph(&self.store)
    }

    // Field access

    /// # Errors
    /// * `UnitNotFound` - handle does not name a Unit
    pub fn unit_mut(&mut self, handle: &str) -> Result<(&mut Unit, &mut XmlTree)> {
        self.store.unit_mut(handle)
    }

    /// # Errors
    /// * `EquipmentNotFound` - handle does not name an EquipmentItem
    pub fn equipment_mut(&mut self, handle: &str) -> Result<(&mut EquipmentItem, &mut XmlTree)> {
        self.store.equipment_mut(handle)
    }

    /// # Errors
    /// * `ForceSideNotFound` - handle does not name a ForceSide
    pub fn force_side_mut(&mut self, handle: &str) -> Result<(&mut ForceSide, &mut XmlTree)> {
        self.store.force_side_mut(handle)
    }

    // Factories: detached entities with fresh handles, attached by add_*

    pub fn create_unit(&mut self, name: &str, symbol_identifier: &str) -> Unit {
        Unit::create(&mut self.store.tree, name, symbol_identifier)
    }

    pub fn create_equipment_item(&mut self, name: &str, symbol_identifier: &str) -> EquipmentItem {
        EquipmentItem::create(&mut self.store.tree, name, symbol_identifier)
    }

    pub fn create_force_side(&mut self, name: &str) -> ForceSide {
        ForceSide::create(&mut self.store.tree, name)
    }

    pub fn create_federate(&mut self, name: &str) -> Federate {
        Federate::create(&mut self.store.tree, name)
    }

    // Mutations

    fn logged<T>(
        &mut self,
        op: &'static str,
        start: Instant,
        mutation: impl FnOnce(&mut Store) -> Result<T>,
    ) -> Result<T> {
        let result = mutation(&mut self.store);
        match &result {
            Ok(_) => log_op_end!(op, started = start),
            Err(err) => log_op_error!(op, err.clone(), started = start),
        }
        result
    }

    /// Reparent or reorder a Unit or EquipmentItem
    ///
    /// # Errors
    /// See [`relation_ops::set_item_relation`].
    pub fn set_item_relation(&mut self, request: &RelationRequest) -> Result<()> {
        log_op_start!(
            "set_item_relation",
            source_handle = %request.source,
            target_handle = %request.target,
            instruction = request.instruction.as_str()
        );
        let start = Instant::now();
        self.logged("set_item_relation", start, |store| {
            relation_ops::set_item_relation(store, request)
        })
    }

    /// # Errors
    /// See [`relation_ops::set_unit_force_relation`].
    pub fn set_unit_force_relation(
        &mut self,
        unit: &str,
        superior: &str,
        relationship_type: Option<CommandRelationshipType>,
    ) -> Result<()> {
        log_op_start!(
            "set_unit_force_relation",
            source_handle = %unit,
            target_handle = %superior
        );
        let start = Instant::now();
        self.logged("set_unit_force_relation", start, |store| {
            relation_ops::set_unit_force_relation(store, unit, superior, relationship_type)
        })
    }

    /// # Errors
    /// See [`unit_ops::add_unit`].
    pub fn add_unit(&mut self, unit: Unit, superior: Option<Superior>) -> Result<()> {
        log_op_start!("add_unit", object_handle = %unit.object_handle());
        let start = Instant::now();
        self.logged("add_unit", start, |store| {
            unit_ops::add_unit(store, unit, superior)
        })
    }

    /// # Errors
    /// See [`equipment_ops::add_equipment_item`].
    pub fn add_equipment_item(&mut self, item: EquipmentItem, owner: Option<&str>) -> Result<()> {
        log_op_start!("add_equipment_item", object_handle = %item.object_handle());
        let start = Instant::now();
        self.logged("add_equipment_item", start, |store| {
            equipment_ops::add_equipment_item(store, item, owner)
        })
    }

    /// # Errors
    /// See [`force_side_ops::add_force_side`].
    pub fn add_force_side(&mut self, side: ForceSide, allegiance: Option<&str>) -> Result<()> {
        log_op_start!("add_force_side", object_handle = %side.object_handle());
        let start = Instant::now();
        self.logged("add_force_side", start, |store| {
            force_side_ops::add_force_side(store, side, allegiance)
        })
    }

    /// # Errors
    /// See [`federate_ops::add_federate`].
    pub fn add_federate(&mut self, federate: Federate) -> Result<()> {
        log_op_start!("add_federate", object_handle = %federate.object_handle());
        let start = Instant::now();
        self.logged("add_federate", start, |store| {
            federate_ops::add_federate(store, federate)
        })
    }

    /// # Errors
    /// See [`unit_ops::remove_unit`].
    pub fn remove_unit(&mut self, handle: &str) -> Result<()> {
        log_op_start!("remove_unit", object_handle = %handle);
        let start = Instant::now();
        self.logged("remove_unit", start, |store| unit_ops::remove_unit(store, handle))
    }

    /// # Errors
    /// See [`equipment_ops::remove_equipment_item`].
    pub fn remove_equipment_item(&mut self, handle: &str) -> Result<()> {
        log_op_start!("remove_equipment_item", object_handle = %handle);
        let start = Instant::now();
        self.logged("remove_equipment_item", start, |store| {
            equipment_ops::remove_equipment_item(store, handle)
        })
    }

    /// # Errors
    /// See [`force_side_ops::remove_force_side`].
    pub fn remove_force_side(&mut self, handle: &str) -> Result<()> {
        log_op_start!("remove_force_side", object_handle = %handle);
        let start = Instant::now();
        self.logged("remove_force_side", start, |store| {
            force_side_ops::remove_force_side(store, handle)
        })
    }

    /// # Errors
    /// See [`federate_ops::remove_federate`].
    pub fn remove_federate(&mut self, handle: &str) -> Result<()> {
        log_op_start!("remove_federate", object_handle = %handle);
        let start = Instant::now();
        self.logged("remove_federate", start, |store| {
            federate_ops::remove_federate(store, handle)
        })
    }

    /// # Errors
    /// See [`federate_ops::assign_to_federate`].
    pub fn assign_to_federate(&mut self, federate: &str, entity: &str) -> Result<()> {
        log_op_start!(
            "assign_to_federate",
            object_handle = %federate,
            target_handle = %entity
        );
        let start = Instant::now();
        self.logged("assign_to_federate", start, |store| {
            federate_ops::assign_to_federate(store, federate, entity)
        })
    }

    /// # Errors
    /// See [`force_side_ops::set_primary_side`].
    pub fn set_primary_side(&mut self, handle: &str) -> Result<()> {
        log_op_start!("set_primary_side", object_handle = %handle);
        let start = Instant::now();
        self.logged("set_primary_side", start, |store| {
            force_side_ops::set_primary_side(store, handle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str) -> ScenarioIdModel {
        ScenarioIdModel {
            name: name.to_string(),
            ..ScenarioIdModel::default()
        }
    }

    #[test]
    fn test_load_rejects_other_documents() {
        assert!(matches!(
            Scenario::load("<Order/>"),
            Err(MsdlError::NotAScenario { root }) if root == "Order"
        ));
        assert!(matches!(
            Scenario::load("<MilitaryScenario><Unit></MilitaryScenario>"),
            Err(MsdlError::InvalidXml { .. })
        ));
    }

    #[test]
    fn test_create_requires_a_name_and_stamps_the_date() {
        assert_eq!(
            Scenario::create(model("  ")).err(),
            Some(MsdlError::MissingScenarioId)
        );

        let scenario = Scenario::create(model("Exercise")).unwrap();
        let id = scenario.scenario_id().unwrap();
        assert_eq!(id.name(scenario.tree()).as_deref(), Some("Exercise"));
        assert_eq!(
            id.modification_date(scenario.tree()),
            Some(Local::now().date_naive())
        );
        let xml = scenario.to_xml();
        assert!(xml.contains(MSDL_NAMESPACE));
        assert!(xml.contains("<MSDLVersion>1.0</MSDLVersion>"));
        assert!(!scenario.is_netn());
    }

    #[test]
    fn test_created_scenario_accepts_entities() {
        let mut scenario = Scenario::create(model("Exercise")).unwrap();
        let side = scenario.create_force_side("Friendly");
        let side_handle = side.object_handle().to_string();
        scenario.add_force_side(side, None).unwrap();
        assert_eq!(
            scenario.primary_side().map(|s| s.object_handle()),
            Some(side_handle.as_str())
        );

        let hq = scenario.create_unit("HQ", "SFGPU------");
        let hq_handle = hq.object_handle().to_string();
        scenario.add_unit(hq, None).unwrap();
        let tank = scenario.create_equipment_item("Tank", "SFGPE------");
        scenario.add_equipment_item(tank, Some(&hq_handle)).unwrap();

        assert_eq!(scenario.root_units().len(), 1);
        assert_eq!(
            scenario.side_of(&hq_handle).map(|s| s.object_handle()),
            Some(side_handle.as_str())
        );
        scenario.validate().unwrap();

        let reloaded = Scenario::load(&scenario.to_xml()).unwrap();
        assert_eq!(reloaded.snapshot(), scenario.snapshot());
    }
}
