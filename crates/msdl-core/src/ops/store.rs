use std::collections::HashMap;

use crate::config::ScenarioConfig;
use crate::errors::{MsdlError, Result};
use crate::model::{
    EntityKind, EntityRef, EquipmentItem, Federate, ForceSide, MsdlEntity, Superior, Unit,
};
use crate::xml::{NodeId, XmlTree};

pub(crate) const UNITS_PATH: &[&str] = &["Organizations", "Units"];
pub(crate) const EQUIPMENT_PATH: &[&str] = &["Organizations", "Equipment"];
pub(crate) const FORCE_SIDES_PATH: &[&str] = &["ForceSides"];
pub(crate) const DEPLOYMENT_PATH: &[&str] = &["Deployment"];

/// Identifier indices over one scenario document
///
/// The store owns the XML arena. Entities hold node ids into it, and the
/// ordered child lists on units and force sides are the inverse of the
/// superior/owner handles stored in the document. Not thread-safe; callers
/// serialize access.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) tree: XmlTree,
    pub(crate) scenario_root: NodeId,
    pub(crate) units: HashMap<String, Unit>,
    pub(crate) equipment: HashMap<String, EquipmentItem>,
    pub(crate) force_sides: HashMap<String, ForceSide>,
    pub(crate) federates: HashMap<String, Federate>,
    pub(crate) primary_side: Option<String>,
    pub(crate) config: ScenarioConfig,
}

impl Store {
    /// Index every entity below `scenario_root` and derive the child lists
    ///
    /// Entities without an `ObjectHandle`, duplicate handles and relations
    /// to unknown handles are logged and skipped.
    pub fn load(tree: XmlTree, scenario_root: NodeId, config: ScenarioConfig) -> Self {
        let mut store = Self {
            tree,
            scenario_root,
            units: HashMap::new(),
            equipment: HashMap::new(),
            force_sides: HashMap::new(),
            federates: HashMap::new(),
            primary_side: None,
            config,
        };
        store.index_entities();
        store.link_children();
        store.primary_side = store
            .force_sides_in_order()
            .into_iter()
            .find(|side| side.is_side(&store.tree))
            .map(|side| side.object_handle().to_string());
        store
    }

    fn index_entities(&mut self) {
        let root = self.scenario_root;
        for node in self.container_children(root, FORCE_SIDES_PATH, "ForceSide") {
            if let Some(side) = ForceSide::from_node(&self.tree, node) {
                let handle = side.object_handle().to_string();
                if self.is_known(&handle) {
                    tracing::warn!(object_handle = %handle, "duplicate ObjectHandle, skipping ForceSide");
                    continue;
                }
                self.force_sides.insert(handle, side);
            } else {
                tracing::warn!(node = %node, "ForceSide without ObjectHandle");
            }
        }
        for node in self.container_children(root, UNITS_PATH, "Unit") {
            if let Some(unit) = Unit::from_node(&self.tree, node) {
                let handle = unit.object_handle().to_string();
                if self.is_known(&handle) {
                    tracing::warn!(object_handle = %handle, "duplicate ObjectHandle, skipping Unit");
                    continue;
                }
                self.units.insert(handle, unit);
            } else {
                tracing::warn!(node = %node, "Unit without ObjectHandle");
            }
        }
        for node in self.container_children(root, EQUIPMENT_PATH, "EquipmentItem") {
            if let Some(item) = EquipmentItem::from_node(&self.tree, node) {
                let handle = item.object_handle().to_string();
                if self.is_known(&handle) {
                    tracing::warn!(object_handle = %handle, "duplicate ObjectHandle, skipping EquipmentItem");
                    continue;
                }
                self.equipment.insert(handle, item);
            } else {
                tracing::warn!(node = %node, "EquipmentItem without ObjectHandle");
            }
        }
        for node in self.container_children(root, DEPLOYMENT_PATH, "Federate") {
            if let Some(federate) = Federate::from_node(&self.tree, node) {
                self.federates
                    .insert(federate.object_handle().to_string(), federate);
            }
        }
    }

    /// Rebuild every ordered child list from document order
    pub(crate) fn link_children(&mut self) {
        for unit in self.units.values_mut() {
            unit.subordinates.clear();
            unit.equipment.clear();
        }
        for side in self.force_sides.values_mut() {
            side.root_units.clear();
            side.equipment.clear();
            side.forces.clear();
        }

        let unit_edges: Vec<(String, Option<Superior>)> = self
            .units_in_order()
            .into_iter()
            .map(|u| (u.object_handle().to_string(), u.superior(&self.tree)))
            .collect();
        for (handle, superior) in unit_edges {
            let Some(superior) = superior else {
                tracing::warn!(object_handle = %handle, "Unit has no superior");
                continue;
            };
            match self.child_list_mut(&superior, EntityKind::Unit) {
                Some(list) => list.push(handle),
                None => {
                    tracing::warn!(object_handle = %handle, superior = %superior, "unresolved Unit superior")
                }
            }
        }

        let equipment_edges: Vec<(String, Option<Superior>)> = self
            .equipment_in_order()
            .into_iter()
            .map(|e| (e.object_handle().to_string(), e.owner(&self.tree)))
            .collect();
        for (handle, owner) in equipment_edges {
            let Some(owner) = owner else {
                tracing::warn!(object_handle = %handle, "EquipmentItem has no owner");
                continue;
            };
            match self.child_list_mut(&owner, EntityKind::EquipmentItem) {
                Some(list) => list.push(handle),
                None => {
                    tracing::warn!(object_handle = %handle, owner = %owner, "unresolved EquipmentItem owner")
                }
            }
        }

        let force_edges: Vec<(String, String)> = self
            .force_sides_in_order()
            .into_iter()
            .filter_map(|f| {
                let parent = f.parent_side_handle(&self.tree)?;
                Some((f.object_handle().to_string(), parent))
            })
            .collect();
        for (handle, parent) in force_edges {
            match self.force_sides.get_mut(&parent) {
                Some(side) => side.forces.push(handle),
                None => tracing::warn!(object_handle = %handle, allegiance = %parent, "unresolved AllegianceHandle"),
            }
        }
    }

    fn container_children(&self, root: NodeId, path: &[&str], name: &str) -> Vec<NodeId> {
        self.tree
            .find_path(root, path)
            .map(|container| self.tree.children_named(container, name))
            .unwrap_or_default()
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn scenario_root(&self) -> NodeId {
        self.scenario_root
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Whether any Unit, EquipmentItem, ForceSide or Federate uses `handle`
    pub fn is_known(&self, handle: &str) -> bool {
        self.kind_of(handle).is_some() || self.federates.contains_key(handle)
    }

    pub fn kind_of(&self, handle: &str) -> Option<EntityKind> {
        if self.units.contains_key(handle) {
            Some(EntityKind::Unit)
        } else if self.equipment.contains_key(handle) {
            Some(EntityKind::EquipmentItem)
        } else if self.force_sides.contains_key(handle) {
            Some(EntityKind::ForceSide)
        } else {
            None
        }
    }

    pub fn get_unit_by_id(&self, handle: &str) -> Option<&Unit> {
        self.units.get(handle)
    }

    pub fn get_equipment_by_id(&self, handle: &str) -> Option<&EquipmentItem> {
        self.equipment.get(handle)
    }

    pub fn get_force_side_by_id(&self, handle: &str) -> Option<&ForceSide> {
        self.force_sides.get(handle)
    }

    pub fn get_federate_by_id(&self, handle: &str) -> Option<&Federate> {
        self.federates.get(handle)
    }

    pub fn get_unit_or_force_side_by_id(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.units
            .get(handle)
            .map(EntityRef::Unit)
            .or_else(|| self.force_sides.get(handle).map(EntityRef::ForceSide))
    }

    pub fn get_unit_or_equipment_by_id(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.units
            .get(handle)
            .map(EntityRef::Unit)
            .or_else(|| self.equipment.get(handle).map(EntityRef::EquipmentItem))
    }

    /// Any hierarchy entity
    pub fn get_entity(&self, handle: &str) -> Option<EntityRef<'_>> {
        self.get_unit_or_equipment_by_id(handle)
            .or_else(|| self.force_sides.get(handle).map(EntityRef::ForceSide))
    }

    /// Superior of a Unit, owner of an EquipmentItem, or side of a force
    pub fn get_item_parent(&self, handle: &str) -> Option<EntityRef<'_>> {
        match self.get_entity(handle)? {
            EntityRef::Unit(unit) => self.resolve_superior(&unit.superior(&self.tree)?),
            EntityRef::EquipmentItem(item) => self.resolve_superior(&item.owner(&self.tree)?),
            EntityRef::ForceSide(side) => {
                let parent = side.parent_side_handle(&self.tree)?;
                self.force_sides.get(&parent).map(EntityRef::ForceSide)
            }
        }
    }

    /// Entity named by a superior handle, if it exists with the expected kind
    pub fn resolve_superior(&self, superior: &Superior) -> Option<EntityRef<'_>> {
        match superior {
            Superior::Unit(handle) => self.units.get(handle).map(EntityRef::Unit),
            Superior::ForceSide(handle) => self.force_sides.get(handle).map(EntityRef::ForceSide),
        }
    }

    /// Superior (units) or owner (equipment) as recorded in the document
    pub fn superior_of(&self, handle: &str) -> Option<Superior> {
        match self.get_unit_or_equipment_by_id(handle)? {
            EntityRef::Unit(unit) => unit.superior(&self.tree),
            EntityRef::EquipmentItem(item) => item.owner(&self.tree),
            EntityRef::ForceSide(_) => None,
        }
    }

    /// Ordered list holding children of `kind` under `superior`
    pub(crate) fn child_list(&self, superior: &Superior, kind: EntityKind) -> Option<&Vec<String>> {
        match (superior, kind) {
            (Superior::Unit(h), EntityKind::Unit) => self.units.get(h).map(|u| &u.subordinates),
            (Superior::Unit(h), EntityKind::EquipmentItem) => {
                self.units.get(h).map(|u| &u.equipment)
            }
            (Superior::ForceSide(h), EntityKind::Unit) => {
                self.force_sides.get(h).map(|s| &s.root_units)
            }
            (Superior::ForceSide(h), EntityKind::EquipmentItem) => {
                self.force_sides.get(h).map(|s| &s.equipment)
            }
            (_, EntityKind::ForceSide) => None,
        }
    }

    pub(crate) fn child_list_mut(
        &mut self,
        superior: &Superior,
        kind: EntityKind,
    ) -> Option<&mut Vec<String>> {
        match (superior, kind) {
            (Superior::Unit(h), EntityKind::Unit) => {
                self.units.get_mut(h).map(|u| &mut u.subordinates)
            }
            (Superior::Unit(h), EntityKind::EquipmentItem) => {
                self.units.get_mut(h).map(|u| &mut u.equipment)
            }
            (Superior::ForceSide(h), EntityKind::Unit) => {
                self.force_sides.get_mut(h).map(|s| &mut s.root_units)
            }
            (Superior::ForceSide(h), EntityKind::EquipmentItem) => {
                self.force_sides.get_mut(h).map(|s| &mut s.equipment)
            }
            (_, EntityKind::ForceSide) => None,
        }
    }

    /// Backing node of any indexed entity or federate
    pub fn node_of(&self, handle: &str) -> Option<NodeId> {
        self.get_entity(handle)
            .map(|e| e.node())
            .or_else(|| self.federates.get(handle).map(|f| f.node()))
    }

    pub(crate) fn require_node(&self, handle: &str) -> Result<NodeId> {
        self.node_of(handle).ok_or_else(|| MsdlError::Internal {
            message: format!("no node indexed for {handle}"),
        })
    }

    fn ordered<'a, T: MsdlEntity>(
        &'a self,
        path: &[&str],
        name: &str,
        index: &'a HashMap<String, T>,
    ) -> Vec<&'a T> {
        self.container_children(self.scenario_root, path, name)
            .into_iter()
            .filter_map(|node| {
                let handle = self.tree.path_text(node, &["ObjectHandle"])?;
                index.get(handle).filter(|entity| entity.node() == node)
            })
            .collect()
    }

    /// Indexed units in document order
    pub fn units_in_order(&self) -> Vec<&Unit> {
        self.ordered(UNITS_PATH, "Unit", &self.units)
    }

    pub fn equipment_in_order(&self) -> Vec<&EquipmentItem> {
        self.ordered(EQUIPMENT_PATH, "EquipmentItem", &self.equipment)
    }

    pub fn force_sides_in_order(&self) -> Vec<&ForceSide> {
        self.ordered(FORCE_SIDES_PATH, "ForceSide", &self.force_sides)
    }

    pub fn federates_in_order(&self) -> Vec<&Federate> {
        self.ordered(DEPLOYMENT_PATH, "Federate", &self.federates)
    }

    pub fn primary_side(&self) -> Option<&ForceSide> {
        self.primary_side
            .as_deref()
            .and_then(|h| self.force_sides.get(h))
    }

    /// Get-or-create a collection container below the scenario root
    pub(crate) fn container(&mut self, path: &[&str]) -> NodeId {
        self.tree.ensure_path(self.scenario_root, path)
    }

    /// Reject an entity whose node cannot be added to this document
    ///
    /// The node must have been allocated by this tree, be a detached
    /// `<element_name>` element, and carry `handle` as its ObjectHandle.
    pub(crate) fn check_new_entity(
        &self,
        node: NodeId,
        element_name: &str,
        handle: &str,
    ) -> Result<()> {
        let reason = if !self.tree.contains(node) {
            "node was created in another document"
        } else if self.tree.local_name(node) != element_name {
            "node has the wrong element name"
        } else if self.tree.parent(node).is_some() {
            "node is already placed in the document"
        } else if self.tree.path_text(node, &["ObjectHandle"]) != Some(handle) {
            "node carries a different ObjectHandle"
        } else {
            return Ok(());
        };
        Err(MsdlError::ForeignEntity {
            handle: handle.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Append a new entity node to the container at `path`
    ///
    /// Unprefixed elements of the entity take the container's namespace
    /// prefix, so `msdl:`-prefixed documents stay in one namespace.
    pub(crate) fn attach_new(&mut self, path: &[&str], node: NodeId) {
        let container = self.container(path);
        self.tree.append_child(container, node);
        self.tree.adopt_prefix(node, container);
    }

    /// Unit and the tree it lives in, borrowed mutably together
    pub fn unit_mut(&mut self, handle: &str) -> Result<(&mut Unit, &mut XmlTree)> {
        let unit = self
            .units
            .get_mut(handle)
            .ok_or_else(|| MsdlError::UnitNotFound {
                handle: handle.to_string(),
            })?;
        Ok((unit, &mut self.tree))
    }

    pub fn equipment_mut(&mut self, handle: &str) -> Result<(&mut EquipmentItem, &mut XmlTree)> {
        let item = self
            .equipment
            .get_mut(handle)
            .ok_or_else(|| MsdlError::EquipmentNotFound {
                handle: handle.to_string(),
            })?;
        Ok((item, &mut self.tree))
    }

    pub fn force_side_mut(&mut self, handle: &str) -> Result<(&mut ForceSide, &mut XmlTree)> {
        let side = self
            .force_sides
            .get_mut(handle)
            .ok_or_else(|| MsdlError::ForceSideNotFound {
                handle: handle.to_string(),
            })?;
        Ok((side, &mut self.tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<MilitaryScenario>
  <ForceSides>
    <ForceSide><ObjectHandle>blue</ObjectHandle><ForceSideName>Blue</ForceSideName><AllegianceHandle>blue</AllegianceHandle></ForceSide>
    <ForceSide><ObjectHandle>blue-f</ObjectHandle><ForceSideName>Blue force</ForceSideName><AllegianceHandle>blue</AllegianceHandle></ForceSide>
  </ForceSides>
  <Organizations>
    <Units>
      <Unit><ObjectHandle>b</ObjectHandle><Relations><ForceRelation><ForceRelationChoice>UNIT</ForceRelationChoice><ForceRelationData><CommandRelation><CommandingSuperiorHandle>hq</CommandingSuperiorHandle><CommandRelationshipType>ORGANIC</CommandRelationshipType></CommandRelation></ForceRelationData></ForceRelation></Relations></Unit>
      <Unit><ObjectHandle>hq</ObjectHandle><Relations><ForceRelation><ForceRelationChoice>FORCE_SIDE</ForceRelationChoice><ForceRelationData><ForceSideHandle>blue</ForceSideHandle></ForceRelationData></ForceRelation></Relations></Unit>
      <Unit><ObjectHandle>a</ObjectHandle><Relations><ForceRelation><ForceRelationChoice>UNIT</ForceRelationChoice><ForceRelationData><CommandRelation><CommandingSuperiorHandle>hq</CommandingSuperiorHandle><CommandRelationshipType>ORGANIC</CommandRelationshipType></CommandRelation></ForceRelationData></ForceRelation></Relations></Unit>
      <Unit><ObjectHandle>lost</ObjectHandle><Relations><ForceRelation><ForceRelationChoice>UNIT</ForceRelationChoice><ForceRelationData><CommandRelation><CommandingSuperiorHandle>nobody</CommandingSuperiorHandle></CommandRelation></ForceRelationData></ForceRelation></Relations></Unit>
      <Unit><Name>no handle</Name></Unit>
    </Units>
    <Equipment>
      <EquipmentItem><ObjectHandle>e1</ObjectHandle><Relations><OwnerChoice>UNIT</OwnerChoice><OwnerData><UnitOwnerHandle>a</UnitOwnerHandle></OwnerData></Relations></EquipmentItem>
    </Equipment>
  </Organizations>
</MilitaryScenario>"#;

    fn store() -> Store {
        let tree = XmlTree::parse(DOC).unwrap();
        let root = tree.root_element().unwrap();
        Store::load(tree, root, ScenarioConfig::default())
    }

    #[test]
    fn test_child_lists_follow_document_order() {
        let store = store();
        let hq = store.get_unit_by_id("hq").unwrap();
        assert_eq!(hq.subordinates(), &["b".to_string(), "a".to_string()]);
        assert_eq!(
            store.get_force_side_by_id("blue").unwrap().root_units(),
            &["hq".to_string()]
        );
        assert_eq!(
            store.get_force_side_by_id("blue").unwrap().forces(),
            &["blue-f".to_string()]
        );
        assert_eq!(
            store.get_unit_by_id("a").unwrap().equipment(),
            &["e1".to_string()]
        );
    }

    #[test]
    fn test_unresolved_and_handleless_units() {
        let store = store();
        assert_eq!(store.units.len(), 4);
        assert!(store.get_item_parent("lost").is_none());
        assert_eq!(store.units_in_order().len(), 4);
    }

    #[test]
    fn test_queries_return_none_when_absent() {
        let store = store();
        assert!(store.get_unit_by_id("e1").is_none());
        assert!(store.get_unit_or_force_side_by_id("e1").is_none());
        assert_eq!(
            store
                .get_unit_or_equipment_by_id("e1")
                .map(|e| e.kind()),
            Some(EntityKind::EquipmentItem)
        );
        assert_eq!(
            store.get_item_parent("e1").map(|p| p.object_handle()),
            Some("a")
        );
        assert_eq!(
            store.get_item_parent("blue-f").map(|p| p.object_handle()),
            Some("blue")
        );
        assert_eq!(store.primary_side().map(|s| s.object_handle()), Some("blue"));
    }
}
