use super::field::{parse_field, TextField};
use crate::xml::{NodeId, XmlTree};

/// `UnitSymbolModifiers` / `EquipmentSymbolModifiers` sub-record
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolModifiers {
    node: NodeId,
    echelon: TextField,
    quantity: TextField,
    unique_designation: TextField,
    higher_formation: TextField,
    additional_info: TextField,
    combat_effectiveness: TextField,
}

impl SymbolModifiers {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Self {
        Self {
            node,
            echelon: TextField::load(tree, node, &["Echelon"]),
            quantity: TextField::load(tree, node, &["Quantity"]),
            unique_designation: TextField::load(tree, node, &["UniqueDesignation"]),
            higher_formation: TextField::load(tree, node, &["HigherFormation"]),
            additional_info: TextField::load(tree, node, &["AdditionalInfo"]),
            combat_effectiveness: TextField::load(tree, node, &["CombatEffectiveness"]),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn echelon(&self, tree: &XmlTree) -> Option<String> {
        self.echelon.get(tree, self.node)
    }

    pub fn set_echelon(&mut self, tree: &mut XmlTree, echelon: &str) {
        self.echelon.set(tree, self.node, echelon);
    }

    pub fn quantity(&self, tree: &XmlTree) -> Option<u32> {
        parse_field("Quantity", self.quantity.get(tree, self.node))
    }

    pub fn set_quantity(&mut self, tree: &mut XmlTree, quantity: u32) {
        self.quantity.set(tree, self.node, &quantity.to_string());
    }

    pub fn unique_designation(&self, tree: &XmlTree) -> Option<String> {
        self.unique_designation.get(tree, self.node)
    }

    pub fn set_unique_designation(&mut self, tree: &mut XmlTree, designation: &str) {
        self.unique_designation.set(tree, self.node, designation);
    }

    pub fn higher_formation(&self, tree: &XmlTree) -> Option<String> {
        self.higher_formation.get(tree, self.node)
    }

    pub fn set_higher_formation(&mut self, tree: &mut XmlTree, formation: &str) {
        self.higher_formation.set(tree, self.node, formation);
    }

    pub fn additional_info(&self, tree: &XmlTree) -> Option<String> {
        self.additional_info.get(tree, self.node)
    }

    pub fn set_additional_info(&mut self, tree: &mut XmlTree, info: &str) {
        self.additional_info.set(tree, self.node, info);
    }

    pub fn combat_effectiveness(&self, tree: &XmlTree) -> Option<String> {
        self.combat_effectiveness.get(tree, self.node)
    }

    pub fn set_combat_effectiveness(&mut self, tree: &mut XmlTree, value: &str) {
        self.combat_effectiveness.set(tree, self.node, value);
    }
}
