use uuid::Uuid;

use super::disposition::Disposition;
use super::entity::{MsdlEntity, Symbolized};
use super::field::TextField;
use super::holding::Holding;
use super::relations::{EquipmentRelations, Superior};
use super::symbol::SymbolModifiers;
use crate::xml::{NodeId, XmlTree};

const MODIFIERS: &str = "EquipmentSymbolModifiers";

/// A piece of equipment (`Organizations/Equipment/EquipmentItem`)
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentItem {
    node: NodeId,
    object_handle: String,
    name: TextField,
    symbol_identifier: TextField,
    symbol_modifiers: Option<SymbolModifiers>,
    disposition: Option<Disposition>,
    relations: EquipmentRelations,
    holdings: Vec<Holding>,
}

impl EquipmentItem {
    /// Adopt an existing `EquipmentItem` element; `None` without `ObjectHandle`
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Option<Self> {
        let object_handle = tree.path_text(node, &["ObjectHandle"])?.to_string();
        Some(Self {
            node,
            object_handle,
            name: TextField::load(tree, node, &["Name"]),
            symbol_identifier: TextField::load(tree, node, &["SymbolIdentifier"]),
            symbol_modifiers: tree
                .first_child(node, MODIFIERS)
                .map(|m| SymbolModifiers::from_node(tree, m)),
            disposition: tree
                .first_child(node, "Disposition")
                .map(|d| Disposition::from_node(tree, d)),
            relations: EquipmentRelations::from_node(tree, node),
            holdings: Holding::load_all(tree, node),
        })
    }

    /// Build a detached `EquipmentItem` element with a fresh UUID v4 handle
    pub fn create(tree: &mut XmlTree, name: &str, symbol_identifier: &str) -> Self {
        Self::create_with_handle(tree, &Uuid::new_v4().to_string(), name, symbol_identifier)
    }

    pub fn create_with_handle(
        tree: &mut XmlTree,
        object_handle: &str,
        name: &str,
        symbol_identifier: &str,
    ) -> Self {
        let node = tree.create_element("EquipmentItem");
        tree.set_path_text(node, &["ObjectHandle"], object_handle);
        tree.set_path_text(node, &["SymbolIdentifier"], symbol_identifier);
        tree.set_path_text(node, &["Name"], name);
        Self {
            node,
            object_handle: object_handle.to_string(),
            name: TextField::load(tree, node, &["Name"]),
            symbol_identifier: TextField::load(tree, node, &["SymbolIdentifier"]),
            symbol_modifiers: None,
            disposition: None,
            relations: EquipmentRelations::default(),
            holdings: Vec::new(),
        }
    }

    pub fn name(&self, tree: &XmlTree) -> Option<String> {
        self.name.get(tree, self.node)
    }

    pub fn set_name(&mut self, tree: &mut XmlTree, name: &str) {
        self.name.set(tree, self.node, name);
    }

    pub fn symbol_modifiers(&self) -> Option<&SymbolModifiers> {
        self.symbol_modifiers.as_ref()
    }

    pub fn symbol_modifiers_mut(&mut self, tree: &mut XmlTree) -> &mut SymbolModifiers {
        let node = self.node;
        self.symbol_modifiers.get_or_insert_with(|| {
            let modifiers = tree.ensure_child(node, MODIFIERS);
            SymbolModifiers::from_node(tree, modifiers)
        })
    }

    pub fn disposition(&self) -> Option<&Disposition> {
        self.disposition.as_ref()
    }

    pub fn disposition_mut(&mut self, tree: &mut XmlTree) -> &mut Disposition {
        let node = self.node;
        self.disposition.get_or_insert_with(|| {
            let disposition = tree.ensure_child(node, "Disposition");
            Disposition::from_node(tree, disposition)
        })
    }

    pub fn owner(&self, tree: &XmlTree) -> Option<Superior> {
        self.relations.owner(tree, self.node)
    }

    pub fn owner_handle(&self, tree: &XmlTree) -> Option<String> {
        self.owner(tree).map(|o| o.handle().to_string())
    }

    pub fn organic_superior_handle(&self, tree: &XmlTree) -> Option<String> {
        self.relations.organic_superior(tree, self.node)
    }

    /// Organic superior when recorded, otherwise the owner
    pub fn effective_superior_handle(&self, tree: &XmlTree) -> Option<String> {
        self.organic_superior_handle(tree)
            .or_else(|| self.owner_handle(tree))
    }

    pub fn set_organic_superior(&mut self, tree: &mut XmlTree, unit_handle: &str) {
        self.relations
            .set_organic_superior(tree, self.node, unit_handle);
    }

    pub(crate) fn clear_organic_superior(&mut self, tree: &mut XmlTree) {
        self.relations.clear_organic_superior(tree, self.node);
    }

    pub(crate) fn set_owner(&mut self, tree: &mut XmlTree, owner: Superior) {
        self.relations.set_owner(tree, self.node, owner);
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn holdings_mut(&mut self) -> &mut [Holding] {
        &mut self.holdings
    }

    pub fn refresh(&mut self) {
        self.name.invalidate();
        self.symbol_identifier.invalidate();
        self.relations.invalidate();
        if let Some(disposition) = self.disposition.as_mut() {
            disposition.refresh_location();
        }
    }
}

impl MsdlEntity for EquipmentItem {
    fn object_handle(&self) -> &str {
        &self.object_handle
    }

    fn node(&self) -> NodeId {
        self.node
    }
}

impl Symbolized for EquipmentItem {
    fn symbol_identifier(&self, tree: &XmlTree) -> Option<String> {
        self.symbol_identifier.get(tree, self.node)
    }

    fn set_symbol_identifier(&mut self, tree: &mut XmlTree, sidc: &str) {
        self.symbol_identifier.set(tree, self.node, sidc);
    }
}
