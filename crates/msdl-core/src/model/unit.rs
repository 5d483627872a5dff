use uuid::Uuid;

use super::disposition::Disposition;
use super::entity::{MsdlEntity, Symbolized};
use super::field::TextField;
use super::holding::Holding;
use super::relations::{CommandRelationshipType, ForceRelation, Superior};
use super::symbol::SymbolModifiers;
use crate::xml::{NodeId, XmlTree};

const MODIFIERS: &str = "UnitSymbolModifiers";

/// An organisation in the command hierarchy (`Organizations/Units/Unit`)
///
/// `subordinates` and `equipment` are the ordered inverse edges maintained
/// by the scenario store; their order is document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    node: NodeId,
    object_handle: String,
    name: TextField,
    symbol_identifier: TextField,
    symbol_modifiers: Option<SymbolModifiers>,
    disposition: Option<Disposition>,
    force_relation: ForceRelation,
    organic_superior: TextField,
    holdings: Vec<Holding>,
    pub(crate) subordinates: Vec<String>,
    pub(crate) equipment: Vec<String>,
}

impl Unit {
    /// Adopt an existing `Unit` element; `None` when it has no `ObjectHandle`
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
            force_relation: ForceRelation::from_node(tree, node),
            organic_superior: TextField::load(
                tree,
                node,
                &["Relations", "OrganicRelation", "OrganicSuperiorHandle"],
            ),
            holdings: Holding::load_all(tree, node),
            subordinates: Vec::new(),
            equipment: Vec::new(),
        })
    }

    /// Build a detached `Unit` element with a fresh UUID v4 handle
    pub fn create(tree: &mut XmlTree, name: &str, symbol_identifier: &str) -> Self {
        Self::create_with_handle(tree, &Uuid::new_v4().to_string(), name, symbol_identifier)
    }

    /// Build a detached `Unit` element with a caller-chosen handle
    pub fn create_with_handle(
        tree: &mut XmlTree,
        object_handle: &str,
        name: &str,
        symbol_identifier: &str,
    ) -> Self {
        let node = tree.create_element("Unit");
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
            force_relation: ForceRelation::default(),
            organic_superior: TextField::unset(&[
                "Relations",
                "OrganicRelation",
                "OrganicSuperiorHandle",
            ]),
            holdings: Vec::new(),
            subordinates: Vec::new(),
            equipment: Vec::new(),
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

    /// Modifiers sub-record, created on first use
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

    /// Disposition sub-record, created on first use
    pub fn disposition_mut(&mut self, tree: &mut XmlTree) -> &mut Disposition {
        let node = self.node;
        self.disposition.get_or_insert_with(|| {
            let disposition = tree.ensure_child(node, "Disposition");
            Disposition::from_node(tree, disposition)
        })
    }

    pub fn superior(&self, tree: &XmlTree) -> Option<Superior> {
        self.force_relation.superior(tree, self.node)
    }

    pub fn superior_handle(&self, tree: &XmlTree) -> Option<String> {
        self.superior(tree).map(|s| s.handle().to_string())
    }

    /// A root unit answers directly to a force side
    pub fn is_root(&self, tree: &XmlTree) -> bool {
        matches!(self.superior(tree), Some(Superior::ForceSide(_)))
    }

    pub fn relationship_type(&self, tree: &XmlTree) -> Option<CommandRelationshipType> {
        self.force_relation.relationship_type(tree, self.node)
    }

    pub(crate) fn set_superior(
        &mut self,
        tree: &mut XmlTree,
        superior: Superior,
        relationship_type: CommandRelationshipType,
    ) {
        self.force_relation
            .set(tree, self.node, superior, relationship_type);
    }

    /// NETN organic superior
    pub fn organic_superior_handle(&self, tree: &XmlTree) -> Option<String> {
        self.organic_superior.get(tree, self.node)
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn holdings_mut(&mut self) -> &mut [Holding] {
        &mut self.holdings
    }

    /// Ordered subordinate unit handles
    pub fn subordinates(&self) -> &[String] {
        &self.subordinates
    }

    /// Ordered handles of equipment owned by this unit
    pub fn equipment(&self) -> &[String] {
        &self.equipment
    }

    /// Drop every cached field so the next reads go to the node
    pub fn refresh(&mut self) {
        self.name.invalidate();
        self.symbol_identifier.invalidate();
        self.force_relation.invalidate();
        self.organic_superior.invalidate();
        if let Some(disposition) = self.disposition.as_mut() {
            disposition.refresh_location();
        }
    }
}

impl MsdlEntity for Unit {
    fn object_handle(&self) -> &str {
        &self.object_handle
    }

    fn node(&self) -> NodeId {
        self.node
    }
}

impl Symbolized for Unit {
    fn symbol_identifier(&self, tree: &XmlTree) -> Option<String> {
        self.symbol_identifier.get(tree, self.node)
    }

    fn set_symbol_identifier(&mut self, tree: &mut XmlTree, sidc: &str) {
        self.symbol_identifier.set(tree, self.node, sidc);
    }
}
