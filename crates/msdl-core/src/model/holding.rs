use super::field::{parse_field, TextField};
use crate::xml::{NodeId, XmlTree};

/// NETN supply holding (`Holdings/Holding`)
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    node: NodeId,
    nsn_name: TextField,
    nsn_code: TextField,
    on_hand_quantity: TextField,
}

impl Holding {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Self {
        Self {
            node,
            nsn_name: TextField::load(tree, node, &["NSN_Name"]),
            nsn_code: TextField::load(tree, node, &["NSN_Code"]),
            on_hand_quantity: TextField::load(tree, node, &["OnHandQuantity"]),
        }
    }

    /// All holdings below an entity node
    pub(crate) fn load_all(tree: &XmlTree, entity: NodeId) -> Vec<Holding> {
        tree.find_path(entity, &["Holdings"])
            .map(|holdings| {
                tree.children_named(holdings, "Holding")
                    .into_iter()
                    .map(|node| Holding::from_node(tree, node))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn nsn_name(&self, tree: &XmlTree) -> Option<String> {
        self.nsn_name.get(tree, self.node)
    }

    pub fn nsn_code(&self, tree: &XmlTree) -> Option<String> {
        self.nsn_code.get(tree, self.node)
    }

    pub fn on_hand_quantity(&self, tree: &XmlTree) -> Option<f64> {
        parse_field("OnHandQuantity", self.on_hand_quantity.get(tree, self.node))
    }

    pub fn set_on_hand_quantity(&mut self, tree: &mut XmlTree, quantity: f64) {
        self.on_hand_quantity
            .set(tree, self.node, &quantity.to_string());
    }
}
