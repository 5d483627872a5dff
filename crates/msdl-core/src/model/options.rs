use super::field::TextField;
use crate::xml::{NodeId, XmlTree};

/// Scenario-wide `Options`
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    node: NodeId,
    msdl_version: TextField,
    aggregate_based: TextField,
    aggregate_echelon: TextField,
    symbology_standard: TextField,
    coordinate_system_type: TextField,
    coordinate_system_datum: TextField,
}

impl Options {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Self {
        Self {
            node,
            msdl_version: TextField::load(tree, node, &["MSDLVersion"]),
            aggregate_based: TextField::load(
                tree,
                node,
                &["OrganizationDetail", "AggregateBased"],
            ),
            aggregate_echelon: TextField::load(
                tree,
                node,
                &["OrganizationDetail", "AggregateEchelon"],
            ),
            symbology_standard: TextField::load(
                tree,
                node,
                &["ScenarioDataStandards", "SymbologyDataStandard", "StandardName"],
            ),
            coordinate_system_type: TextField::load(
                tree,
                node,
                &["ScenarioDataStandards", "CoordinateDataStandard", "CoordinateSystemType"],
            ),
            coordinate_system_datum: TextField::load(
                tree,
                node,
                &["ScenarioDataStandards", "CoordinateDataStandard", "CoordinateSystemDatum"],
            ),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn msdl_version(&self, tree: &XmlTree) -> Option<String> {
        self.msdl_version.get(tree, self.node)
    }

    pub fn set_msdl_version(&mut self, tree: &mut XmlTree, version: &str) {
        self.msdl_version.set(tree, self.node, version);
    }

    /// `AggregateBased` as a boolean (`true`/`false`, case-insensitive)
    pub fn aggregate_based(&self, tree: &XmlTree) -> Option<bool> {
        let raw = self.aggregate_based.get(tree, self.node)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => {
                tracing::warn!(value = %raw, "unparseable AggregateBased");
                None
            }
        }
    }

    pub fn aggregate_echelon(&self, tree: &XmlTree) -> Option<String> {
        self.aggregate_echelon.get(tree, self.node)
    }

    pub fn symbology_standard(&self, tree: &XmlTree) -> Option<String> {
        self.symbology_standard.get(tree, self.node)
    }

    pub fn coordinate_system_type(&self, tree: &XmlTree) -> Option<String> {
        self.coordinate_system_type.get(tree, self.node)
    }

    pub fn coordinate_system_datum(&self, tree: &XmlTree) -> Option<String> {
        self.coordinate_system_datum.get(tree, self.node)
    }
}
