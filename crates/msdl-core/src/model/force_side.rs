use uuid::Uuid;

use super::entity::MsdlEntity;
use super::field::TextField;
use crate::xml::{NodeId, XmlTree};

/// `Associations/Association` entry of a force side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub node: NodeId,
    pub affiliate_handle: String,
    pub relationship: Option<String>,
}

/// A side (top-level allegiance) or a force within one (`ForceSides/ForceSide`)
#[derive(Debug, Clone, PartialEq)]
pub struct ForceSide {
    node: NodeId,
    object_handle: String,
    name: TextField,
    allegiance_handle: TextField,
    pub(crate) root_units: Vec<String>,
    pub(crate) equipment: Vec<String>,
    pub(crate) forces: Vec<String>,
}

impl ForceSide {
    /// Adopt an existing `ForceSide` element; `None` without `ObjectHandle`
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Option<Self> {
        let object_handle = tree.path_text(node, &["ObjectHandle"])?.to_string();
        Some(Self {
            node,
            object_handle,
            name: TextField::load(tree, node, &["ForceSideName"]),
            allegiance_handle: TextField::load(tree, node, &["AllegianceHandle"]),
            root_units: Vec::new(),
            equipment: Vec::new(),
            forces: Vec::new(),
        })
    }

    /// Build a detached side (allegiance to itself) with a fresh UUID v4 handle
    pub fn create(tree: &mut XmlTree, name: &str) -> Self {
        Self::create_with_handle(tree, &Uuid::new_v4().to_string(), name)
    }

    pub fn create_with_handle(tree: &mut XmlTree, object_handle: &str, name: &str) -> Self {
        let node = tree.create_element("ForceSide");
        tree.set_path_text(node, &["ObjectHandle"], object_handle);
        tree.set_path_text(node, &["ForceSideName"], name);
        tree.set_path_text(node, &["AllegianceHandle"], object_handle);
        Self {
            node,
            object_handle: object_handle.to_string(),
            name: TextField::load(tree, node, &["ForceSideName"]),
            allegiance_handle: TextField::load(tree, node, &["AllegianceHandle"]),
            root_units: Vec::new(),
            equipment: Vec::new(),
            forces: Vec::new(),
        }
    }

    pub fn name(&self, tree: &XmlTree) -> Option<String> {
        self.name.get(tree, self.node)
    }

    pub fn set_name(&mut self, tree: &mut XmlTree, name: &str) {
        self.name.set(tree, self.node, name);
    }

    pub fn allegiance_handle(&self, tree: &XmlTree) -> Option<String> {
        self.allegiance_handle.get(tree, self.node)
    }

    pub(crate) fn set_allegiance_handle(&mut self, tree: &mut XmlTree, handle: &str) {
        self.allegiance_handle.set(tree, self.node, handle);
    }

    /// A side has no allegiance or an allegiance to itself
    pub fn is_side(&self, tree: &XmlTree) -> bool {
        match self.allegiance_handle(tree) {
            None => true,
            Some(handle) => handle.is_empty() || handle == self.object_handle,
        }
    }

    /// Side this force belongs to; `None` for sides
    pub fn parent_side_handle(&self, tree: &XmlTree) -> Option<String> {
        if self.is_side(tree) {
            None
        } else {
            self.allegiance_handle(tree)
        }
    }

    /// Units whose superior is this force side, in order
    pub fn root_units(&self) -> &[String] {
        &self.root_units
    }

    /// Equipment owned directly by this force side, in order
    pub fn equipment(&self) -> &[String] {
        &self.equipment
    }

    /// Forces allied to this side, in document order
    pub fn forces(&self) -> &[String] {
        &self.forces
    }

    pub fn associations(&self, tree: &XmlTree) -> Vec<Association> {
        let Some(container) = tree.first_child(self.node, "Associations") else {
            return Vec::new();
        };
        tree.children_named(container, "Association")
            .into_iter()
            .filter_map(|node| {
                let affiliate_handle = tree.path_text(node, &["AffiliateHandle"])?.to_string();
                Some(Association {
                    node,
                    affiliate_handle,
                    relationship: tree
                        .path_text(node, &["Relationship"])
                        .map(str::to_string),
                })
            })
            .collect()
    }

    /// Remove associations naming `affiliate`; returns how many were removed
    pub(crate) fn remove_associations_to(&self, tree: &mut XmlTree, affiliate: &str) -> usize {
        let stale: Vec<NodeId> = self
            .associations(tree)
            .into_iter()
            .filter(|a| a.affiliate_handle == affiliate)
            .map(|a| a.node)
            .collect();
        for node in &stale {
            tree.detach(*node);
        }
        stale.len()
    }

    pub fn refresh(&mut self) {
        self.name.invalidate();
        self.allegiance_handle.invalidate();
    }
}

impl MsdlEntity for ForceSide {
    fn object_handle(&self) -> &str {
        &self.object_handle
    }

    fn node(&self) -> NodeId {
        self.node
    }
}
