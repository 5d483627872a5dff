use uuid::Uuid;

use super::entity::{EntityKind, MsdlEntity};
use super::field::TextField;
use crate::xml::{NodeId, XmlTree};

/// A simulation federate and the entities it is responsible for
/// (`Deployment/Federate`)
#[derive(Debug, Clone, PartialEq)]
pub struct Federate {
    node: NodeId,
    object_handle: String,
    name: TextField,
}

impl Federate {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Option<Self> {
        let object_handle = tree.path_text(node, &["ObjectHandle"])?.to_string();
        Some(Self {
            node,
            object_handle,
            name: TextField::load(tree, node, &["Name"]),
        })
    }

    pub fn create(tree: &mut XmlTree, name: &str) -> Self {
        Self::create_with_handle(tree, &Uuid::new_v4().to_string(), name)
    }

    pub fn create_with_handle(tree: &mut XmlTree, object_handle: &str, name: &str) -> Self {
        let node = tree.create_element("Federate");
        tree.set_path_text(node, &["ObjectHandle"], object_handle);
        tree.set_path_text(node, &["Name"], name);
        Self {
            node,
            object_handle: object_handle.to_string(),
            name: TextField::load(tree, node, &["Name"]),
        }
    }

    pub fn name(&self, tree: &XmlTree) -> Option<String> {
        self.name.get(tree, self.node)
    }

    fn container(kind: EntityKind) -> Option<(&'static str, &'static str)> {
        match kind {
            EntityKind::Unit => Some(("Units", "Unit")),
            EntityKind::EquipmentItem => Some(("Equipment", "EquipmentItem")),
            EntityKind::ForceSide => None,
        }
    }

    fn reference_nodes(&self, tree: &XmlTree, kind: EntityKind) -> Vec<(NodeId, String)> {
        let Some((outer, inner)) = Self::container(kind) else {
            return Vec::new();
        };
        let Some(container) = tree.first_child(self.node, outer) else {
            return Vec::new();
        };
        tree.children_named(container, inner)
            .into_iter()
            .filter_map(|node| {
                let handle = tree.path_text(node, &["ObjectHandle"])?;
                Some((node, handle.to_string()))
            })
            .collect()
    }

    /// Handles of units assigned to this federate
    pub fn units(&self, tree: &XmlTree) -> Vec<String> {
        self.reference_nodes(tree, EntityKind::Unit)
            .into_iter()
            .map(|(_, handle)| handle)
            .collect()
    }

    /// Handles of equipment assigned to this federate
    pub fn equipment(&self, tree: &XmlTree) -> Vec<String> {
        self.reference_nodes(tree, EntityKind::EquipmentItem)
            .into_iter()
            .map(|(_, handle)| handle)
            .collect()
    }

    /// Whether `handle` is referenced under this federate
    pub fn references(&self, tree: &XmlTree, kind: EntityKind, handle: &str) -> bool {
        self.reference_nodes(tree, kind)
            .iter()
            .any(|(_, h)| h == handle)
    }

    /// Add a reference; a handle already present is not duplicated
    pub(crate) fn add_reference(&self, tree: &mut XmlTree, kind: EntityKind, handle: &str) {
        let Some((outer, inner)) = Self::container(kind) else {
            return;
        };
        if self.references(tree, kind, handle) {
            return;
        }
        let container = tree.ensure_child(self.node, outer);
        let reference = tree.create_element_in(container, inner);
        tree.append_child(container, reference);
        tree.set_path_text(reference, &["ObjectHandle"], handle);
    }

    /// Remove every reference to `handle`; returns whether any existed
    pub(crate) fn remove_reference(&self, tree: &mut XmlTree, kind: EntityKind, handle: &str) -> bool {
        let stale: Vec<NodeId> = self
            .reference_nodes(tree, kind)
            .into_iter()
            .filter(|(_, h)| h == handle)
            .map(|(node, _)| node)
            .collect();
        for node in &stale {
            tree.detach(*node);
        }
        !stale.is_empty()
    }
}

impl MsdlEntity for Federate {
    fn object_handle(&self) -> &str {
        &self.object_handle
    }

    fn node(&self) -> NodeId {
        self.node
    }
}
