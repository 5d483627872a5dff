use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::field::TextField;
use crate::xml::{NodeId, XmlTree};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Values used to build a `ScenarioID` for a new scenario
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioIdModel {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub modification_date: Option<NaiveDate>,
    #[serde(default)]
    pub security_classification: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `ScenarioID` header
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioId {
    node: NodeId,
    name: TextField,
    kind: TextField,
    version: TextField,
    modification_date: TextField,
    security_classification: TextField,
    description: TextField,
}

impl ScenarioId {
    pub fn from_node(tree: &XmlTree, node: NodeId) -> Self {
        Self {
            node,
            name: TextField::load(tree, node, &["name"]),
            kind: TextField::load(tree, node, &["type"]),
            version: TextField::load(tree, node, &["version"]),
            modification_date: TextField::load(tree, node, &["modificationDate"]),
            security_classification: TextField::load(tree, node, &["securityClassification"]),
            description: TextField::load(tree, node, &["description"]),
        }
    }

    /// Write a `ScenarioID` under `node` from a model
    pub(crate) fn write(tree: &mut XmlTree, node: NodeId, model: &ScenarioIdModel) -> Self {
        tree.set_path_text(node, &["name"], &model.name);
        if let Some(kind) = &model.kind {
            tree.set_path_text(node, &["type"], kind);
        }
        if let Some(version) = &model.version {
            tree.set_path_text(node, &["version"], version);
        }
        if let Some(date) = model.modification_date {
            tree.set_path_text(node, &["modificationDate"], &date.format(DATE_FORMAT).to_string());
        }
        if let Some(classification) = &model.security_classification {
            tree.set_path_text(node, &["securityClassification"], classification);
        }
        if let Some(description) = &model.description {
            tree.set_path_text(node, &["description"], description);
        }
        Self::from_node(tree, node)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self, tree: &XmlTree) -> Option<String> {
        self.name.get(tree, self.node)
    }

    pub fn set_name(&mut self, tree: &mut XmlTree, name: &str) {
        self.name.set(tree, self.node, name);
    }

    pub fn kind(&self, tree: &XmlTree) -> Option<String> {
        self.kind.get(tree, self.node)
    }

    pub fn version(&self, tree: &XmlTree) -> Option<String> {
        self.version.get(tree, self.node)
    }

    pub fn modification_date(&self, tree: &XmlTree) -> Option<NaiveDate> {
        let raw = self.modification_date.get(tree, self.node)?;
        match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "unparseable modificationDate");
                None
            }
        }
    }

    pub fn set_modification_date(&mut self, tree: &mut XmlTree, date: NaiveDate) {
        self.modification_date
            .set(tree, self.node, &date.format(DATE_FORMAT).to_string());
    }

    pub fn security_classification(&self, tree: &XmlTree) -> Option<String> {
        self.security_classification.get(tree, self.node)
    }

    pub fn description(&self, tree: &XmlTree) -> Option<String> {
        self.description.get(tree, self.node)
    }
}
