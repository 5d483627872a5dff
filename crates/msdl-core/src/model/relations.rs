//! Relation sub-records of units and equipment

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::field::Cached;
use crate::xml::{NodeId, XmlTree};

const FORCE_RELATION_CHOICE: &[&str] = &["Relations", "ForceRelation", "ForceRelationChoice"];
const FORCE_RELATION_DATA: &[&str] = &["Relations", "ForceRelation", "ForceRelationData"];
const COMMAND_RELATION: &[&str] = &["CommandRelation"];
const FORCE_SIDE_HANDLE: &[&str] = &["ForceSideHandle"];
const COMMANDING_SUPERIOR: &[&str] = &["CommandRelation", "CommandingSuperiorHandle"];
const RELATIONSHIP_TYPE: &[&str] = &["CommandRelation", "CommandRelationshipType"];

const OWNER_CHOICE: &[&str] = &["Relations", "OwnerChoice"];
const OWNER_DATA: &[&str] = &["Relations", "OwnerData"];
const UNIT_OWNER_HANDLE: &[&str] = &["UnitOwnerHandle"];
const FORCE_OWNER_HANDLE: &[&str] = &["ForceOwnerHandle"];
const ORGANIC_SUPERIOR: &[&str] = &["Relations", "OrganicSuperiorHandle"];

const CHOICE_UNIT: &str = "UNIT";
const CHOICE_FORCE_SIDE: &str = "FORCE_SIDE";

/// Superior of a unit, or owner of an equipment item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Superior {
    Unit(String),
    ForceSide(String),
}

impl Superior {
    pub fn handle(&self) -> &str {
        match self {
            Superior::Unit(handle) | Superior::ForceSide(handle) => handle,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Superior::Unit(_) => EntityKind::Unit,
            Superior::ForceSide(_) => EntityKind::ForceSide,
        }
    }

    pub fn is_force_side(&self) -> bool {
        matches!(self, Superior::ForceSide(_))
    }
}

impl fmt::Display for Superior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.handle())
    }
}

/// `CommandRelationshipType` enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandRelationshipType {
    #[default]
    None,
    Organic,
    Attached,
    Opcon,
    Tacon,
    Adcon,
}

impl CommandRelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Organic => "ORGANIC",
            Self::Attached => "ATTACHED",
            Self::Opcon => "OPCON",
            Self::Tacon => "TACON",
            Self::Adcon => "ADCON",
        }
    }
}

impl FromStr for CommandRelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "ORGANIC" => Ok(Self::Organic),
            "ATTACHED" => Ok(Self::Attached),
            "OPCON" => Ok(Self::Opcon),
            "TACON" => Ok(Self::Tacon),
            "ADCON" => Ok(Self::Adcon),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CommandRelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Relations/ForceRelation` of a unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceRelation {
    superior: Cached<Superior>,
    relationship_type: Cached<CommandRelationshipType>,
}

impl ForceRelation {
    pub fn from_node(tree: &XmlTree, unit: NodeId) -> Self {
        Self {
            superior: Cached::from_option(read_superior(tree, unit)),
            relationship_type: Cached::from_option(read_relationship_type(tree, unit)),
        }
    }

    pub fn superior(&self, tree: &XmlTree, unit: NodeId) -> Option<Superior> {
        self.superior.get_or_read(|| read_superior(tree, unit))
    }

    /// Relationship to a commanding unit; `None` for root units
    pub fn relationship_type(
        &self,
        tree: &XmlTree,
        unit: NodeId,
    ) -> Option<CommandRelationshipType> {
        match self.superior(tree, unit)? {
            Superior::ForceSide(_) => None,
            Superior::Unit(_) => self
                .relationship_type
                .get_or_read(|| read_relationship_type(tree, unit)),
        }
    }

    /// Write the relation, replacing the other branch of the choice
    ///
    /// A force-side superior carries no relationship type; a unit superior
    /// always carries one.
    pub fn set(
        &mut self,
        tree: &mut XmlTree,
        unit: NodeId,
        superior: Superior,
        relationship_type: CommandRelationshipType,
    ) {
        match &superior {
            Superior::ForceSide(handle) => {
                tree.set_path_text(unit, FORCE_RELATION_CHOICE, CHOICE_FORCE_SIDE);
                let data = tree.ensure_path(unit, FORCE_RELATION_DATA);
                tree.remove_path(data, COMMAND_RELATION);
                tree.set_path_text(data, FORCE_SIDE_HANDLE, handle);
                self.relationship_type.invalidate();
            }
            Superior::Unit(handle) => {
                tree.set_path_text(unit, FORCE_RELATION_CHOICE, CHOICE_UNIT);
                let data = tree.ensure_path(unit, FORCE_RELATION_DATA);
                tree.remove_path(data, FORCE_SIDE_HANDLE);
                tree.set_path_text(data, COMMANDING_SUPERIOR, handle);
                tree.set_path_text(data, RELATIONSHIP_TYPE, relationship_type.as_str());
                self.relationship_type.set(relationship_type);
            }
        }
        self.superior.set(superior);
    }

    pub fn invalidate(&mut self) {
        self.superior.invalidate();
        self.relationship_type.invalidate();
    }
}

fn read_superior(tree: &XmlTree, unit: NodeId) -> Option<Superior> {
    let data = tree.find_path(unit, FORCE_RELATION_DATA)?;
    let side = tree.path_text(data, FORCE_SIDE_HANDLE);
    let commander = tree.path_text(data, COMMANDING_SUPERIOR);
    match tree.path_text(unit, FORCE_RELATION_CHOICE) {
        Some(CHOICE_FORCE_SIDE) => side.map(|h| Superior::ForceSide(h.to_string())),
        Some(CHOICE_UNIT) => commander.map(|h| Superior::Unit(h.to_string())),
        other => {
            tracing::warn!(choice = ?other, "unrecognised ForceRelationChoice, inferring from data");
            side.map(|h| Superior::ForceSide(h.to_string()))
                .or_else(|| commander.map(|h| Superior::Unit(h.to_string())))
        }
    }
}

fn read_relationship_type(tree: &XmlTree, unit: NodeId) -> Option<CommandRelationshipType> {
    let data = tree.find_path(unit, FORCE_RELATION_DATA)?;
    let raw = tree.path_text(data, RELATIONSHIP_TYPE)?;
    match raw.parse() {
        Ok(kind) => Some(kind),
        Err(unknown) => {
            tracing::warn!(value = %unknown, "unknown CommandRelationshipType");
            None
        }
    }
}

/// `Relations` of an equipment item: owner and optional organic superior
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquipmentRelations {
    owner: Cached<Superior>,
    organic_superior: Cached<String>,
}

impl EquipmentRelations {
    pub fn from_node(tree: &XmlTree, item: NodeId) -> Self {
        Self {
            owner: Cached::from_option(read_owner(tree, item)),
            organic_superior: Cached::from_option(
                tree.path_text(item, ORGANIC_SUPERIOR).map(str::to_string),
            ),
        }
    }

    pub fn owner(&self, tree: &XmlTree, item: NodeId) -> Option<Superior> {
        self.owner.get_or_read(|| read_owner(tree, item))
    }

    pub fn organic_superior(&self, tree: &XmlTree, item: NodeId) -> Option<String> {
        self.organic_superior
            .get_or_read(|| tree.path_text(item, ORGANIC_SUPERIOR).map(str::to_string))
    }

    pub fn set_organic_superior(&mut self, tree: &mut XmlTree, item: NodeId, handle: &str) {
        tree.set_path_text(item, ORGANIC_SUPERIOR, handle);
        self.organic_superior.set(handle.to_string());
    }

    pub fn clear_organic_superior(&mut self, tree: &mut XmlTree, item: NodeId) {
        tree.remove_path(item, ORGANIC_SUPERIOR);
        self.organic_superior.invalidate();
    }

    /// Write the owner, replacing the other branch of the choice
    pub fn set_owner(&mut self, tree: &mut XmlTree, item: NodeId, owner: Superior) {
        let (choice, keep, drop) = match &owner {
            Superior::Unit(_) => (CHOICE_UNIT, UNIT_OWNER_HANDLE, FORCE_OWNER_HANDLE),
            Superior::ForceSide(_) => (CHOICE_FORCE_SIDE, FORCE_OWNER_HANDLE, UNIT_OWNER_HANDLE),
        };
        tree.set_path_text(item, OWNER_CHOICE, choice);
        let data = tree.ensure_path(item, OWNER_DATA);
        tree.remove_path(data, drop);
        tree.set_path_text(data, keep, owner.handle());
        self.owner.set(owner);
    }

    pub fn invalidate(&mut self) {
        self.owner.invalidate();
        self.organic_superior.invalidate();
    }
}

fn read_owner(tree: &XmlTree, item: NodeId) -> Option<Superior> {
    let data = tree.find_path(item, OWNER_DATA)?;
    let unit = tree.path_text(data, UNIT_OWNER_HANDLE);
    let side = tree.path_text(data, FORCE_OWNER_HANDLE);
    match tree.path_text(item, OWNER_CHOICE) {
        Some(CHOICE_UNIT) => unit.map(|h| Superior::Unit(h.to_string())),
        Some(CHOICE_FORCE_SIDE) => side.map(|h| Superior::ForceSide(h.to_string())),
        other => {
            tracing::warn!(choice = ?other, "unrecognised OwnerChoice, inferring from data");
            unit.map(|h| Superior::Unit(h.to_string()))
                .or_else(|| side.map(|h| Superior::ForceSide(h.to_string())))
        }
    }
}
