use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EquipmentItem, ForceSide, Unit};
use crate::xml::{NodeId, XmlTree};

/// Kinds of entity that take part in the command and ownership hierarchies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Unit,
    EquipmentItem,
    ForceSide,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Unit => "Unit",
            EntityKind::EquipmentItem => "EquipmentItem",
            EntityKind::ForceSide => "ForceSide",
        };
        f.write_str(name)
    }
}

/// Borrowed view of any hierarchy entity
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Unit(&'a Unit),
    EquipmentItem(&'a EquipmentItem),
    ForceSide(&'a ForceSide),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Unit(_) => EntityKind::Unit,
            EntityRef::EquipmentItem(_) => EntityKind::EquipmentItem,
            EntityRef::ForceSide(_) => EntityKind::ForceSide,
        }
    }

    pub fn object_handle(&self) -> &'a str {
        match *self {
            EntityRef::Unit(unit) => unit.object_handle(),
            EntityRef::EquipmentItem(item) => item.object_handle(),
            EntityRef::ForceSide(side) => side.object_handle(),
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            EntityRef::Unit(unit) => unit.node(),
            EntityRef::EquipmentItem(item) => item.node(),
            EntityRef::ForceSide(side) => side.node(),
        }
    }

    pub fn as_unit(&self) -> Option<&'a Unit> {
        match *self {
            EntityRef::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_equipment_item(&self) -> Option<&'a EquipmentItem> {
        match *self {
            EntityRef::EquipmentItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_force_side(&self) -> Option<&'a ForceSide> {
        match *self {
            EntityRef::ForceSide(side) => Some(side),
            _ => None,
        }
    }
}

/// An entity backed by exactly one XML element
pub trait MsdlEntity {
    /// Stable identifier (`ObjectHandle`)
    fn object_handle(&self) -> &str;

    /// Backing element in the scenario tree
    fn node(&self) -> NodeId;
}

/// Standard identity character of a symbol identifier (position 2 of a SIDC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardIdentity {
    Pending,
    Unknown,
    AssumedFriend,
    Friend,
    Neutral,
    Suspect,
    Hostile,
    ExercisePending,
    ExerciseUnknown,
    ExerciseFriend,
    ExerciseNeutral,
    ExerciseAssumedFriend,
    Joker,
    Faker,
    NoneSpecified,
}

impl StandardIdentity {
    pub fn from_char(code: char) -> Option<Self> {
        let identity = match code.to_ascii_uppercase() {
            'P' => Self::Pending,
            'U' => Self::Unknown,
            'A' => Self::AssumedFriend,
            'F' => Self::Friend,
            'N' => Self::Neutral,
            'S' => Self::Suspect,
            'H' => Self::Hostile,
            'G' => Self::ExercisePending,
            'W' => Self::ExerciseUnknown,
            'D' => Self::ExerciseFriend,
            'L' => Self::ExerciseNeutral,
            'M' => Self::ExerciseAssumedFriend,
            'J' => Self::Joker,
            'K' => Self::Faker,
            'O' => Self::NoneSpecified,
            _ => return None,
        };
        Some(identity)
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Pending => 'P',
            Self::Unknown => 'U',
            Self::AssumedFriend => 'A',
            Self::Friend => 'F',
            Self::Neutral => 'N',
            Self::Suspect => 'S',
            Self::Hostile => 'H',
            Self::ExercisePending => 'G',
            Self::ExerciseUnknown => 'W',
            Self::ExerciseFriend => 'D',
            Self::ExerciseNeutral => 'L',
            Self::ExerciseAssumedFriend => 'M',
            Self::Joker => 'J',
            Self::Faker => 'K',
            Self::NoneSpecified => 'O',
        }
    }
}

/// Offset of the identity character inside a symbol identifier
pub const IDENTITY_OFFSET: usize = 1;

/// Entities carrying a `SymbolIdentifier`
pub trait Symbolized {
    fn symbol_identifier(&self, tree: &XmlTree) -> Option<String>;

    fn set_symbol_identifier(&mut self, tree: &mut XmlTree, sidc: &str);

    fn identity(&self, tree: &XmlTree) -> Option<StandardIdentity> {
        self.symbol_identifier(tree)?
            .chars()
            .nth(IDENTITY_OFFSET)
            .and_then(StandardIdentity::from_char)
    }

    /// Substitute the identity character in place
    ///
    /// Returns `false` (and changes nothing) when there is no identifier or
    /// it is too short to carry an identity.
    fn set_identity(&mut self, tree: &mut XmlTree, identity: StandardIdentity) -> bool {
        let Some(sidc) = self.symbol_identifier(tree) else {
            return false;
        };
        match replace_identity(&sidc, identity) {
            Some(updated) => {
                self.set_symbol_identifier(tree, &updated);
                true
            }
            None => false,
        }
    }
}

pub(crate) fn replace_identity(sidc: &str, identity: StandardIdentity) -> Option<String> {
    let mut chars: Vec<char> = sidc.chars().collect();
    let slot = chars.get_mut(IDENTITY_OFFSET)?;
    *slot = identity.as_char();
    Some(chars.into_iter().collect())
}
