//! Scenario engine configuration

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::logging_facility::Profile;
use crate::model::CommandRelationshipType;

/// What happens to the subordinates of a removed Unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubordinateRemoval {
    /// Subordinates move up to the removed unit's superior, in its place
    #[default]
    Promote,
    /// The whole subtree is removed
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub subordinate_removal: SubordinateRemoval,
    /// Written when a Unit becomes subordinate to a Unit without an explicit type
    pub default_relationship_type: CommandRelationshipType,
    pub logging: Profile,
}

impl ScenarioConfig {
    /// # Errors
    ///
    /// Returns `MsdlError::Serialization` for malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
