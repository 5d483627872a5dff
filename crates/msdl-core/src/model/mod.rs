pub mod disposition;
pub mod entity;
pub mod equipment;
pub mod federate;
pub mod field;
pub mod force_side;
pub mod holding;
pub mod options;
pub mod relations;
pub mod scenario_id;
pub mod symbol;
pub mod unit;

pub use disposition::Disposition;
pub use entity::{EntityKind, EntityRef, MsdlEntity, StandardIdentity, Symbolized};
pub use equipment::EquipmentItem;
pub use federate::Federate;
pub use field::{Cached, TextField};
pub use force_side::{Association, ForceSide};
pub use holding::Holding;
pub use options::Options;
pub use relations::{CommandRelationshipType, EquipmentRelations, ForceRelation, Superior};
pub use scenario_id::{ScenarioId, ScenarioIdModel};
pub use symbol::SymbolModifiers;
pub use unit::Unit;
