pub mod equipment_ops;
pub mod federate_ops;
pub mod force_side_ops;
pub mod relation_ops;
pub mod store;
pub mod unit_ops;

pub use relation_ops::{RelationInstruction, RelationRequest};
pub use store::Store;
