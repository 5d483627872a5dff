//! Graph invariants of a loaded or mutated scenario

pub mod invariants;
pub mod validation;

pub use validation::validate_graph;
