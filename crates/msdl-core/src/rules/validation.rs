use crate::errors::{MsdlError, Result};
use crate::model::MsdlEntity;
use crate::ops::Store;

use super::invariants;

/// Validate the three hierarchies of a scenario
///
/// Checks that every indexed entity is attached to the document, that
/// superior/owner handles and ordered child lists are inverse of each other
/// with each child listed exactly once, that child lists follow document
/// order, that side/force lists match allegiances and that the command tree
/// is acyclic.
///
/// # Errors
/// Returns the first violation as `InconsistentEdge` or `CycleDetected`.
/// For exhaustive reporting, call the individual invariant functions.
pub fn validate_graph(store: &Store) -> Result<()> {
    if let Some(handle) = invariants::find_detached_entities(store).into_iter().next() {
        return Err(MsdlError::InconsistentEdge {
            handle,
            reason: "entity node is not attached to the document".to_string(),
        });
    }

    if let Some((child, superior)) = invariants::find_membership_inconsistencies(store)
        .into_iter()
        .next()
    {
        return Err(MsdlError::InconsistentEdge {
            handle: child,
            reason: format!("not listed exactly once under {superior}"),
        });
    }

    if let Some((parent, child)) = invariants::find_stray_children(store).into_iter().next() {
        return Err(MsdlError::InconsistentEdge {
            handle: parent,
            reason: format!("lists {child}, which records another superior"),
        });
    }

    if let Some(parent) = invariants::find_order_mismatches(store).into_iter().next() {
        return Err(MsdlError::InconsistentEdge {
            handle: parent,
            reason: "child order differs from document order".to_string(),
        });
    }

    if let Some((side, force)) = invariants::find_force_inconsistencies(store)
        .into_iter()
        .next()
    {
        return Err(MsdlError::InconsistentEdge {
            handle: side,
            reason: format!("forces list disagrees with allegiance of {force}"),
        });
    }

    for unit in store.units_in_order() {
        if invariants::has_cycle(store, unit.object_handle()) {
            return Err(MsdlError::CycleDetected {
                handle: unit.object_handle().to_string(),
            });
        }
    }

    Ok(())
}
