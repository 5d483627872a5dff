//! Digest computation for graph snapshots.
//!
//! `GraphSnapshot` keys are `BTreeMap`s and child lists keep their order, so
//! the JSON form is canonical: equal graphs give equal digests and any change
//! of superior, owner or sibling order changes the digest.

use sha2::{Digest, Sha256};

use super::GraphSnapshot;
use crate::errors::Result;

/// Hex-encoded SHA-256 of the snapshot's canonical JSON (64 characters)
///
/// # Errors
///
/// Returns `MsdlError::Serialization` if JSON serialization fails.
pub fn compute_graph_digest(snapshot: &GraphSnapshot) -> Result<String> {
    let canonical = serde_json::to_string(snapshot)?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ForceSideEntry;

    #[test]
    fn test_hash_string_deterministic() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_digest_is_order_sensitive() {
        let side = |root_units: Vec<&str>| {
            let mut snapshot = GraphSnapshot::default();
            snapshot.force_sides.insert(
                "blue".to_string(),
                ForceSideEntry {
                    allegiance: None,
                    root_units: root_units.into_iter().map(String::from).collect(),
                    equipment: Vec::new(),
                    forces: Vec::new(),
                },
            );
            snapshot
        };
        let a = compute_graph_digest(&side(vec!["u1", "u2"])).unwrap();
        let b = compute_graph_digest(&side(vec!["u2", "u1"])).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, compute_graph_digest(&side(vec!["u1", "u2"])).unwrap());
    }
}
