use super::store::{Store, DEPLOYMENT_PATH};
use crate::errors::{MsdlError, Result};
use crate::model::{EntityKind, Federate, MsdlEntity};

/// Add a Federate to `Deployment`
///
/// # Errors
/// * `DuplicateHandle` - handle already used by another entity
/// * `ForeignEntity` - node is not a detached `Federate` of this document
pub fn add_federate(store: &mut Store, federate: Federate) -> Result<()> {
    let handle = federate.object_handle().to_string();
    if store.is_known(&handle) {
        return Err(MsdlError::DuplicateHandle { handle });
    }
    store.check_new_entity(federate.node(), "Federate", &handle)?;
    store.attach_new(DEPLOYMENT_PATH, federate.node());
    store.federates.insert(handle.clone(), federate);
    tracing::debug!(object_handle = %handle, "federate added");
    Ok(())
}

/// # Errors
/// * `FederateNotFound` - handle does not name a Federate
pub fn remove_federate(store: &mut Store, handle: &str) -> Result<()> {
    let federate = store
        .federates
        .remove(handle)
        .ok_or_else(|| MsdlError::FederateNotFound {
            handle: handle.to_string(),
        })?;
    store.tree.detach(federate.node());
    tracing::debug!(object_handle = %handle, "federate removed");
    Ok(())
}

/// Make `federate` responsible for a Unit or EquipmentItem
///
/// # Errors
/// * `FederateNotFound` - federate handle is unknown
/// * `TargetNotFound` - entity is neither a Unit nor an EquipmentItem
pub fn assign_to_federate(store: &mut Store, federate: &str, entity: &str) -> Result<()> {
    let kind = match store.kind_of(entity) {
        Some(kind @ (EntityKind::Unit | EntityKind::EquipmentItem)) => kind,
        _ => {
            return Err(MsdlError::TargetNotFound {
                handle: entity.to_string(),
            })
        }
    };
    let Store {
        tree, federates, ..
    } = store;
    let federate = federates
        .get(federate)
        .ok_or_else(|| MsdlError::FederateNotFound {
            handle: federate.to_string(),
        })?;
    federate.add_reference(tree, kind, entity);
    Ok(())
}

/// Federates responsible for `entity`, in document order
pub fn federates_of<'a>(store: &'a Store, entity: &str) -> Vec<&'a Federate> {
    let Some(kind) = store.kind_of(entity) else {
        return Vec::new();
    };
    store
        .federates_in_order()
        .into_iter()
        .filter(|f| f.references(store.tree(), kind, entity))
        .collect()
}

/// Drop every federate reference to a removed entity
pub(crate) fn forget_entity(store: &mut Store, kind: EntityKind, handle: &str) {
    let Store {
        tree, federates, ..
    } = store;
    let dropped = federates
        .values()
        .filter(|federate| federate.remove_reference(tree, kind, handle))
        .count();
    if dropped > 0 {
        tracing::debug!(object_handle = %handle, federates = dropped, "federate references dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::model::{Superior, Unit};
    use crate::ops::unit_ops;
    use crate::xml::XmlTree;

    fn store() -> Store {
        let tree = XmlTree::parse(
            "<MilitaryScenario><ForceSides><ForceSide><ObjectHandle>blue</ObjectHandle>\
             </ForceSide></ForceSides></MilitaryScenario>",
        )
        .unwrap();
        let root = tree.root_element().unwrap();
        let mut store = Store::load(tree, root, ScenarioConfig::default());
        let hq = Unit::create_with_handle(&mut store.tree, "hq", "HQ", "SFGPU------");
        unit_ops::add_unit(&mut store, hq, Some(Superior::ForceSide("blue".into()))).unwrap();
        let fed = Federate::create_with_handle(&mut store.tree, "f1", "OneSAF");
        add_federate(&mut store, fed).unwrap();
        store
    }

    #[test]
    fn test_assignment_is_dropped_with_the_unit() {
        let mut store = store();
        assign_to_federate(&mut store, "f1", "hq").unwrap();
        assign_to_federate(&mut store, "f1", "hq").unwrap();
        assert_eq!(
            store.get_federate_by_id("f1").unwrap().units(store.tree()),
            vec!["hq".to_string()]
        );
        assert_eq!(federates_of(&store, "hq").len(), 1);

        unit_ops::remove_unit(&mut store, "hq").unwrap();
        assert!(store
            .get_federate_by_id("f1")
            .unwrap()
            .units(store.tree())
            .is_empty());
    }

    #[test]
    fn test_assignment_targets_units_and_equipment_only() {
        let mut store = store();
        assert_eq!(
            assign_to_federate(&mut store, "f1", "blue"),
            Err(MsdlError::TargetNotFound {
                handle: "blue".to_string()
            })
        );
        assert_eq!(
            assign_to_federate(&mut store, "nobody", "hq"),
            Err(MsdlError::FederateNotFound {
                handle: "nobody".to_string()
            })
        );
    }

    #[test]
    fn test_remove_federate_detaches_node() {
        let mut store = store();
        assert!(store.tree().to_xml_string().contains("<Deployment><Federate>"));
        remove_federate(&mut store, "f1").unwrap();
        assert!(!store.tree().to_xml_string().contains("OneSAF"));
        assert_eq!(
            remove_federate(&mut store, "f1"),
            Err(MsdlError::FederateNotFound {
                handle: "f1".to_string()
            })
        );
    }
}
