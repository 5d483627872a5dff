//! Re-parenting and sibling reordering of units and equipment

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::store::Store;
use crate::errors::{MsdlError, Result};
use crate::model::{CommandRelationshipType, EntityKind, Superior};
use crate::xml::NodeId;

/// How `source` is related to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationInstruction {
    /// Source becomes the last child of target
    #[default]
    MakeChild,
    /// Source becomes target's sibling, immediately before it
    ReorderAbove,
    /// Source becomes target's sibling, immediately after it
    ReorderBelow,
}

impl RelationInstruction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationInstruction::MakeChild => "make-child",
            RelationInstruction::ReorderAbove => "reorder-above",
            RelationInstruction::ReorderBelow => "reorder-below",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRequest {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub instruction: RelationInstruction,
}

impl RelationRequest {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        instruction: RelationInstruction,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            instruction,
        }
    }

    pub fn make_child(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, RelationInstruction::MakeChild)
    }
}

/// Position inside the new superior's child list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement<'a> {
    End,
    Before(&'a str),
    After(&'a str),
}

impl<'a> Placement<'a> {
    fn for_reorder(instruction: RelationInstruction, target: &'a str) -> Self {
        match instruction {
            RelationInstruction::ReorderAbove => Placement::Before(target),
            _ => Placement::After(target),
        }
    }
}

/// Relate `source` to `target`
///
/// Every rule is checked before anything is written, so a rejected request
/// leaves the scenario untouched.
///
/// # Errors
/// * `SourceNotFound` / `TargetNotFound` - handle does not resolve
/// * `SelfRelation` - source and target are the same entity
/// * `InvalidRelationSource` - source is a ForceSide
/// * `EquipmentUnderEquipment` - make-child between two EquipmentItems
/// * `UnitUnderEquipment` - Unit related to an EquipmentItem
/// * `TargetHasNoSuperior` - reorder against a target without a superior
/// * `IncompatibleSiblings` - EquipmentItem reordered among Units
/// * `CycleDetected` - Unit would end up below itself
pub fn set_item_relation(store: &mut Store, request: &RelationRequest) -> Result<()> {
    let source = request.source.as_str();
    let target = request.target.as_str();

    let source_kind = store
        .kind_of(source)
        .ok_or_else(|| MsdlError::SourceNotFound {
            handle: source.to_string(),
        })?;
    let target_kind = store
        .kind_of(target)
        .ok_or_else(|| MsdlError::TargetNotFound {
            handle: target.to_string(),
        })?;

    if source == target {
        return Err(MsdlError::SelfRelation {
            handle: source.to_string(),
        });
    }

    use EntityKind as K;
    use RelationInstruction as I;
    match (source_kind, target_kind, request.instruction) {
        (K::ForceSide, _, _) => Err(MsdlError::InvalidRelationSource {
            handle: source.to_string(),
        }),
        (K::EquipmentItem, K::EquipmentItem, I::MakeChild) => {
            Err(MsdlError::EquipmentUnderEquipment {
                source_handle: source.to_string(),
                target: target.to_string(),
            })
        }
        (K::Unit, K::EquipmentItem, _) => Err(MsdlError::UnitUnderEquipment {
            source_handle: source.to_string(),
            target: target.to_string(),
        }),

        (K::Unit, K::Unit, I::MakeChild) => {
            ensure_no_cycle(store, source, target)?;
            move_unit(store, source, Superior::Unit(target.to_string()), Placement::End, None)
        }
        (K::Unit, K::ForceSide, I::MakeChild) => move_unit(
            store,
            source,
            Superior::ForceSide(target.to_string()),
            Placement::End,
            None,
        ),
        (K::EquipmentItem, K::Unit, I::MakeChild) => move_equipment(
            store,
            source,
            Superior::Unit(target.to_string()),
            Placement::End,
        ),
        (K::EquipmentItem, K::ForceSide, I::MakeChild) => move_equipment(
            store,
            source,
            Superior::ForceSide(target.to_string()),
            Placement::End,
        ),

        (_, K::ForceSide, I::ReorderAbove | I::ReorderBelow) => {
            Err(MsdlError::TargetHasNoSuperior {
                handle: target.to_string(),
            })
        }
        (K::EquipmentItem, K::Unit, I::ReorderAbove | I::ReorderBelow) => {
            Err(MsdlError::IncompatibleSiblings {
                source_handle: source.to_string(),
                target: target.to_string(),
            })
        }
        (K::Unit, K::Unit, instruction @ (I::ReorderAbove | I::ReorderBelow)) => {
            let superior = sibling_context(store, target)?;
            if let Superior::Unit(commander) = &superior {
                ensure_no_cycle(store, source, commander)?;
            }
            move_unit(
                store,
                source,
                superior,
                Placement::for_reorder(instruction, target),
                None,
            )
        }
        (K::EquipmentItem, K::EquipmentItem, instruction @ (I::ReorderAbove | I::ReorderBelow)) => {
            let owner = sibling_context(store, target)?;
            move_equipment(
                store,
                source,
                owner,
                Placement::for_reorder(instruction, target),
            )
        }
    }
}

/// Make `superior` the superior of a Unit, writing the relationship type
///
/// A ForceSide superior makes the unit a root unit and carries no type; a
/// Unit superior carries `relationship_type`, or the configured default.
///
/// # Errors
/// * `SourceNotFound` / `UnitNotFound` - unit handle unknown or not a Unit
/// * `TargetNotFound` - superior handle does not resolve
/// * `SelfRelation`, `UnitUnderEquipment`, `CycleDetected` as for
///   [`set_item_relation`]
pub fn set_unit_force_relation(
    store: &mut Store,
    unit: &str,
    superior: &str,
    relationship_type: Option<CommandRelationshipType>,
) -> Result<()> {
    match store.kind_of(unit) {
        Some(EntityKind::Unit) => {}
        Some(_) => {
            return Err(MsdlError::UnitNotFound {
                handle: unit.to_string(),
            })
        }
        None => {
            return Err(MsdlError::SourceNotFound {
                handle: unit.to_string(),
            })
        }
    }
    let target_kind = store
        .kind_of(superior)
        .ok_or_else(|| MsdlError::TargetNotFound {
            handle: superior.to_string(),
        })?;
    if unit == superior {
        return Err(MsdlError::SelfRelation {
            handle: unit.to_string(),
        });
    }

    match target_kind {
        EntityKind::EquipmentItem => Err(MsdlError::UnitUnderEquipment {
            source_handle: unit.to_string(),
            target: superior.to_string(),
        }),
        EntityKind::ForceSide => move_unit(
            store,
            unit,
            Superior::ForceSide(superior.to_string()),
            Placement::End,
            None,
        ),
        EntityKind::Unit => {
            ensure_no_cycle(store, unit, superior)?;
            let relationship_type =
                relationship_type.unwrap_or(store.config.default_relationship_type);
            move_unit(
                store,
                unit,
                Superior::Unit(superior.to_string()),
                Placement::End,
                Some(relationship_type),
            )
        }
    }
}

/// Superior shared with `target`, which must resolve
fn sibling_context(store: &Store, target: &str) -> Result<Superior> {
    store
        .superior_of(target)
        .filter(|superior| store.resolve_superior(superior).is_some())
        .ok_or_else(|| MsdlError::TargetHasNoSuperior {
            handle: target.to_string(),
        })
}

/// Reject placing `unit` below `new_superior` when that unit is
/// `new_superior` or one of its ancestors
pub(crate) fn ensure_no_cycle(store: &Store, unit: &str, new_superior: &str) -> Result<()> {
    let mut visited = HashSet::new();
    let mut current = Some(new_superior.to_string());
    while let Some(handle) = current {
        if handle == unit {
            return Err(MsdlError::CycleDetected {
                handle: unit.to_string(),
            });
        }
        if !visited.insert(handle.clone()) {
            break;
        }
        current = match store.get_unit_by_id(&handle).and_then(|u| u.superior(&store.tree)) {
            Some(Superior::Unit(parent)) => Some(parent),
            _ => None,
        };
    }
    Ok(())
}

/// A relation change computed up front and committed without failure points
struct Move {
    handle: String,
    old: Option<Superior>,
    new: Superior,
    index: usize,
    anchor: Option<Anchor>,
}

enum Anchor {
    Before(NodeId),
    After(NodeId),
}

fn plan_move(
    store: &Store,
    handle: &str,
    kind: EntityKind,
    new: Superior,
    placement: Placement<'_>,
) -> Result<Move> {
    let old = store.superior_of(handle);
    let mut siblings: Vec<String> = store
        .child_list(&new, kind)
        .cloned()
        .ok_or_else(|| MsdlError::TargetNotFound {
            handle: new.handle().to_string(),
        })?;
    siblings.retain(|h| h != handle);

    let position_of = |sibling: &str| {
        siblings
            .iter()
            .position(|h| h == sibling)
            .ok_or_else(|| MsdlError::InconsistentEdge {
                handle: sibling.to_string(),
                reason: format!("not listed under its superior {new}"),
            })
    };
    let node_of = |sibling: &str| {
        store
            .node_of(sibling)
            .ok_or_else(|| MsdlError::Internal {
                message: format!("no node for {sibling}"),
            })
    };

    let (index, anchor) = match placement {
        Placement::End => {
            let anchor = match siblings.last() {
                Some(last) => Some(Anchor::After(node_of(last)?)),
                None => None,
            };
            (siblings.len(), anchor)
        }
        Placement::Before(target) => (position_of(target)?, Some(Anchor::Before(node_of(target)?))),
        Placement::After(target) => (position_of(target)? + 1, Some(Anchor::After(node_of(target)?))),
    };

    Ok(Move {
        handle: handle.to_string(),
        old,
        new,
        index,
        anchor,
    })
}

fn commit_lists(store: &mut Store, plan: &Move, kind: EntityKind) -> Result<NodeId> {
    if let Some(old) = &plan.old {
        if let Some(list) = store.child_list_mut(old, kind) {
            list.retain(|h| h != &plan.handle);
        }
    }
    let list = store
        .child_list_mut(&plan.new, kind)
        .ok_or_else(|| MsdlError::Internal {
            message: format!("child list of {} vanished", plan.new),
        })?;
    let index = plan.index.min(list.len());
    list.insert(index, plan.handle.clone());

    let node = store.node_of(&plan.handle).ok_or_else(|| MsdlError::Internal {
        message: format!("no node for {}", plan.handle),
    })?;
    match plan.anchor {
        Some(Anchor::Before(sibling)) => store.tree.insert_before(sibling, node),
        Some(Anchor::After(sibling)) => store.tree.insert_after(sibling, node),
        None => {}
    }
    Ok(node)
}

/// Move a Unit under `new_superior` at `placement`, keeping the document
/// order of its new sibling list
///
/// With no explicit `relationship_type`, a unit staying under a Unit keeps
/// its type and one arriving from a ForceSide gets the configured default.
pub(crate) fn move_unit(
    store: &mut Store,
    handle: &str,
    new_superior: Superior,
    placement: Placement<'_>,
    relationship_type: Option<CommandRelationshipType>,
) -> Result<()> {
    let plan = plan_move(store, handle, EntityKind::Unit, new_superior, placement)?;
    let relationship_type = relationship_type.unwrap_or_else(|| {
        let current = store
            .get_unit_by_id(handle)
            .and_then(|u| u.relationship_type(&store.tree));
        match (&plan.old, current) {
            (Some(Superior::Unit(_)), Some(kind)) => kind,
            _ => store.config.default_relationship_type,
        }
    });

    commit_lists(store, &plan, EntityKind::Unit)?;
    let (unit, tree) = store.unit_mut(handle)?;
    unit.set_superior(tree, plan.new.clone(), relationship_type);
    tracing::debug!(object_handle = %handle, superior = %plan.new, "unit moved");
    Ok(())
}

/// Move an EquipmentItem to `new_owner` at `placement`
///
/// Any organic superior is cleared so the new owner is the effective one.
pub(crate) fn move_equipment(
    store: &mut Store,
    handle: &str,
    new_owner: Superior,
    placement: Placement<'_>,
) -> Result<()> {
    let plan = plan_move(store, handle, EntityKind::EquipmentItem, new_owner, placement)?;
    commit_lists(store, &plan, EntityKind::EquipmentItem)?;
    let (item, tree) = store.equipment_mut(handle)?;
    item.set_owner(tree, plan.new.clone());
    if item.organic_superior_handle(tree).is_some() {
        item.clear_organic_superior(tree);
    }
    tracing::debug!(object_handle = %handle, owner = %plan.new, "equipment moved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::model::MsdlEntity;
    use crate::xml::XmlTree;

    fn unit(handle: &str, superior: &str, choice: &str) -> String {
        let data = if choice == "UNIT" {
            format!("<CommandRelation><CommandingSuperiorHandle>{superior}</CommandingSuperiorHandle><CommandRelationshipType>ORGANIC</CommandRelationshipType></CommandRelation>")
        } else {
            format!("<ForceSideHandle>{superior}</ForceSideHandle>")
        };
        format!(
            "<Unit><ObjectHandle>{handle}</ObjectHandle><Relations><ForceRelation>\
             <ForceRelationChoice>{choice}</ForceRelationChoice>\
             <ForceRelationData>{data}</ForceRelationData></ForceRelation></Relations></Unit>"
        )
    }

    fn item(handle: &str, owner: &str) -> String {
        format!(
            "<EquipmentItem><ObjectHandle>{handle}</ObjectHandle><Relations>\
             <OwnerChoice>UNIT</OwnerChoice><OwnerData><UnitOwnerHandle>{owner}</UnitOwnerHandle>\
             </OwnerData></Relations></EquipmentItem>"
        )
    }

    fn store() -> Store {
        let xml = format!(
            "<MilitaryScenario><ForceSides><ForceSide><ObjectHandle>blue</ObjectHandle>\
             <AllegianceHandle>blue</AllegianceHandle></ForceSide></ForceSides>\
             <Organizations><Units>{}{}{}{}</Units><Equipment>{}{}</Equipment></Organizations>\
             </MilitaryScenario>",
            unit("hq", "blue", "FORCE_SIDE"),
            unit("a", "hq", "UNIT"),
            unit("b", "hq", "UNIT"),
            unit("c", "a", "UNIT"),
            item("e1", "a"),
            item("e2", "a"),
        );
        let tree = XmlTree::parse(&xml).unwrap();
        let root = tree.root_element().unwrap();
        Store::load(tree, root, ScenarioConfig::default())
    }

    fn subordinates(store: &Store, handle: &str) -> Vec<String> {
        store.get_unit_by_id(handle).unwrap().subordinates().to_vec()
    }

    #[test]
    fn test_make_child_appends_and_detaches() {
        let mut store = store();
        set_item_relation(&mut store, &RelationRequest::make_child("a", "b")).unwrap();

        assert_eq!(subordinates(&store, "hq"), vec!["b"]);
        assert_eq!(subordinates(&store, "b"), vec!["a"]);
        let a = store.get_unit_by_id("a").unwrap();
        assert_eq!(a.superior_handle(store.tree()).as_deref(), Some("b"));
        assert_eq!(
            a.relationship_type(store.tree()),
            Some(CommandRelationshipType::Organic)
        );
    }

    #[test]
    fn test_reorder_above_takes_target_position() {
        let mut store = store();
        set_item_relation(
            &mut store,
            &RelationRequest::new("b", "a", RelationInstruction::ReorderAbove),
        )
        .unwrap();
        assert_eq!(subordinates(&store, "hq"), vec!["b", "a"]);

        set_item_relation(
            &mut store,
            &RelationRequest::new("c", "b", RelationInstruction::ReorderBelow),
        )
        .unwrap();
        assert_eq!(subordinates(&store, "hq"), vec!["b", "c", "a"]);
        assert!(subordinates(&store, "a").is_empty());

        let order: Vec<&str> = store
            .units_in_order()
            .iter()
            .map(|u| u.object_handle())
            .filter(|h| ["a", "b", "c"].contains(h))
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rejections_leave_store_untouched() {
        let mut store = store();
        let before = store.tree().to_xml_string();
        let cases = [
            (RelationRequest::make_child("zz", "a"), "SourceNotFound"),
            (RelationRequest::make_child("a", "zz"), "TargetNotFound"),
            (RelationRequest::make_child("a", "a"), "SelfRelation"),
            (RelationRequest::make_child("e1", "e2"), "EquipmentUnderEquipment"),
            (RelationRequest::make_child("a", "e1"), "UnitUnderEquipment"),
            (RelationRequest::make_child("blue", "a"), "InvalidRelationSource"),
            (RelationRequest::make_child("hq", "c"), "CycleDetected"),
            (
                RelationRequest::new("a", "blue", RelationInstruction::ReorderAbove),
                "TargetHasNoSuperior",
            ),
            (
                RelationRequest::new("e1", "b", RelationInstruction::ReorderBelow),
                "IncompatibleSiblings",
            ),
        ];
        for (request, expected) in cases {
            let err = set_item_relation(&mut store, &request).unwrap_err();
            assert!(
                format!("{err:?}").starts_with(expected),
                "{request:?} gave {err:?}"
            );
        }
        assert_eq!(store.tree().to_xml_string(), before);
    }

    #[test]
    fn test_equipment_reorders_within_owner() {
        let mut store = store();
        set_item_relation(
            &mut store,
            &RelationRequest::new("e2", "e1", RelationInstruction::ReorderAbove),
        )
        .unwrap();
        assert_eq!(
            store.get_unit_by_id("a").unwrap().equipment(),
            &["e2".to_string(), "e1".to_string()]
        );
    }

    #[test]
    fn test_force_relation_to_side_makes_root() {
        let mut store = store();
        set_unit_force_relation(&mut store, "c", "blue", None).unwrap();
        let c = store.get_unit_by_id("c").unwrap();
        assert!(c.is_root(store.tree()));
        assert_eq!(c.relationship_type(store.tree()), None);
        assert_eq!(
            store.get_force_side_by_id("blue").unwrap().root_units(),
            &["hq".to_string(), "c".to_string()]
        );

        set_unit_force_relation(&mut store, "c", "b", Some(CommandRelationshipType::Tacon))
            .unwrap();
        let c = store.get_unit_by_id("c").unwrap();
        assert_eq!(
            c.relationship_type(store.tree()),
            Some(CommandRelationshipType::Tacon)
        );
    }
}
