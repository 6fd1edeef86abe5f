//! Entity classification.
//!
//! Decides whether an entity becomes a node and, if so, in which node
//! class, then builds its lean graph document.
//!
//! Rules, first match wins:
//! 1. kinds without a node class (synthetic `params_of`, `returns`,
//!    `import`, unknown kinds) are dropped
//! 2. `class` -> types, `function`/`async_function` -> functions
//! 3. `assignment`/`augmented_assignment` -> members, but only outside
//!    function bodies (see [`is_function_local`])
//! 4. `module` -> modules

use crate::document::{GraphNode, NodeDocument};
use crate::schema::{node_class_for, NodeClass, LANGUAGE};
use lattice_core::{storage_key, EntityGraph, EntityKind, EntityRecord};
use std::collections::HashSet;
use tracing::trace;

/// Marker the extractor puts in qnames nested under an assignment.
const ASSIGNMENT_MARKER: &str = ".assignment.";

/// Returns the node class of an entity, or `None` if it produces no node.
pub fn classify(entity: &EntityRecord, entities: &EntityGraph) -> Option<NodeClass> {
    let kind = entity.kind?;
    let class = node_class_for(kind)?;

    if kind.is_assignment() && is_function_local(entity, entities) {
        return None;
    }

    Some(class)
}

/// Scope heuristic for assignments.
///
/// This is not static scope analysis. The input carries no scope kind, so
/// an assignment counts as function-local when:
/// - it has no parent qname at all, or
/// - its parent qname contains the `.assignment.` marker, or
/// - walking the parent chain through the loaded entities reaches another
///   assignment-kind entity.
///
/// Module and class level assignments pass; anything the extractor nests
/// under another assignment does not. The walk stops at the first parent
/// missing from the input.
pub fn is_function_local(entity: &EntityRecord, entities: &EntityGraph) -> bool {
    let Some(parent) = entity.parent_qualified_name.as_deref() else {
        return true;
    };
    if parent.contains(ASSIGNMENT_MARKER) {
        return true;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(parent);
    while let Some(qname) = current {
        if !seen.insert(qname) {
            break;
        }
        let Some(ancestor) = entities.get(qname) else {
            break;
        };
        if ancestor.kind.is_some_and(|k| k.is_assignment()) {
            return true;
        }
        current = ancestor.parent_qualified_name.as_deref();
    }
    false
}

/// Classifies an entity and builds its graph document.
pub fn classify_node(qname: &str, entity: &EntityRecord, entities: &EntityGraph) -> Option<GraphNode> {
    let Some(class) = classify(entity, entities) else {
        trace!("No node for {}", qname);
        return None;
    };
    let kind = entity.kind?;

    let is_async = kind == EntityKind::AsyncFunction;
    let normalized = if kind.is_function() {
        EntityKind::Function
    } else {
        kind
    };

    let is_method = kind.is_function()
        && entity
            .parent_qualified_name
            .as_deref()
            .and_then(|p| entities.kind_of(p))
            == Some(EntityKind::Class);

    let document = NodeDocument {
        key: storage_key(qname),
        qname: qname.to_string(),
        name: entity.name.clone(),
        kind: normalized.as_str().to_string(),
        doc: entity.docstring.clone(),
        filepath: entity.filepath.clone(),
        namespace: entity.parent_qualified_name.clone(),
        language: LANGUAGE.to_string(),
        pos: entity.start(),
        end: entity.end(),
        is_async,
        is_method,
    };

    Some(GraphNode { class, document })
}
