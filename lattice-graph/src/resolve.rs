//! Relation resolution.
//!
//! Second pass of the graph build: turns each typed relation into an edge
//! between two classified nodes, using the routing table produced by the
//! first pass. Relations that cannot be represented are rejected with a
//! reason instead of being emitted with a dangling endpoint.

use crate::document::{node_handle, EdgeDocument, GraphEdge};
use crate::routing::RoutingTable;
use crate::schema::{edge_class_for, EdgeClass, NodeClass, RelMapping};
use lattice_core::{edge_key, storage_key, EntityGraph, EntityKind, Relation};
use serde::Serialize;

/// Suffix of the initializer a constructor call is redirected to.
const INITIALIZER_SUFFIX: &str = ".__init__";

/// Why a relation produced no edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unresolved {
    /// rel_type, source or target is missing.
    MissingField,
    /// No edge class for this rel_type.
    UnmappedRelType,
    /// Mirror of a relation that already yields the edge (`CALLED_BY`).
    InverseRelType,
    /// Source qname has no node class.
    UnknownSource,
    /// Target qname has no node class.
    UnknownTarget,
    /// Constructor call to a class without a routed `__init__`.
    MissingInitializer,
    /// Endpoint classes are not allowed for the edge class.
    ConstraintViolation,
}

impl Unresolved {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::UnmappedRelType => "unmapped_rel_type",
            Self::InverseRelType => "inverse_rel_type",
            Self::UnknownSource => "unknown_source",
            Self::UnknownTarget => "unknown_target",
            Self::MissingInitializer => "missing_initializer",
            Self::ConstraintViolation => "constraint_violation",
        }
    }
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves relations against a completed routing table.
///
/// Holding the table by shared reference is what guarantees classification
/// has finished: nothing can insert into it while a resolver exists.
pub struct Resolver<'a> {
    routing: &'a RoutingTable,
    entities: &'a EntityGraph,
}

impl<'a> Resolver<'a> {
    pub fn new(routing: &'a RoutingTable, entities: &'a EntityGraph) -> Self {
        Self { routing, entities }
    }

    /// Resolves one relation into an edge.
    pub fn resolve(&self, relation: &Relation) -> Result<GraphEdge, Unresolved> {
        let (Some(rel_type), Some(source), Some(target)) = (
            relation.rel_type,
            relation.source.as_deref(),
            relation.target.as_deref(),
        ) else {
            return Err(Unresolved::MissingField);
        };
        if source.is_empty() || target.is_empty() {
            return Err(Unresolved::MissingField);
        }

        let class = match edge_class_for(rel_type) {
            RelMapping::Edge(class) => class,
            RelMapping::Inverse => return Err(Unresolved::InverseRelType),
            RelMapping::Unmapped => return Err(Unresolved::UnmappedRelType),
        };

        let source_class = self.routing.resolve(source);
        let mut target = target.to_string();
        let mut target_class = self.routing.resolve(&target);

        // Calling a class is a constructor call; point the edge at its
        // initializer so calls stays function -> function.
        if class == EdgeClass::Calls && target_class == Some(NodeClass::Types) {
            let init = format!("{}{}", target, INITIALIZER_SUFFIX);
            match self.routing.resolve(&init) {
                Some(init_class) => {
                    target = init;
                    target_class = Some(init_class);
                }
                None => return Err(Unresolved::MissingInitializer),
            }
        }

        // Modules are valid parent targets even when they were not routed.
        if class == EdgeClass::Parent
            && target_class.is_none()
            && self.entities.kind_of(&target) == Some(EntityKind::Module)
        {
            target_class = Some(NodeClass::Modules);
        }

        let from_class = source_class.ok_or(Unresolved::UnknownSource)?;
        let to_class = target_class.ok_or(Unresolved::UnknownTarget)?;

        if !class.permits(from_class, to_class) {
            return Err(Unresolved::ConstraintViolation);
        }

        let call_site_pos = match class {
            EdgeClass::Calls => relation.pos.and_then(|p| p.start).filter(|&p| p > 0),
            _ => None,
        };

        let document = EdgeDocument {
            key: edge_key(source, &target, rel_type.as_str()),
            from: node_handle(from_class, &storage_key(source)),
            to: node_handle(to_class, &storage_key(&target)),
            call_site_pos,
        };

        Ok(GraphEdge {
            class,
            from_class,
            to_class,
            document,
        })
    }
}
