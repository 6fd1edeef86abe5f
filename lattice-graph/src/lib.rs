//! Lattice Graph - The transformation engine
//!
//! This crate maps the flat entity graph onto the two target models:
//! a typed property graph (node and edge collections) and a flat search
//! document set. It does no I/O.
//!
//! # Architecture
//!
//! Building the property graph is a two-pass process:
//! 1. Classify every entity into a node class, recording each routed qname
//!    in a [`RoutingTable`]
//! 2. Resolve every relation into a typed edge with a [`Resolver`] that
//!    borrows the completed table
//!
//! The second pass needs the whole table because a relation may point at
//! any entity, not just the ones visited so far.
//!
//! # Example
//!
//! ```no_run
//! use lattice_core::EntityGraph;
//! use lattice_graph::{classify_node, Resolver, RoutingTable};
//!
//! let entities = EntityGraph::load("output/output.json").unwrap();
//! let mut routing = RoutingTable::new();
//! for (qname, entity) in entities.iter() {
//!     if let Some(node) = classify_node(qname, entity, &entities) {
//!         routing.insert(qname, node.class);
//!     }
//! }
//!
//! let resolver = Resolver::new(&routing, &entities);
//! let edges = entities.relations().filter_map(|r| resolver.resolve(r).ok()).count();
//! ```

mod classify;
mod document;
mod resolve;
mod routing;
mod schema;
mod search;

pub use classify::{classify, classify_node, is_function_local};
pub use document::{node_handle, EdgeDocument, GraphEdge, GraphNode, NodeDocument};
pub use resolve::{Resolver, Unresolved};
pub use routing::RoutingTable;
pub use schema::{edge_class_for, node_class_for, EdgeClass, NodeClass, RelMapping, LANGUAGE};
pub use search::{is_indexable, search_document, search_id, SearchDocument};
