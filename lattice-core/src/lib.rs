//! Lattice Core - The input side of Lattice
//!
//! This crate holds the flat code-structure graph produced by an extractor:
//! a mapping from qualified name (qname) to an entity record carrying its
//! kind, documentation, source position and outgoing relations.
//!
//! It also owns the two pure lexical helpers every downstream representation
//! depends on:
//! - the identifier codec ([`storage_key`], [`edge_key`])
//! - the name variant generator ([`name_variants`])
//!
//! # Example
//!
//! ```no_run
//! use lattice_core::{storage_key, EntityGraph};
//!
//! let graph = EntityGraph::load("output/output.json").unwrap();
//! for (qname, entity) in graph.iter() {
//!     println!("{} {:?} -> {}", qname, entity.kind, storage_key(qname));
//! }
//! ```

mod entity;
mod error;
mod key;
mod loader;
mod variants;

pub use entity::{EntityKind, EntityRecord, RelType, Relation, SourceSpan};
pub use error::{LoadError, Result};
pub use key::{edge_key, storage_key, KEY_LEN};
pub use loader::EntityGraph;
pub use variants::name_variants;
