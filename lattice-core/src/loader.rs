//! The loaded input graph.
//!
//! The whole qname -> entity mapping is read into memory once per run.
//! Entities are kept in qname order so every pass over the graph, and
//! therefore every log line and batch, is reproducible.

use crate::entity::{EntityKind, EntityRecord, Relation};
use crate::error::{LoadError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// The immutable input of one pipeline run.
#[derive(Debug, Default, Clone)]
pub struct EntityGraph {
    entities: BTreeMap<String, EntityRecord>,
}

impl EntityGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the graph from an extractor JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let entities: BTreeMap<String, EntityRecord> =
            serde_json::from_str(&text).map_err(|source| LoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded {} entities from {}", entities.len(), path.display());
        Ok(Self { entities })
    }

    /// Adds or replaces an entity. Used when building graphs in code.
    pub fn insert(&mut self, qname: impl Into<String>, entity: EntityRecord) {
        self.entities.insert(qname.into(), entity);
    }

    /// Gets an entity by qname.
    pub fn get(&self, qname: &str) -> Option<&EntityRecord> {
        self.entities.get(qname)
    }

    /// Gets the kind of an entity, if the entity exists and has one.
    pub fn kind_of(&self, qname: &str) -> Option<EntityKind> {
        self.entities.get(qname).and_then(|e| e.kind)
    }

    /// Returns true if the qname is present in the input.
    pub fn contains(&self, qname: &str) -> bool {
        self.entities.contains_key(qname)
    }

    /// Iterates over (qname, entity) pairs in qname order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.entities.iter().map(|(q, e)| (q.as_str(), e))
    }

    /// Iterates over every relation of every entity.
    ///
    /// Entities come in qname order; relations keep their order within
    /// their entity.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.entities.values().flat_map(|e| e.relations.iter())
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the graph has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<(String, EntityRecord)> for EntityGraph {
    fn from_iter<I: IntoIterator<Item = (String, EntityRecord)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}
