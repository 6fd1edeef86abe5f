//! The destination seam.

use crate::error::SinkError;
use serde_json::Value;
use std::collections::BTreeMap;

/// A destination accepting bulk upserts of JSON documents.
///
/// Upserts must be idempotent per document key: writing the same batch
/// twice leaves the destination unchanged.
pub trait Sink {
    /// Short destination name for logs.
    fn name(&self) -> &str;

    /// Upserts one batch into a collection.
    ///
    /// Returns how many documents the destination accepted.
    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        (**self).upsert(collection, documents)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        (**self).upsert(collection, documents)
    }
}

/// Keeps every upserted batch in memory.
///
/// Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    collections: BTreeMap<String, Vec<Value>>,
    batches: Vec<(String, usize)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents received for a collection, in arrival order.
    pub fn documents(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of documents received for a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.documents(collection).len()
    }

    /// Every (collection, batch size) pair, in flush order.
    pub fn batches(&self) -> &[(String, usize)] {
        &self.batches
    }

    /// Names of the collections that received documents.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents.iter().cloned());
        self.batches.push((collection.to_string(), documents.len()));
        Ok(documents.len())
    }
}
