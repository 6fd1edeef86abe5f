//! Batch sink writer.
//!
//! Documents are buffered per collection and flushed as one bulk upsert
//! whenever a buffer reaches the batch size. A failed flush is logged and
//! counted, never propagated: the remaining batches and collections are
//! still written. Batches of one collection always reach the sink in the
//! order they were filled, so a later upsert of a key wins.

use crate::sink::Sink;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Per-run write accounting.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Documents accepted by the destination, per collection.
    pub delivered: BTreeMap<String, usize>,
    /// Batches sent, including failed ones.
    pub batches: usize,
    /// Batches whose upsert failed outright.
    pub failed_batches: usize,
    /// Documents lost to failed batches or rejected by the destination.
    pub failed_documents: usize,
}

impl WriteReport {
    /// Total documents accepted across collections.
    pub fn total_delivered(&self) -> usize {
        self.delivered.values().sum()
    }

    /// Documents accepted for one collection.
    pub fn delivered_to(&self, collection: &str) -> usize {
        self.delivered.get(collection).copied().unwrap_or(0)
    }

    /// True if nothing was lost.
    pub fn is_clean(&self) -> bool {
        self.failed_batches == 0 && self.failed_documents == 0
    }
}

/// Buffers documents per collection and flushes them in fixed-size batches.
pub struct BatchWriter<S: Sink> {
    sink: S,
    batch_size: usize,
    /// Buffers in first-seen collection order.
    buffers: Vec<(String, Vec<Value>)>,
    index: HashMap<String, usize>,
    report: WriteReport,
}

impl<S: Sink> BatchWriter<S> {
    /// Creates a writer. A batch size of zero is treated as one.
    pub fn new(sink: S, batch_size: usize) -> Self {
        Self {
            sink,
            batch_size: batch_size.max(1),
            buffers: Vec::new(),
            index: HashMap::new(),
            report: WriteReport::default(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Queues a document, flushing its collection if the buffer is full.
    pub fn push<T: Serialize>(&mut self, collection: &str, document: &T) {
        match serde_json::to_value(document) {
            Ok(value) => self.push_value(collection, value),
            Err(e) => {
                warn!("Dropping unserializable document for {}: {}", collection, e);
                self.report.failed_documents += 1;
            }
        }
    }

    /// Queues an already-serialized document.
    pub fn push_value(&mut self, collection: &str, document: Value) {
        let slot = match self.index.get(collection) {
            Some(&slot) => slot,
            None => {
                self.buffers.push((collection.to_string(), Vec::new()));
                let slot = self.buffers.len() - 1;
                self.index.insert(collection.to_string(), slot);
                slot
            }
        };

        self.buffers[slot].1.push(document);
        if self.buffers[slot].1.len() >= self.batch_size {
            self.flush_slot(slot);
        }
    }

    /// Flushes every non-empty buffer regardless of size.
    pub fn flush_all(&mut self) {
        for slot in 0..self.buffers.len() {
            if !self.buffers[slot].1.is_empty() {
                self.flush_slot(slot);
            }
        }
    }

    /// Flushes what is left and returns the accounting for the run.
    pub fn finish(mut self) -> WriteReport {
        self.flush_all();
        self.report
    }

    /// Accounting so far.
    pub fn report(&self) -> &WriteReport {
        &self.report
    }

    fn flush_slot(&mut self, slot: usize) {
        let (collection, buffer) = &mut self.buffers[slot];
        let batch = std::mem::take(buffer);
        let size = batch.len();
        self.report.batches += 1;

        match self.sink.upsert(collection.as_str(), &batch) {
            Ok(accepted) => {
                debug!(
                    "Flushed {}/{} documents to {}/{}",
                    accepted,
                    size,
                    self.sink.name(),
                    collection
                );
                let accepted = accepted.min(size);
                *self.report.delivered.entry(collection.clone()).or_insert(0) += accepted;
                self.report.failed_documents += size - accepted;
            }
            Err(e) => {
                warn!(
                    "Failed to import batch of {} documents into {}/{}: {}",
                    size,
                    self.sink.name(),
                    collection,
                    e
                );
                self.report.failed_batches += 1;
                self.report.failed_documents += size;
            }
        }
    }
}
