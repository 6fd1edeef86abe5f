use lattice_sink::WriteReport;
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals of one property-graph run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct GraphRunStats {
    /// Entities in the input.
    pub entities: usize,
    /// Entities that produced a node.
    pub nodes_classified: usize,
    pub nodes_by_class: BTreeMap<String, usize>,
    /// Node documents accepted by the destination.
    pub nodes_written: usize,
    /// Relations seen across all entities.
    pub relations: usize,
    pub edges_resolved: usize,
    pub edges_by_class: BTreeMap<String, usize>,
    /// Edge documents accepted by the destination.
    pub edges_written: usize,
    /// Relations that produced no edge, per reason.
    pub dropped: BTreeMap<String, usize>,
    pub failed_batches: usize,
    pub failed_documents: usize,
    pub elapsed_ms: u64,
}

impl GraphRunStats {
    /// Total relations dropped during resolution.
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub(crate) fn absorb(&mut self, report: &WriteReport) {
        self.failed_batches += report.failed_batches;
        self.failed_documents += report.failed_documents;
    }
}

/// Totals of one search-document run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SearchRunStats {
    /// Destination collection.
    pub collection: String,
    pub entities: usize,
    /// Entities that produced a search document.
    pub indexed: usize,
    /// Search documents accepted by the destination.
    pub written: usize,
    pub failed_batches: usize,
    pub failed_documents: usize,
    pub elapsed_ms: u64,
}

impl SearchRunStats {
    pub(crate) fn absorb(&mut self, report: &WriteReport) {
        self.failed_batches += report.failed_batches;
        self.failed_documents += report.failed_documents;
    }
}
