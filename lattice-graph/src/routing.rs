use crate::schema::NodeClass;
use std::collections::HashMap;

/// Maps qnames to the node class they were classified into.
///
/// Filled during classification and only read during resolution. The
/// resolver borrows it immutably, so it cannot change once resolution
/// has started.
#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    by_qname: HashMap<String, NodeClass>,
}

impl RoutingTable {
    /// Creates a new empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the node class of a classified entity.
    pub fn insert(&mut self, qname: impl Into<String>, class: NodeClass) {
        self.by_qname.insert(qname.into(), class);
    }

    /// Looks up the node class of a qname.
    pub fn resolve(&self, qname: &str) -> Option<NodeClass> {
        self.by_qname.get(qname).copied()
    }

    /// Returns true if the qname produced a node.
    pub fn contains(&self, qname: &str) -> bool {
        self.by_qname.contains_key(qname)
    }

    /// Merges another table into this one (partitioned classification).
    pub fn extend(&mut self, other: RoutingTable) {
        self.by_qname.extend(other.by_qname);
    }

    /// Number of routed qnames.
    pub fn len(&self) -> usize {
        self.by_qname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qname.is_empty()
    }

    /// Count of routed qnames per node class.
    pub fn counts(&self) -> HashMap<NodeClass, usize> {
        let mut counts = HashMap::new();
        for class in self.by_qname.values() {
            *counts.entry(*class).or_insert(0) += 1;
        }
        counts
    }
}
