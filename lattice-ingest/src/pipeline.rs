//! The pipeline driver.
//!
//! A graph run is two strictly ordered phases over the loaded input:
//! 1. classify every entity, streaming node documents into the writer and
//!    filling the routing table
//! 2. resolve every relation of every entity against the now read-only
//!    routing table, streaming edge documents into the same writer
//!
//! A search run is a single pass building search documents.
//!
//! Per-item problems never stop a run: unclassifiable entities and
//! unresolvable relations are skipped and counted, failed batches are
//! logged and counted by the writer.

use crate::stats::{GraphRunStats, SearchRunStats};
use lattice_core::EntityGraph;
use lattice_graph::{classify_node, search_document, EdgeClass, NodeClass, Resolver, RoutingTable};
use lattice_sink::{BatchWriter, Sink};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Writes the property graph representation of `entities`.
pub fn run_graph<S: Sink>(entities: &EntityGraph, mut writer: BatchWriter<S>) -> GraphRunStats {
    let start = Instant::now();
    let mut stats = GraphRunStats {
        entities: entities.len(),
        ..GraphRunStats::default()
    };

    info!("Classifying {} entities", entities.len());
    let mut routing = RoutingTable::new();
    for (qname, entity) in entities.iter() {
        let Some(node) = classify_node(qname, entity, entities) else {
            continue;
        };
        routing.insert(qname, node.class);
        writer.push(node.class.as_str(), &node.document);
        *stats
            .nodes_by_class
            .entry(node.class.to_string())
            .or_insert(0) += 1;
    }
    stats.nodes_classified = routing.len();
    // Nodes land before any edge that references them.
    writer.flush_all();
    info!("Classified {} nodes", stats.nodes_classified);

    let resolver = Resolver::new(&routing, entities);
    let mut dropped = BTreeMap::new();
    for relation in entities.relations() {
        stats.relations += 1;
        match resolver.resolve(relation) {
            Ok(edge) => {
                writer.push(edge.class.as_str(), &edge.document);
                stats.edges_resolved += 1;
                *stats.edges_by_class.entry(edge.class.to_string()).or_insert(0) += 1;
            }
            Err(reason) => {
                trace!(
                    "Dropped {} {} -> {}: {}",
                    relation.rel_type.map(|r| r.as_str()).unwrap_or("?"),
                    relation.source.as_deref().unwrap_or("?"),
                    relation.target.as_deref().unwrap_or("?"),
                    reason
                );
                *dropped.entry(reason).or_insert(0usize) += 1;
            }
        }
    }
    for (reason, count) in &dropped {
        debug!("Dropped {} relations: {}", count, reason);
    }
    stats.dropped = dropped
        .into_iter()
        .map(|(reason, count)| (reason.to_string(), count))
        .collect();
    info!(
        "Resolved {} of {} relations into edges",
        stats.edges_resolved, stats.relations
    );

    let report = writer.finish();
    stats.nodes_written = NodeClass::ALL
        .iter()
        .map(|c| report.delivered_to(c.as_str()))
        .sum();
    stats.edges_written = EdgeClass::ALL
        .iter()
        .map(|c| report.delivered_to(c.as_str()))
        .sum();
    stats.absorb(&report);
    stats.elapsed_ms = start.elapsed().as_millis() as u64;
    stats
}

/// Writes the search representation of `entities` into one collection.
pub fn run_search<S: Sink>(
    entities: &EntityGraph,
    collection: &str,
    mut writer: BatchWriter<S>,
) -> SearchRunStats {
    let start = Instant::now();
    let mut stats = SearchRunStats {
        collection: collection.to_string(),
        entities: entities.len(),
        ..SearchRunStats::default()
    };

    info!("Building search documents for {} entities", entities.len());
    for (qname, entity) in entities.iter() {
        if let Some(doc) = search_document(qname, entity) {
            writer.push(collection, &doc);
            stats.indexed += 1;
        }
    }

    let report = writer.finish();
    stats.written = report.delivered_to(collection);
    stats.absorb(&report);
    stats.elapsed_ms = start.elapsed().as_millis() as u64;
    info!("Indexed {} documents into {}", stats.written, collection);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{storage_key, EntityKind, EntityRecord, RelType, Relation};
    use lattice_sink::MemorySink;

    fn sample() -> EntityGraph {
        let mut g = EntityGraph::new();
        g.insert("app", EntityRecord::new("app", EntityKind::Module));
        g.insert(
            "app.Service",
            EntityRecord::new("Service", EntityKind::Class)
                .with_parent("app")
                .with_relation(Relation::new(RelType::ClassDef, "app.Service", "app")),
        );
        g.insert(
            "app.Service.__init__",
            EntityRecord::new("__init__", EntityKind::Function)
                .with_parent("app.Service")
                .with_relation(Relation::new(
                    RelType::FunctionDef,
                    "app.Service.__init__",
                    "app.Service",
                )),
        );
        g.insert(
            "app.main",
            EntityRecord::new("main", EntityKind::Function)
                .with_parent("app")
                .with_relation(Relation::new(RelType::Calls, "app.main", "app.Service").at(12))
                .with_relation(Relation::new(RelType::CalledBy, "app.Service", "app.main"))
                .with_relation(Relation::new(RelType::Calls, "app.main", "os.getenv")),
        );
        g.insert(
            "app.main.param.argv",
            EntityRecord::new("argv", EntityKind::ParamsOf).with_parent("app.main"),
        );
        g
    }

    #[test]
    fn test_graph_run_counts() {
        let entities = sample();
        let mut sink = MemorySink::new();
        let stats = run_graph(&entities, BatchWriter::new(&mut sink, 1000));

        assert_eq!(stats.entities, 5);
        assert_eq!(stats.nodes_classified, 4);
        assert_eq!(stats.nodes_written, 4);
        assert_eq!(sink.count("functions"), 2);
        assert_eq!(sink.count("types"), 1);
        assert_eq!(sink.count("modules"), 1);

        assert_eq!(stats.relations, 5);
        // FUNCTION_DEF __init__ -> Service, CALLS main -> Service.__init__
        assert_eq!(stats.edges_resolved, 2);
        assert_eq!(stats.edges_written, 2);
        assert_eq!(stats.dropped.get("inverse_rel_type"), Some(&1));
        assert_eq!(stats.dropped.get("unknown_target"), Some(&1));
        assert_eq!(stats.dropped.get("constraint_violation"), Some(&1));
        assert_eq!(stats.dropped_total(), 3);
    }

    #[test]
    fn test_constructor_call_lands_on_init() {
        let entities = sample();
        let mut sink = MemorySink::new();
        run_graph(&entities, BatchWriter::new(&mut sink, 10));

        let calls = sink.documents("calls");
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0]["_to"],
            format!("functions/{}", storage_key("app.Service.__init__"))
        );
        assert_eq!(calls[0]["call_site_pos"], 12);
    }

    #[test]
    fn test_nodes_flushed_before_edges() {
        let entities = sample();
        let mut sink = MemorySink::new();
        run_graph(&entities, BatchWriter::new(&mut sink, 1000));

        let order: Vec<&str> = sink.batches().iter().map(|(c, _)| c.as_str()).collect();
        let first_edge = order
            .iter()
            .position(|c| *c == "calls" || *c == "parent")
            .unwrap();
        assert!(order[..first_edge]
            .iter()
            .all(|c| ["functions", "types", "modules"].contains(c)));
    }

    #[test]
    fn test_search_run() {
        let entities = sample();
        let mut sink = MemorySink::new();
        let stats = run_search(&entities, "code_nodes", BatchWriter::new(&mut sink, 2));

        assert_eq!(stats.indexed, 4);
        assert_eq!(stats.written, 4);
        let ids: Vec<_> = sink
            .documents("code_nodes")
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert!(ids.contains(&"app_Service___init__".to_string()));
        assert!(!ids.iter().any(|id| id.contains("param")));
    }

    #[test]
    fn test_empty_input() {
        let entities = EntityGraph::new();
        let mut sink = MemorySink::new();
        let stats = run_graph(&entities, BatchWriter::new(&mut sink, 10));
        assert_eq!(stats.nodes_written, 0);
        assert_eq!(stats.edges_written, 0);
        assert!(sink.batches().is_empty());
    }
}
