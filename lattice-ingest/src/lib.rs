//! Lattice Ingest - Runs the transformation end to end
//!
//! Feeds a loaded [`EntityGraph`](lattice_core::EntityGraph) through the
//! transformation engine into a [`BatchWriter`](lattice_sink::BatchWriter),
//! once per destination representation. The two runs share nothing but
//! the read-only input, so they can execute concurrently.
//!
//! ```no_run
//! use lattice_core::EntityGraph;
//! use lattice_ingest::{run_graph, GRAPH_BATCH_SIZE};
//! use lattice_sink::{BatchWriter, MemorySink};
//!
//! let entities = EntityGraph::load("output/output.json").unwrap();
//! let mut sink = MemorySink::new();
//! let stats = run_graph(&entities, BatchWriter::new(&mut sink, GRAPH_BATCH_SIZE));
//! println!("{} nodes, {} edges", stats.nodes_written, stats.edges_written);
//! ```

mod pipeline;
mod stats;

pub use pipeline::{run_graph, run_search};
pub use stats::{GraphRunStats, SearchRunStats};

/// Default batch size for the property graph.
pub const GRAPH_BATCH_SIZE: usize = 1000;

/// Default batch size for search documents.
pub const SEARCH_BATCH_SIZE: usize = 100;

/// Default name of the property graph.
pub const GRAPH_NAME: &str = "codegraph";

/// Default name of the search collection.
pub const SEARCH_COLLECTION: &str = "code_nodes";

/// Default input path.
pub const DEFAULT_INPUT: &str = "output/output.json";
