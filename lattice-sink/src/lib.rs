//! Lattice Sink - Where documents go
//!
//! This crate writes the documents produced by the transformation engine
//! to a destination in bounded-memory batches.
//!
//! Destinations:
//! - [`ArangoSink`]: the property graph, via ArangoDB bulk import
//! - [`TypesenseSink`]: the search documents, via Typesense JSONL import
//! - [`StoreSink`]: a local sled mirror of either, for offline runs
//! - [`MemorySink`]: in-memory, for dry runs and tests
//!
//! All of them upsert by document key, so a re-run never duplicates.

mod arango;
mod batch;
mod error;
mod http;
mod sink;
mod store;
mod typesense;

pub use arango::{graph_definition, ArangoConfig, ArangoSink};
pub use batch::{BatchWriter, WriteReport};
pub use error::SinkError;
pub use http::{base_url, Provisioned};
pub use sink::{MemorySink, Sink};
pub use store::StoreSink;
pub use typesense::{collection_schema, TypesenseConfig, TypesenseSink};
