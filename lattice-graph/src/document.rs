//! Documents written to the graph destination.
//!
//! These are the "lean" records: no source text, only what graph traversal
//! queries need. Keys are derived from content, never from position.

use crate::schema::{EdgeClass, NodeClass};
use serde::{Deserialize, Serialize};

/// A node record in one of the node collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(rename = "_key")]
    pub key: String,
    pub qname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized kind; `async_function` is reported as `function`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    /// Parent qname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    pub is_async: bool,
    pub is_method: bool,
}

/// A classified entity: its collection plus its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub class: NodeClass,
    pub document: NodeDocument,
}

/// An edge record in one of the edge collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDocument {
    #[serde(rename = "_key")]
    pub key: String,
    /// `<node class>/<key>` of the source node.
    #[serde(rename = "_from")]
    pub from: String,
    /// `<node class>/<key>` of the target node.
    #[serde(rename = "_to")]
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_site_pos: Option<u32>,
}

/// A resolved relation: its edge collection, endpoint classes and document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub class: EdgeClass,
    pub from_class: NodeClass,
    pub to_class: NodeClass,
    pub document: EdgeDocument,
}

/// Builds the `<collection>/<key>` handle of a node.
pub fn node_handle(class: NodeClass, key: &str) -> String {
    format!("{}/{}", class, key)
}
