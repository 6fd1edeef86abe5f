//! Search documents.
//!
//! The search destination gets a flat, denormalized record per entity:
//! the graph document's fields minus the graph plumbing, plus source text
//! and the lexical name variants that make fuzzy matching work.

use crate::schema::LANGUAGE;
use lattice_core::{name_variants, EntityKind, EntityRecord};
use serde::{Deserialize, Serialize};

/// qname fragments of synthetic entities (parameters, return slots, yields).
const SYNTHETIC_MARKERS: [&str; 3] = [".param.", ".return", ".yields."];

/// One record in the search collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub qname: String,
    pub name: String,
    pub name_variants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub kind: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

/// Returns true if the entity belongs in the search collection.
pub fn is_indexable(qname: &str, entity: &EntityRecord) -> bool {
    let indexable_kind = matches!(
        entity.kind,
        Some(
            EntityKind::Class
                | EntityKind::Function
                | EntityKind::AsyncFunction
                | EntityKind::Module
                | EntityKind::Assignment
        )
    );
    indexable_kind && !SYNTHETIC_MARKERS.iter().any(|m| qname.contains(m))
}

/// Search destination identifier: `/` and `.` become `_`.
///
/// Independent of the graph key codec; the search engine only needs a
/// readable, URL-safe id.
pub fn search_id(qname: &str) -> String {
    qname.replace(['/', '.'], "_")
}

/// Builds the search document of an entity, or `None` if it is not indexable.
pub fn search_document(qname: &str, entity: &EntityRecord) -> Option<SearchDocument> {
    if !is_indexable(qname, entity) {
        return None;
    }

    let name = entity
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| qname.rsplit('.').next().unwrap_or(qname).to_string());
    let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());

    Some(SearchDocument {
        id: search_id(qname),
        qname: qname.to_string(),
        name_variants: name_variants(&name),
        name,
        code: non_empty(&entity.code),
        doc: non_empty(&entity.docstring),
        kind: entity
            .kind
            .map(|k| k.as_str())
            .unwrap_or("unknown")
            .to_string(),
        language: LANGUAGE.to_string(),
        filepath: non_empty(&entity.filepath),
        namespace: non_empty(&entity.parent_qualified_name),
        pos: entity.start().filter(|&p| p > 0),
        end: entity.end().filter(|&p| p > 0),
    })
}
