//! Entity and relation records as emitted by the extractor.
//!
//! Records are read-only for the lifetime of a run. Every field is optional
//! on the wire; the classifier and resolver decide what a missing field means.

use serde::{Deserialize, Serialize};

/// The kind of a code entity.
///
/// Synthetic kinds (`params_of`, `returns`, `import`) and anything the
/// extractor invents later deserialize fine but never become a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Function,
    AsyncFunction,
    Module,
    Assignment,
    AugmentedAssignment,
    ParamsOf,
    Returns,
    Import,
    /// Any kind string not listed above.
    #[serde(other)]
    Other,
}

impl EntityKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::AsyncFunction => "async_function",
            Self::Module => "module",
            Self::Assignment => "assignment",
            Self::AugmentedAssignment => "augmented_assignment",
            Self::ParamsOf => "params_of",
            Self::Returns => "returns",
            Self::Import => "import",
            Self::Other => "other",
        }
    }

    /// True for `function` and `async_function`.
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function | Self::AsyncFunction)
    }

    /// True for `assignment` and `augmented_assignment`.
    pub fn is_assignment(&self) -> bool {
        matches!(self, Self::Assignment | Self::AugmentedAssignment)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The type of a relation between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    Calls,
    /// Mirror of `Calls`; the forward direction already carries the edge.
    CalledBy,
    InheritsFrom,
    DecoratedBy,
    ParamOf,
    Returns,
    Imports,
    ClassDef,
    FunctionDef,
    #[serde(other)]
    Unknown,
}

impl RelType {
    /// Returns the wire name of this relation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "CALLS",
            Self::CalledBy => "CALLED_BY",
            Self::InheritsFrom => "INHERITS_FROM",
            Self::DecoratedBy => "DECORATED_BY",
            Self::ParamOf => "PARAM_OF",
            Self::Returns => "RETURNS",
            Self::Imports => "IMPORTS",
            Self::ClassDef => "CLASS_DEF",
            Self::FunctionDef => "FUNCTION_DEF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A start/end source position pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
}

/// A typed relation attached to its source entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default)]
    pub rel_type: Option<RelType>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// Call-site position, meaningful for `CALLS` only.
    #[serde(default)]
    pub pos: Option<SourceSpan>,
}

impl Relation {
    /// Creates a relation with all three identifying fields present.
    pub fn new(rel_type: RelType, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            rel_type: Some(rel_type),
            source: Some(source.into()),
            target: Some(target.into()),
            pos: None,
        }
    }

    /// Attaches a call-site start position.
    pub fn at(mut self, start: u32) -> Self {
        self.pos = Some(SourceSpan {
            start: Some(start),
            end: None,
        });
        self
    }
}

/// One entity of the input graph, keyed externally by its qname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<EntityKind>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub parent_qualified_name: Option<String>,
    /// Source text; only the search representation carries it.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub pos: Option<SourceSpan>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl EntityRecord {
    /// Creates a record with a name and kind, everything else empty.
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Sets the lexical parent qname.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_qualified_name = Some(parent.into());
        self
    }

    /// Appends a relation.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Start line of the entity, if known.
    pub fn start(&self) -> Option<u32> {
        self.pos.and_then(|p| p.start)
    }

    /// End line of the entity, if known.
    pub fn end(&self) -> Option<u32> {
        self.pos.and_then(|p| p.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_deserializes_to_other() {
        let rec: EntityRecord =
            serde_json::from_str(r#"{"name": "x", "kind": "lambda"}"#).unwrap();
        assert_eq!(rec.kind, Some(EntityKind::Other));
    }

    #[test]
    fn test_relation_wire_format() {
        let rel: Relation = serde_json::from_str(
            r#"{"rel_type": "INHERITS_FROM", "source": "a.B", "target": "a.A", "pos": {"start": 4}}"#,
        )
        .unwrap();
        assert_eq!(rel.rel_type, Some(RelType::InheritsFrom));
        assert_eq!(rel.pos.and_then(|p| p.start), Some(4));

        let odd: Relation = serde_json::from_str(r#"{"rel_type": "USES"}"#).unwrap();
        assert_eq!(odd.rel_type, Some(RelType::Unknown));
        assert!(odd.source.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let rec: EntityRecord = serde_json::from_str("{}").unwrap();
        assert!(rec.kind.is_none());
        assert!(rec.relations.is_empty());
        assert_eq!(rec.start(), None);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(EntityKind::AsyncFunction.is_function());
        assert!(!EntityKind::Class.is_function());
        assert!(EntityKind::AugmentedAssignment.is_assignment());
        assert_eq!(EntityKind::AsyncFunction.to_string(), "async_function");
    }
}
