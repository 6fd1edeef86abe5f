//! Node and edge classes of the property graph.
//!
//! The rule set is closed and small, so it is kept as data: a kind table,
//! a relation table and a constraint table. Nothing here is polymorphic.

use lattice_core::{EntityKind, RelType};
use serde::{Deserialize, Serialize};

/// Language tag stamped on every emitted document.
pub const LANGUAGE: &str = "python";

/// The collection a node lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    Functions,
    Types,
    Members,
    Modules,
    Files,
}

impl NodeClass {
    /// Every node class, in provisioning order.
    pub const ALL: [NodeClass; 5] = [
        Self::Functions,
        Self::Types,
        Self::Members,
        Self::Files,
        Self::Modules,
    ];

    /// Collection name in the graph destination.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Functions => "functions",
            Self::Types => "types",
            Self::Members => "members",
            Self::Modules => "modules",
            Self::Files => "files",
        }
    }
}

impl std::fmt::Display for NodeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The collection an edge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClass {
    /// Function calls function.
    Calls,
    /// Type implements type. Declared for the schema; no relation maps here yet.
    Implements,
    /// Type inherits from type.
    Inherits,
    /// Function returns type.
    Returns,
    /// Type is a parameter of function.
    ParamOf,
    /// Definition sits inside a type, file or module.
    Parent,
    /// File or module imports module.
    Imports,
    /// Function or type is decorated by function.
    DecoratedBy,
}

impl EdgeClass {
    /// Every edge class, in provisioning order.
    pub const ALL: [EdgeClass; 8] = [
        Self::Calls,
        Self::Implements,
        Self::Inherits,
        Self::Returns,
        Self::ParamOf,
        Self::Parent,
        Self::Imports,
        Self::DecoratedBy,
    ];

    /// Collection name in the graph destination.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Implements => "implements",
            Self::Inherits => "inherits",
            Self::Returns => "returns",
            Self::ParamOf => "param_of",
            Self::Parent => "parent",
            Self::Imports => "imports",
            Self::DecoratedBy => "decorated_by",
        }
    }

    /// Node classes allowed at the `_from` end.
    pub fn sources(&self) -> &'static [NodeClass] {
        use NodeClass::*;
        match self {
            Self::Calls => &[Functions],
            Self::Implements | Self::Inherits => &[Types],
            Self::Returns => &[Functions],
            Self::ParamOf => &[Types],
            Self::Parent => &[Functions, Members],
            Self::Imports => &[Files, Modules],
            Self::DecoratedBy => &[Functions, Types],
        }
    }

    /// Node classes allowed at the `_to` end.
    pub fn targets(&self) -> &'static [NodeClass] {
        use NodeClass::*;
        match self {
            Self::Calls => &[Functions],
            Self::Implements | Self::Inherits => &[Types],
            Self::Returns => &[Types],
            Self::ParamOf => &[Functions],
            Self::Parent => &[Types, Files, Modules],
            Self::Imports => &[Modules],
            Self::DecoratedBy => &[Functions],
        }
    }

    /// Checks the schema constraint for a (source, target) class pair.
    pub fn permits(&self, from: NodeClass, to: NodeClass) -> bool {
        self.sources().contains(&from) && self.targets().contains(&to)
    }
}

impl std::fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind -> node class table, before any scope rule is applied.
///
/// `None` means the kind never becomes a node.
pub fn node_class_for(kind: EntityKind) -> Option<NodeClass> {
    match kind {
        EntityKind::Class => Some(NodeClass::Types),
        EntityKind::Function | EntityKind::AsyncFunction => Some(NodeClass::Functions),
        EntityKind::Module => Some(NodeClass::Modules),
        EntityKind::Assignment | EntityKind::AugmentedAssignment => Some(NodeClass::Members),
        EntityKind::ParamsOf | EntityKind::Returns | EntityKind::Import | EntityKind::Other => {
            None
        }
    }
}

/// What a relation type maps to in the edge schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelMapping {
    /// Emitted into this edge class.
    Edge(EdgeClass),
    /// Mirror of another relation type that already carries the edge.
    Inverse,
    /// No edge class for this relation type.
    Unmapped,
}

/// rel_type -> edge class table.
pub fn edge_class_for(rel_type: RelType) -> RelMapping {
    match rel_type {
        RelType::Calls => RelMapping::Edge(EdgeClass::Calls),
        RelType::CalledBy => RelMapping::Inverse,
        RelType::InheritsFrom => RelMapping::Edge(EdgeClass::Inherits),
        RelType::DecoratedBy => RelMapping::Edge(EdgeClass::DecoratedBy),
        RelType::ParamOf => RelMapping::Edge(EdgeClass::ParamOf),
        RelType::Returns => RelMapping::Edge(EdgeClass::Returns),
        RelType::Imports => RelMapping::Edge(EdgeClass::Imports),
        RelType::ClassDef | RelType::FunctionDef => RelMapping::Edge(EdgeClass::Parent),
        RelType::Unknown => RelMapping::Unmapped,
    }
}
