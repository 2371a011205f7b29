//! Query graph node types.
//!
//! Nodes never point at each other. Every cross-reference is the target's
//! entity id, resolved through the owning [`Query`]'s maps.

use std::fmt;

use indexmap::IndexMap;

use evql_core::EntityId;

/// Which kind of source a binding reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceType {
    Scan,
    Expression,
    Mutate,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Expression => "expression",
            Self::Mutate => "mutate",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub kind: SourceType,
    pub id: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutateOp {
    Add,
    Remove,
    Update,
}

impl MutateOp {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "update" => Some(Self::Update),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub id: EntityId,
    pub name: String,
    pub bindings: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub id: EntityId,
    pub variable: EntityId,
    pub field: String,
    pub source: SourceRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanSource {
    pub id: EntityId,
    pub bindings: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionSource {
    pub id: EntityId,
    pub operator: Option<String>,
    pub bindings: Vec<EntityId>,
    pub projection: Vec<EntityId>,
    /// Ordered by the grouping facts' `ix`.
    pub grouping: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutateSource {
    pub id: EntityId,
    pub operator: MutateOp,
    pub bindings: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Not {
    pub id: EntityId,
    pub body: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Union {
    pub id: EntityId,
    pub members: Vec<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choose {
    pub id: EntityId,
    pub members: Vec<EntityId>,
}

/// A query and every node it owns, each map keyed by entity id in fact order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub id: EntityId,
    pub name: String,
    pub parent: Option<EntityId>,
    pub variables: IndexMap<EntityId, Variable>,
    pub bindings: IndexMap<EntityId, Binding>,
    pub scans: IndexMap<EntityId, ScanSource>,
    pub expressions: IndexMap<EntityId, ExpressionSource>,
    pub mutates: IndexMap<EntityId, MutateSource>,
    pub nots: IndexMap<EntityId, Not>,
    pub unions: IndexMap<EntityId, Union>,
    pub chooses: IndexMap<EntityId, Choose>,
}

impl Query {
    pub(crate) fn new(id: EntityId, name: String, parent: Option<EntityId>) -> Self {
        Self {
            id,
            name,
            parent,
            variables: IndexMap::new(),
            bindings: IndexMap::new(),
            scans: IndexMap::new(),
            expressions: IndexMap::new(),
            mutates: IndexMap::new(),
            nots: IndexMap::new(),
            unions: IndexMap::new(),
            chooses: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_named(&self, name: &str) -> Option<&Variable> {
        self.variables.values().find(|v| v.name == name)
    }

    /// Binding list of the source `source` points at.
    pub fn source_bindings(&self, source: &SourceRef) -> Option<&[EntityId]> {
        let bindings = match source.kind {
            SourceType::Scan => &self.scans.get(&source.id)?.bindings,
            SourceType::Expression => &self.expressions.get(&source.id)?.bindings,
            SourceType::Mutate => &self.mutates.get(&source.id)?.bindings,
        };
        Some(bindings)
    }

    pub(crate) fn source_bindings_mut(&mut self, source: &SourceRef) -> Option<&mut Vec<EntityId>> {
        let bindings = match source.kind {
            SourceType::Scan => &mut self.scans.get_mut(&source.id)?.bindings,
            SourceType::Expression => &mut self.expressions.get_mut(&source.id)?.bindings,
            SourceType::Mutate => &mut self.mutates.get_mut(&source.id)?.bindings,
        };
        Some(bindings)
    }

    /// Which source map holds `id`, if any.
    pub fn source_type(&self, id: &str) -> Option<SourceType> {
        if self.scans.contains_key(id) {
            Some(SourceType::Scan)
        } else if self.expressions.contains_key(id) {
            Some(SourceType::Expression)
        } else if self.mutates.contains_key(id) {
            Some(SourceType::Mutate)
        } else {
            None
        }
    }

    /// Any node this query owns, looked up by id.
    pub fn node(&self, id: &str) -> Option<GraphNode<'_>> {
        if self.id.as_str() == id {
            return Some(GraphNode::Query(self));
        }
        self.variables
            .get(id)
            .map(GraphNode::Variable)
            .or_else(|| self.bindings.get(id).map(GraphNode::Binding))
            .or_else(|| self.scans.get(id).map(GraphNode::Scan))
            .or_else(|| self.expressions.get(id).map(GraphNode::Expression))
            .or_else(|| self.mutates.get(id).map(GraphNode::Mutate))
            .or_else(|| self.nots.get(id).map(GraphNode::Not))
            .or_else(|| self.unions.get(id).map(GraphNode::Union))
            .or_else(|| self.chooses.get(id).map(GraphNode::Choose))
    }
}

/// Borrowed view of any graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphNode<'g> {
    Query(&'g Query),
    Variable(&'g Variable),
    Binding(&'g Binding),
    Scan(&'g ScanSource),
    Expression(&'g ExpressionSource),
    Mutate(&'g MutateSource),
    Not(&'g Not),
    Union(&'g Union),
    Choose(&'g Choose),
}

impl<'g> GraphNode<'g> {
    pub fn id(self) -> &'g EntityId {
        match self {
            Self::Query(n) => &n.id,
            Self::Variable(n) => &n.id,
            Self::Binding(n) => &n.id,
            Self::Scan(n) => &n.id,
            Self::Expression(n) => &n.id,
            Self::Mutate(n) => &n.id,
            Self::Not(n) => &n.id,
            Self::Union(n) => &n.id,
            Self::Choose(n) => &n.id,
        }
    }

    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Query(_) => "Query",
            Self::Variable(_) => "Variable",
            Self::Binding(_) => "Binding",
            Self::Scan(_) => "Scan",
            Self::Expression(_) => "Expression",
            Self::Mutate(_) => "Mutate",
            Self::Not(_) => "Not",
            Self::Union(_) => "Union",
            Self::Choose(_) => "Choose",
        }
    }
}
