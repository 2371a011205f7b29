//! Classified parse tree.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Children are
//! ordered id lists; a query owns its variables through a name-keyed map.

use indexmap::IndexMap;

use super::lines::LineId;
use crate::source::SourceKind;
use crate::span::Span;

/// Index of a node in its [`ParseTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationOp {
    Add,
    Remove,
}

impl MutationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstantType {
    String,
    Number,
}

/// Right-hand side of a binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingValue {
    Variable(NodeId),
    Constant { text: String, ty: ConstantType },
    /// Unparsed expression text.
    Expression { span: Span },
    /// Partially formed after a reported defect.
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    CodeContext {
        source: SourceKind,
    },
    Query {
        name: String,
        variables: IndexMap<String, NodeId>,
    },
    Object {
        variable: Option<NodeId>,
    },
    Binding {
        source: NodeId,
        field: String,
        value: BindingValue,
    },
    Variable {
        name: String,
    },
    Mutation(MutationOp),
    Unknown,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CodeContext { .. } => "CodeContext",
            Self::Query { .. } => "Query",
            Self::Object { .. } => "Object",
            Self::Binding { .. } => "Binding",
            Self::Variable { .. } => "Variable",
            Self::Mutation(_) => "Mutation",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNode {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// 1-based source line; 0 for the code context.
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
    /// Node assigned to each line, indexed by [`LineId`].
    line_nodes: Vec<Option<NodeId>>,
}

impl ParseTree {
    pub(crate) fn new(source: SourceKind, line_count: usize) -> Self {
        let root = ParseNode {
            kind: NodeKind::CodeContext { source },
            children: Vec::new(),
            line: 0,
            column: 0,
            span: Span::default(),
        };
        let mut line_nodes = vec![None; line_count];
        if let Some(slot) = line_nodes.first_mut() {
            *slot = Some(NodeId(0));
        }
        Self {
            nodes: vec![root],
            line_nodes,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ParseNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node a line was classified as, if it has been.
    pub fn line_node(&self, line: LineId) -> Option<NodeId> {
        self.line_nodes.get(line.index()).copied().flatten()
    }

    pub(crate) fn assign_line(&mut self, line: LineId, node: NodeId) {
        self.line_nodes[line.index()] = Some(node);
    }

    pub(crate) fn push(&mut self, node: ParseNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
    }

    /// Query headers in program order.
    pub fn queries(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node(self.root())
            .children
            .iter()
            .copied()
            .filter(|id| matches!(self.node(*id).kind, NodeKind::Query { .. }))
    }

    pub fn query_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Query { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn variable_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Variable { name } => Some(name),
            _ => None,
        }
    }

    /// Attached descendants of `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        order
    }
}
