//! Linked query graph.
//!
//! A [`QueryGraph`] is the root query plus every member query reachable from
//! its control nodes, all keyed by entity id. It is produced by [`link`] from
//! a tag map, which in turn comes either from a literal fact set or from a
//! parse tree run through [`lower`].

mod link;
mod lower;
mod nodes;
mod printer;
mod shape;

#[cfg(test)]
mod link_tests;
#[cfg(test)]
mod shape_tests;

use indexmap::IndexMap;

use evql_core::{EntityId, TreeNode};

pub use link::{LinkError, link};
pub use lower::{lower, lower_query};
pub use nodes::{
    Binding, Choose, ExpressionSource, GraphNode, MutateOp, MutateSource, Not, Query, ScanSource,
    SourceRef, SourceType, Union, Variable,
};
pub use printer::GraphPrinter;
pub use shape::{ExpressionShape, GraphShape, QueryShape, VariableShape};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryGraph {
    root: EntityId,
    /// Root first, then member queries in pre-order.
    queries: IndexMap<EntityId, Query>,
}

impl QueryGraph {
    pub fn root(&self) -> &EntityId {
        &self.root
    }

    pub fn root_query(&self) -> &Query {
        &self.queries[&self.root]
    }

    pub fn query(&self, id: &str) -> Option<&Query> {
        self.queries.get(id)
    }

    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.queries.values()
    }

    /// Any node in the graph by entity id.
    pub fn node(&self, id: &str) -> Option<GraphNode<'_>> {
        self.queries.values().find_map(|query| query.node(id))
    }

    pub fn printer(&self) -> GraphPrinter<'_> {
        GraphPrinter::new(self)
    }

    /// Generic tree form, for dot rendering.
    ///
    /// Queries map to their sections; each node maps its fields to leaves and
    /// its id lists to sets. Empty sections are left out.
    pub fn to_tree(&self) -> TreeNode {
        let mut queries = IndexMap::new();
        for query in self.queries.values() {
            queries.insert(query.id.to_string(), query_tree(query));
        }

        let mut root = IndexMap::new();
        root.insert("root".to_owned(), TreeNode::leaf(self.root.as_str()));
        root.insert("queries".to_owned(), TreeNode::Map(queries));
        TreeNode::Map(root)
    }
}

fn query_tree(query: &Query) -> TreeNode {
    let mut fields = IndexMap::new();
    fields.insert("name".to_owned(), TreeNode::leaf(&query.name));
    if let Some(parent) = &query.parent {
        fields.insert("parent".to_owned(), TreeNode::leaf(parent.as_str()));
    }

    section(&mut fields, "variables", &query.variables, |v| {
        node_tree([("name", TreeNode::leaf(&v.name)), ("bindings", id_set(&v.bindings))])
    });
    section(&mut fields, "bindings", &query.bindings, |b| {
        node_tree([
            ("variable", TreeNode::leaf(b.variable.as_str())),
            ("field", TreeNode::leaf(&b.field)),
            (b.source.kind.as_str(), TreeNode::leaf(b.source.id.as_str())),
        ])
    });
    section(&mut fields, "scans", &query.scans, |s| {
        node_tree([("bindings", id_set(&s.bindings))])
    });
    section(&mut fields, "expressions", &query.expressions, |e| {
        let mut node = node_tree([
            ("bindings", id_set(&e.bindings)),
            ("projection", id_set(&e.projection)),
            ("grouping", id_set(&e.grouping)),
        ]);
        if let Some(operator) = &e.operator {
            node.insert(&["operator"], TreeNode::leaf(operator));
        }
        node
    });
    section(&mut fields, "mutates", &query.mutates, |m| {
        node_tree([
            ("operator", TreeNode::leaf(m.operator.as_str())),
            ("bindings", id_set(&m.bindings)),
        ])
    });
    section(&mut fields, "nots", &query.nots, |n| {
        node_tree([("body", TreeNode::leaf(n.body.as_str()))])
    });
    section(&mut fields, "unions", &query.unions, |u| {
        node_tree([("members", id_set(&u.members))])
    });
    section(&mut fields, "chooses", &query.chooses, |c| {
        node_tree([("members", id_set(&c.members))])
    });

    TreeNode::Map(fields)
}

fn section<T>(
    fields: &mut IndexMap<String, TreeNode>,
    name: &str,
    nodes: &IndexMap<EntityId, T>,
    to_tree: impl Fn(&T) -> TreeNode,
) {
    if nodes.is_empty() {
        return;
    }
    let entries = nodes
        .iter()
        .map(|(id, node)| (id.to_string(), to_tree(node)))
        .collect();
    fields.insert(name.to_owned(), TreeNode::Map(entries));
}

fn node_tree<const N: usize>(fields: [(&str, TreeNode); N]) -> TreeNode {
    TreeNode::Map(
        fields
            .into_iter()
            .map(|(name, node)| (name.to_owned(), node))
            .collect(),
    )
}

fn id_set(ids: &[EntityId]) -> TreeNode {
    TreeNode::Set(ids.iter().map(|id| TreeNode::leaf(id.as_str())).collect())
}
