//! Lowering: classified parse tree to facts.
//!
//! Each query header becomes a root `query` entity. Ids are derived from
//! positions so the same program always lowers to the same facts:
//! `q{n}` for the n-th header, and `q{n}.v{k}`, `q{n}.s{k}`, `q{n}.b{k}` for
//! its variables, sources and bindings.

use tracing::trace;

use evql_core::{EntityId, Fact, Number, Value};

use crate::parser::{BindingValue, ConstantType, MutationOp, NodeId, NodeKind, ParseTree};

/// Lower every query header of `tree`.
pub fn lower(tree: &ParseTree, source: &str) -> Vec<Fact> {
    tree.queries()
        .enumerate()
        .flat_map(|(n, query)| Lowering::new(tree, source, n).run(query))
        .collect()
}

/// Lower a single query header. `query` must be one of `tree.queries()`;
/// any other node lowers to nothing.
pub fn lower_query(tree: &ParseTree, source: &str, query: NodeId) -> Vec<Fact> {
    match tree.queries().position(|q| q == query) {
        Some(n) => Lowering::new(tree, source, n).run(query),
        None => Vec::new(),
    }
}

struct Lowering<'a> {
    tree: &'a ParseTree,
    source: &'a str,
    query: EntityId,
    variables: Vec<(NodeId, EntityId)>,
    next_source: usize,
    next_binding: usize,
    facts: Vec<Fact>,
}

impl<'a> Lowering<'a> {
    fn new(tree: &'a ParseTree, source: &'a str, n: usize) -> Self {
        Self {
            tree,
            source,
            query: EntityId::new(format!("q{n}")),
            variables: Vec::new(),
            next_source: 0,
            next_binding: 0,
            facts: Vec::new(),
        }
    }

    fn run(mut self, query: NodeId) -> Vec<Fact> {
        let tree = self.tree;
        let NodeKind::Query { name, variables } = &tree.node(query).kind else {
            return Vec::new();
        };

        let id = self.query.clone();
        self.fact(&id, "tag", "query");
        self.fact(&id, "name", name.as_str());

        for (k, (name, node)) in variables.iter().enumerate() {
            let variable = EntityId::new(format!("{id}.v{k}"));
            self.fact(&variable, "tag", "variable");
            self.fact(&variable, "query", &id);
            self.fact(&variable, "name", name.as_str());
            self.variables.push((*node, variable));
        }

        self.lower_children(query, None);
        trace!(query = %id, facts = self.facts.len(), "lowered");
        self.facts
    }

    fn lower_children(&mut self, parent: NodeId, mutation: Option<MutationOp>) {
        let tree = self.tree;
        for child in &tree.node(parent).children {
            match &tree.node(*child).kind {
                NodeKind::Object { variable } => self.lower_object(*child, *variable, mutation),
                NodeKind::Mutation(op) => self.lower_children(*child, Some(*op)),
                _ => {}
            }
        }
    }

    fn lower_object(&mut self, object: NodeId, identity: Option<NodeId>, mutation: Option<MutationOp>) {
        let source = EntityId::new(format!("{}.s{}", self.query, self.next_source));
        self.next_source += 1;

        let query = self.query.clone();
        match mutation {
            Some(op) => {
                self.fact(&source, "tag", "mutate");
                self.fact(&source, "query", &query);
                self.fact(&source, "operator", op.as_str());
            }
            None => {
                self.fact(&source, "tag", "scan");
                self.fact(&source, "query", &query);
            }
        }

        if let Some(variable) = identity.and_then(|v| self.variable_id(v)) {
            self.binding(&source, "entity", Some(&variable), None);
        }

        // Nested objects and mutations become sources of their own, in
        // program order alongside the object's bindings.
        let tree = self.tree;
        for child in &tree.node(object).children {
            let (field, value) = match &tree.node(*child).kind {
                NodeKind::Binding { field, value, .. } => (field, value),
                NodeKind::Object { variable } => {
                    self.lower_object(*child, *variable, mutation);
                    continue;
                }
                NodeKind::Mutation(op) => {
                    self.lower_children(*child, Some(*op));
                    continue;
                }
                _ => continue,
            };
            match value {
                BindingValue::Variable(v) => {
                    if let Some(variable) = self.variable_id(*v) {
                        self.binding(&source, field, Some(&variable), None);
                    }
                }
                BindingValue::Constant { text, ty } => {
                    let constant = match ty {
                        ConstantType::String => Value::text(text.as_str()),
                        ConstantType::Number => Number::parse_literal(text)
                            .map(Value::Number)
                            .unwrap_or_else(|| Value::text(text.as_str())),
                    };
                    self.binding(&source, field, None, Some(("value", constant)));
                }
                BindingValue::Expression { span } => {
                    let text = Value::text(&self.source[span.range()]);
                    self.binding(&source, field, None, Some(("text", text)));
                }
                BindingValue::Missing => {}
            }
        }
    }

    /// A `binding` entity. Constant and expression bindings carry no
    /// `variable`, so the linker never picks them up.
    fn binding(
        &mut self,
        source: &EntityId,
        field: &str,
        variable: Option<&EntityId>,
        payload: Option<(&str, Value)>,
    ) {
        let id = EntityId::new(format!("{}.b{}", self.query, self.next_binding));
        self.next_binding += 1;

        self.fact(&id, "tag", "binding");
        if let Some(variable) = variable {
            self.fact(&id, "variable", variable);
        }
        self.fact(&id, "field", field);
        self.fact(&id, "source", source);
        if let Some((attribute, value)) = payload {
            self.fact(&id, attribute, value);
        }
    }

    fn variable_id(&self, node: NodeId) -> Option<EntityId> {
        self.variables
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, id)| id.clone())
    }

    fn fact(&mut self, entity: &EntityId, attribute: &str, value: impl Into<Value>) {
        self.facts.push(Fact::new(entity.clone(), attribute, value));
    }
}
