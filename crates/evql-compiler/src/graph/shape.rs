//! Id-free summaries of query graphs.
//!
//! Two graphs with the same shape differ at most in entity ids and map
//! order. Used to compare a lowered program against hand-written facts.

use evql_core::EntityId;

use super::QueryGraph;
use super::nodes::{Binding, Query};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphShape {
    /// In graph order: root first, then members in pre-order.
    pub queries: Vec<QueryShape>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryShape {
    pub name: String,
    /// Sorted by name, then by bindings.
    pub variables: Vec<VariableShape>,
    pub scans: usize,
    /// Sorted operator names.
    pub mutates: Vec<String>,
    /// Sorted.
    pub expressions: Vec<ExpressionShape>,
    pub nots: usize,
    /// Member counts, sorted.
    pub unions: Vec<usize>,
    pub chooses: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableShape {
    pub name: String,
    /// Sorted `(source kind, field)` pairs.
    pub bindings: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpressionShape {
    pub operator: Option<String>,
    /// Sorted `(variable name, field)` pairs.
    pub bindings: Vec<(String, String)>,
    /// Variable names, in order.
    pub projection: Vec<String>,
    pub grouping: Vec<String>,
}

impl GraphShape {
    pub fn of(graph: &QueryGraph) -> Self {
        Self {
            queries: graph.queries().map(QueryShape::of).collect(),
        }
    }
}

impl QueryShape {
    pub fn of(query: &Query) -> Self {
        let mut variables: Vec<VariableShape> = query
            .variables
            .values()
            .map(|variable| {
                let mut bindings: Vec<(String, String)> = variable
                    .bindings
                    .iter()
                    .filter_map(|id| query.bindings.get(id))
                    .map(|b| (b.source.kind.as_str().to_owned(), b.field.clone()))
                    .collect();
                bindings.sort();
                VariableShape {
                    name: variable.name.clone(),
                    bindings,
                }
            })
            .collect();
        variables.sort();

        let mut expressions: Vec<ExpressionShape> = query
            .expressions
            .values()
            .map(|expression| {
                let mut bindings: Vec<(String, String)> = expression
                    .bindings
                    .iter()
                    .filter_map(|id| query.bindings.get(id))
                    .map(|b| (variable_name(query, b), b.field.clone()))
                    .collect();
                bindings.sort();
                ExpressionShape {
                    operator: expression.operator.clone(),
                    bindings,
                    projection: names(query, &expression.projection),
                    grouping: names(query, &expression.grouping),
                }
            })
            .collect();
        expressions.sort();

        let mut mutates: Vec<String> = query
            .mutates
            .values()
            .map(|m| m.operator.as_str().to_owned())
            .collect();
        mutates.sort();

        let mut unions: Vec<usize> = query.unions.values().map(|u| u.members.len()).collect();
        unions.sort();
        let mut chooses: Vec<usize> = query.chooses.values().map(|c| c.members.len()).collect();
        chooses.sort();

        Self {
            name: query.name.clone(),
            variables,
            scans: query.scans.len(),
            mutates,
            expressions,
            nots: query.nots.len(),
            unions,
            chooses,
        }
    }
}

fn variable_name(query: &Query, binding: &Binding) -> String {
    query
        .variables
        .get(&binding.variable)
        .map_or_else(|| binding.variable.to_string(), |v| v.name.clone())
}

fn names(query: &Query, ids: &[EntityId]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            query
                .variables
                .get(id)
                .map_or_else(|| id.to_string(), |v| v.name.clone())
        })
        .collect()
}
