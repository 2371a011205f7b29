//! Query graph linker.
//!
//! Builds a [`QueryGraph`] from tag-bucketed entities. Each query is linked in
//! two passes: shells for every variable and source first, then bindings,
//! projections and groupings that cross-link them. Control nodes (`not`,
//! `union`, `choose`) recurse into their member queries.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use evql_core::{Entity, EntityId, Number, Tag, TagMap, Value};

use super::QueryGraph;
use super::nodes::{
    Binding, Choose, ExpressionSource, MutateOp, MutateSource, Not, Query, ScanSource, SourceRef,
    Union, Variable,
};

/// Errors that make a tag map unlinkable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("no root query: every `query` entity has a `parent`")]
    MissingRoot,

    #[error("multiple root queries: `{first}` and `{second}`")]
    MultipleRoots { first: EntityId, second: EntityId },

    #[error("binding `{binding}` in query `{query}` names unknown source `{source_id}`")]
    UnknownSource {
        query: EntityId,
        binding: EntityId,
        source_id: String,
    },

    #[error("`{entity}` in query `{query}` names unknown variable `{variable}`")]
    UnknownVariable {
        query: EntityId,
        entity: EntityId,
        variable: String,
    },

    #[error("`{entity}` has no `{attribute}` attribute")]
    MissingAttribute {
        entity: EntityId,
        attribute: &'static str,
    },

    #[error("`{entity}` attribute `{attribute}` should be {expected}, found {found}")]
    AttributeType {
        entity: EntityId,
        attribute: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{entity}` has unknown mutate operator `{operator}`")]
    InvalidOperator { entity: EntityId, operator: String },

    #[error("not `{entity}` needs exactly one body query, found {count}")]
    NotBody { entity: EntityId, count: usize },

    #[error("query `{query}` is reachable from itself")]
    QueryCycle { query: EntityId },
}

/// Link the unique root query of `tag_map` and everything it reaches.
pub fn link(tag_map: &TagMap) -> Result<QueryGraph, LinkError> {
    let mut roots = tag_map
        .get(&Tag::Query)
        .iter()
        .filter(|query| !query.has("parent"));

    let root = roots.next().ok_or(LinkError::MissingRoot)?;
    if let Some(second) = roots.next() {
        return Err(LinkError::MultipleRoots {
            first: root.id().clone(),
            second: second.id().clone(),
        });
    }

    let mut linker = Linker::new(tag_map);
    linker.build_query(root)?;
    debug!(root = %root.id(), queries = linker.queries.len(), "linked graph");

    Ok(QueryGraph {
        root: root.id().clone(),
        queries: linker.queries,
    })
}

/// Entities grouped by the text of one of their attributes, in fact order.
type Owned<'t> = IndexMap<&'t str, Vec<&'t Entity>>;

fn owned_by<'t>(entities: &'t [Entity], attribute: &str) -> Owned<'t> {
    let mut owned: Owned<'t> = IndexMap::new();
    for entity in entities {
        if let Some(owner) = entity.text(attribute) {
            owned.entry(owner).or_default().push(entity);
        }
    }
    owned
}

pub(super) struct Linker<'t> {
    variables: Owned<'t>,
    scans: Owned<'t>,
    expressions: Owned<'t>,
    mutates: Owned<'t>,
    nots: Owned<'t>,
    unions: Owned<'t>,
    chooses: Owned<'t>,
    bindings: Owned<'t>,
    projections: Owned<'t>,
    groupings: Owned<'t>,
    members: Owned<'t>,
    visited: IndexSet<EntityId>,
    queries: IndexMap<EntityId, Query>,
}

impl<'t> Linker<'t> {
    pub(super) fn new(tags: &'t TagMap) -> Self {
        Self {
            variables: owned_by(tags.get(&Tag::Variable), "query"),
            scans: owned_by(tags.get(&Tag::Scan), "query"),
            expressions: owned_by(tags.get(&Tag::Expression), "query"),
            mutates: owned_by(tags.get(&Tag::Mutate), "query"),
            nots: owned_by(tags.get(&Tag::Not), "query"),
            unions: owned_by(tags.get(&Tag::Union), "query"),
            chooses: owned_by(tags.get(&Tag::Choose), "query"),
            bindings: owned_by(tags.get(&Tag::Binding), "variable"),
            projections: owned_by(tags.get(&Tag::Projection), "expression"),
            groupings: owned_by(tags.get(&Tag::Grouping), "expression"),
            members: owned_by(tags.get(&Tag::Query), "parent"),
            visited: IndexSet::new(),
            queries: IndexMap::new(),
        }
    }

    fn owned(map: &Owned<'t>, owner: &str) -> Vec<&'t Entity> {
        map.get(owner).cloned().unwrap_or_default()
    }

    pub(super) fn build_query(&mut self, entity: &'t Entity) -> Result<(), LinkError> {
        let id = entity.id().clone();
        if !self.visited.insert(id.clone()) {
            return Err(LinkError::QueryCycle { query: id });
        }

        let name = optional_text(entity, "name")?.unwrap_or(id.as_str()).to_owned();
        let parent = optional_text(entity, "parent")?.map(EntityId::from);
        let mut query = Query::new(id.clone(), name, parent);
        // Members are inserted while this query is still being built; the
        // reserved slot keeps the map in pre-order.
        let slot = self.queries.len();

        self.build_shells(&mut query)?;
        self.link_bindings(&mut query)?;
        self.link_expressions(&mut query)?;
        self.build_controls(&mut query)?;

        debug!(
            query = %id,
            variables = query.variables.len(),
            bindings = query.bindings.len(),
            "linked query"
        );
        self.queries.shift_insert(slot, id, query);
        Ok(())
    }

    /// Pass 1: every variable and source owned by the query, without links.
    fn build_shells(&self, query: &mut Query) -> Result<(), LinkError> {
        let owner = query.id.as_str();

        for entity in Self::owned(&self.variables, owner) {
            let id = entity.id().clone();
            let name = optional_text(entity, "name")?.unwrap_or(id.as_str()).to_owned();
            let variable = Variable {
                id: id.clone(),
                name,
                bindings: Vec::new(),
            };
            query.variables.insert(id, variable);
        }

        for entity in Self::owned(&self.scans, owner) {
            let id = entity.id().clone();
            let scan = ScanSource {
                id: id.clone(),
                bindings: Vec::new(),
            };
            query.scans.insert(id, scan);
        }

        for entity in Self::owned(&self.expressions, owner) {
            let id = entity.id().clone();
            let expression = ExpressionSource {
                id: id.clone(),
                operator: optional_text(entity, "operator")?.map(str::to_owned),
                bindings: Vec::new(),
                projection: Vec::new(),
                grouping: Vec::new(),
            };
            query.expressions.insert(id, expression);
        }

        for entity in Self::owned(&self.mutates, owner) {
            let id = entity.id().clone();
            let text = required_text(entity, "operator")?;
            let operator = MutateOp::parse(text).ok_or_else(|| LinkError::InvalidOperator {
                entity: id.clone(),
                operator: text.to_owned(),
            })?;
            let mutate = MutateSource {
                id: id.clone(),
                operator,
                bindings: Vec::new(),
            };
            query.mutates.insert(id, mutate);
        }

        Ok(())
    }

    /// Pass 2: bindings of each variable, pushed onto both the variable and
    /// its source.
    fn link_bindings(&self, query: &mut Query) -> Result<(), LinkError> {
        let variables: Vec<EntityId> = query.variables.keys().cloned().collect();

        for variable in &variables {
            for entity in Self::owned(&self.bindings, variable.as_str()) {
                let id = entity.id().clone();
                let field = required_text(entity, "field")?.to_owned();
                let source_id = required_text(entity, "source")?;
                let kind = query
                    .source_type(source_id)
                    .ok_or_else(|| LinkError::UnknownSource {
                        query: query.id.clone(),
                        binding: id.clone(),
                        source_id: source_id.to_owned(),
                    })?;
                let source = SourceRef {
                    kind,
                    id: EntityId::from(source_id),
                };

                trace!(binding = %id, variable = %variable, source = %source.id, "binding");
                if let Some(bindings) = query.source_bindings_mut(&source) {
                    bindings.push(id.clone());
                }
                if let Some(node) = query.variables.get_mut(variable) {
                    node.bindings.push(id.clone());
                }
                let binding = Binding {
                    id: id.clone(),
                    variable: variable.clone(),
                    field,
                    source,
                };
                query.bindings.insert(id, binding);
            }
        }

        Ok(())
    }

    /// Projections in fact order; groupings ordered by `ix`, ties in fact
    /// order.
    fn link_expressions(&self, query: &mut Query) -> Result<(), LinkError> {
        let expressions: Vec<EntityId> = query.expressions.keys().cloned().collect();

        for expression in &expressions {
            let mut projection = Vec::new();
            for entity in Self::owned(&self.projections, expression.as_str()) {
                projection.push(resolve_variable(query, entity)?);
            }

            let mut grouping = Vec::new();
            for entity in Self::owned(&self.groupings, expression.as_str()) {
                let ix = required_number(entity, "ix")?.int_part();
                grouping.push((ix, resolve_variable(query, entity)?));
            }
            grouping.sort_by_key(|(ix, _)| *ix);

            if let Some(node) = query.expressions.get_mut(expression) {
                node.projection = projection;
                node.grouping = grouping.into_iter().map(|(_, variable)| variable).collect();
            }
        }

        Ok(())
    }

    fn build_controls(&mut self, query: &mut Query) -> Result<(), LinkError> {
        let owner = query.id.clone();

        for entity in Self::owned(&self.nots, owner.as_str()) {
            let id = entity.id().clone();
            let members = self.build_members(entity)?;
            let count = members.len();
            let Ok([body]) = <[EntityId; 1]>::try_from(members) else {
                return Err(LinkError::NotBody { entity: id, count });
            };
            query.nots.insert(id.clone(), Not { id, body });
        }

        for entity in Self::owned(&self.unions, owner.as_str()) {
            let id = entity.id().clone();
            let members = self.build_members(entity)?;
            query.unions.insert(id.clone(), Union { id, members });
        }

        for entity in Self::owned(&self.chooses, owner.as_str()) {
            let id = entity.id().clone();
            let members = self.build_members(entity)?;
            query.chooses.insert(id.clone(), Choose { id, members });
        }

        Ok(())
    }

    /// Link every query whose `parent` is `control`, in fact order.
    fn build_members(&mut self, control: &Entity) -> Result<Vec<EntityId>, LinkError> {
        let members = Self::owned(&self.members, control.id().as_str());
        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            self.build_query(member)?;
            ids.push(member.id().clone());
        }
        Ok(ids)
    }
}

fn resolve_variable(query: &Query, entity: &Entity) -> Result<EntityId, LinkError> {
    let variable = required_text(entity, "variable")?;
    if !query.variables.contains_key(variable) {
        return Err(LinkError::UnknownVariable {
            query: query.id.clone(),
            entity: entity.id().clone(),
            variable: variable.to_owned(),
        });
    }
    Ok(EntityId::from(variable))
}

fn required_text<'e>(entity: &'e Entity, attribute: &'static str) -> Result<&'e str, LinkError> {
    optional_text(entity, attribute)?.ok_or_else(|| LinkError::MissingAttribute {
        entity: entity.id().clone(),
        attribute,
    })
}

fn optional_text<'e>(
    entity: &'e Entity,
    attribute: &'static str,
) -> Result<Option<&'e str>, LinkError> {
    match entity.get(attribute) {
        None => Ok(None),
        Some(Value::Text(text)) => Ok(Some(text)),
        Some(other) => Err(type_error(entity, attribute, "text", other)),
    }
}

fn required_number(entity: &Entity, attribute: &'static str) -> Result<Number, LinkError> {
    match entity.get(attribute) {
        None => Err(LinkError::MissingAttribute {
            entity: entity.id().clone(),
            attribute,
        }),
        Some(Value::Number(number)) => Ok(*number),
        Some(other) => Err(type_error(entity, attribute, "number", other)),
    }
}

fn type_error(
    entity: &Entity,
    attribute: &'static str,
    expected: &'static str,
    found: &Value,
) -> LinkError {
    LinkError::AttributeType {
        entity: entity.id().clone(),
        attribute,
        expected,
        found: found.kind_name(),
    }
}
