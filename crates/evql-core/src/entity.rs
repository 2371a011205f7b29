//! Entities materialized from facts.

use std::fmt;

use indexmap::IndexMap;

use crate::fact::Fact;
use crate::value::{EntityId, Value};

/// An entity id plus its attribute mapping.
///
/// Attributes keep the order in which they were first written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    attributes: IndexMap<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter, mostly for tests.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(attribute, value);
        self
    }

    #[inline]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Set an attribute. A later write for the same name replaces the earlier
    /// value in place.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Text value of an attribute, if present and textual.
    pub fn text(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(Value::as_text)
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    /// True when `attribute` holds exactly the text `expected`.
    pub fn text_equals(&self, attribute: &str, expected: &str) -> bool {
        self.text(attribute) == Some(expected)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity<{}>{{", self.id)?;
        for (i, (attr, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{attr}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Entities keyed by id, in order of first appearance in the fact list.
pub type Entities = IndexMap<EntityId, Entity>;

/// Fold a fact list into per-entity attribute maps.
///
/// Single left-to-right pass. When two facts share an (entity, attribute)
/// pair the later one wins.
pub fn materialize<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> Entities {
    let mut entities = Entities::new();
    let mut overwritten = 0usize;

    for fact in facts {
        let entity = entities
            .entry(fact.entity.clone())
            .or_insert_with(|| Entity::new(fact.entity.clone()));
        if entity.has(&fact.attribute) {
            overwritten += 1;
        }
        entity.insert(fact.attribute.clone(), fact.value.clone());
    }

    tracing::debug!(entities = entities.len(), overwritten, "materialized entities");
    entities
}
