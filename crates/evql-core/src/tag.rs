//! Tag buckets: entities grouped by their reserved `tag` attribute.

use std::fmt;

use indexmap::IndexMap;

use crate::entity::Entity;

/// Name of the attribute that classifies an entity.
pub const TAG_ATTRIBUTE: &str = "tag";

/// Entity role in the query graph.
///
/// The linker's own tags are a closed set; anything else an application
/// stores lands in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Query,
    Variable,
    Scan,
    Expression,
    Mutate,
    Binding,
    Projection,
    Grouping,
    Not,
    Union,
    Choose,
    Other(String),
}

impl Tag {
    const RESERVED: [(&'static str, Tag); 11] = [
        ("query", Tag::Query),
        ("variable", Tag::Variable),
        ("scan", Tag::Scan),
        ("expression", Tag::Expression),
        ("mutate", Tag::Mutate),
        ("binding", Tag::Binding),
        ("projection", Tag::Projection),
        ("grouping", Tag::Grouping),
        ("not", Tag::Not),
        ("union", Tag::Union),
        ("choose", Tag::Choose),
    ];

    pub fn parse(name: &str) -> Self {
        Self::RESERVED
            .iter()
            .find(|(reserved, _)| *reserved == name)
            .map(|(_, tag)| tag.clone())
            .unwrap_or_else(|| Self::Other(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Query => "query",
            Self::Variable => "variable",
            Self::Scan => "scan",
            Self::Expression => "expression",
            Self::Mutate => "mutate",
            Self::Binding => "binding",
            Self::Projection => "projection",
            Self::Grouping => "grouping",
            Self::Not => "not",
            Self::Union => "union",
            Self::Choose => "choose",
            Self::Other(name) => name,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities bucketed by tag, plus a bucket for entities without one.
///
/// Bucket order and the order inside each bucket follow the input order.
#[derive(Clone, Debug, Default)]
pub struct TagMap {
    buckets: IndexMap<Tag, Vec<Entity>>,
    untagged: Vec<Entity>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities carrying `tag`; empty when the bucket was never created.
    pub fn get(&self, tag: &Tag) -> &[Entity] {
        self.buckets.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn untagged(&self) -> &[Entity] {
        &self.untagged
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &[Entity])> {
        self.buckets.iter().map(|(tag, list)| (tag, list.as_slice()))
    }

    /// Number of tagged buckets (the untagged bucket is not counted).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.untagged.is_empty()
    }

    fn push(&mut self, entity: Entity) {
        match entity.text(TAG_ATTRIBUTE) {
            Some(name) => {
                let tag = Tag::parse(name);
                self.buckets.entry(tag).or_default().push(entity);
            }
            None => self.untagged.push(entity),
        }
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let untagged = ("$$untagged", self.untagged.as_slice());
        let buckets = self
            .buckets
            .iter()
            .map(|(tag, list)| (tag.as_str(), list.as_slice()))
            .chain(std::iter::once(untagged));

        writeln!(f, "{{")?;
        for (name, entities) in buckets {
            writeln!(f, "  {name}: [")?;
            for (i, entity) in entities.iter().enumerate() {
                writeln!(f, "    {i}: {entity},")?;
            }
            writeln!(f, "  ],")?;
        }
        write!(f, "}}")
    }
}

/// Group entities by their `tag` attribute in a single stable pass.
///
/// Entities without a textual `tag` go to the untagged bucket.
pub fn index_by_tag(entities: impl IntoIterator<Item = Entity>) -> TagMap {
    let mut map = TagMap::new();
    for entity in entities {
        map.push(entity);
    }
    tracing::debug!(
        buckets = map.len(),
        untagged = map.untagged.len(),
        "indexed entities by tag"
    );
    map
}
