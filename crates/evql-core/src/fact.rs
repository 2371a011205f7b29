//! EAV facts and the JSON adapter for literal fact arrays.
//!
//! The wire shape is an array of `[entity, attribute, value]` triples where
//! `value` is a string, an integer, a float or a boolean.

use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

use crate::value::{EntityId, Number, Value};

/// A single `(entity, attribute, value)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fact {
    pub entity: EntityId,
    pub attribute: String,
    pub value: Value,
}

impl Fact {
    pub fn new(
        entity: impl Into<EntityId>,
        attribute: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            entity: entity.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{e: {:?}, a: {:?}, v: {}}}",
            self.entity.as_str(),
            self.attribute,
            self.value
        )
    }
}

impl Serialize for Fact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.entity)?;
        tuple.serialize_element(&self.attribute)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// Errors produced while decoding a literal fact array.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid fact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of facts")]
    NotAnArray,

    #[error("fact {index}: expected `[entity, attribute, value]`")]
    Shape { index: usize },

    #[error("fact {index}: {slot} must be a string")]
    NotAString { index: usize, slot: &'static str },

    #[error("fact {index}: unsupported value `{value}`")]
    UnsupportedValue { index: usize, value: String },
}

/// Decode a JSON array of `[entity, attribute, value]` triples.
pub fn facts_from_json(json: &str) -> Result<Vec<Fact>, DecodeError> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = parsed else {
        return Err(DecodeError::NotAnArray);
    };

    let facts = items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_fact(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = facts.len(), "decoded facts");
    Ok(facts)
}

fn decode_fact(index: usize, item: &serde_json::Value) -> Result<Fact, DecodeError> {
    let Some([entity, attribute, value]) = item.as_array().map(Vec::as_slice) else {
        return Err(DecodeError::Shape { index });
    };

    let entity = entity.as_str().ok_or(DecodeError::NotAString {
        index,
        slot: "entity",
    })?;
    let attribute = attribute.as_str().ok_or(DecodeError::NotAString {
        index,
        slot: "attribute",
    })?;

    Ok(Fact::new(entity, attribute, decode_value(index, value)?))
}

fn decode_value(index: usize, value: &serde_json::Value) -> Result<Value, DecodeError> {
    match value {
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(Number::from_i64(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Number(Number::new(f)))
            } else {
                Err(DecodeError::UnsupportedValue {
                    index,
                    value: n.to_string(),
                })
            }
        }
        other => Err(DecodeError::UnsupportedValue {
            index,
            value: other.to_string(),
        }),
    }
}

/// Encode facts in the same array-of-triples shape, one fact per line.
pub fn facts_to_json(facts: &[Fact]) -> Result<String, serde_json::Error> {
    if facts.is_empty() {
        return Ok("[]".to_owned());
    }

    let mut out = String::from("[\n");
    for (i, fact) in facts.iter().enumerate() {
        out.push_str("  ");
        out.push_str(&serde_json::to_string(fact)?);
        if i + 1 < facts.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push(']');
    Ok(out)
}
