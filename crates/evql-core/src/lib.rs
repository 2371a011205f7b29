#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for evql.
//!
//! Everything the fact-driven pipeline needs before linking:
//! - **Values**: the tagged `text | number | boolean` union carried by facts
//! - **Facts**: EAV triples, plus the JSON adapter for literal fact arrays
//! - **Entities**: per-entity attribute maps folded from facts
//! - **Tags**: entities grouped by their reserved `tag` attribute
//! - **Store**: the concurrent fact store contract and an in-memory store
//! - **Tree**: a generic map/set/leaf tree with a Graphviz renderer

pub mod entity;
pub mod fact;
pub mod store;
pub mod tag;
pub mod tree;
pub mod value;


pub use entity::{Entities, Entity, materialize};
pub use fact::{DecodeError, Fact, facts_from_json, facts_to_json};
pub use store::{FactStore, Listener, MemoryFactStore, SubscriptionId};
pub use tag::{Tag, TagMap, index_by_tag};
pub use tree::TreeNode;
pub use value::{EntityId, Number, Value};
