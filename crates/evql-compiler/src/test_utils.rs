//! Helpers shared by the compiler's test modules.

use evql_core::{Fact, TagMap, facts_from_json, index_by_tag, materialize};

use crate::graph::{LinkError, QueryGraph, link};
use crate::program::{ProgramBuilder, ProgramParsed};

/// Parse with default settings. Panics on the nesting limit.
pub fn parse(source: &str) -> ProgramParsed<'_> {
    ProgramBuilder::new(source)
        .parse()
        .expect("program within nesting limit")
}

pub fn dump_tree(source: &str) -> String {
    parse(source).dump_tree()
}

/// Filtered diagnostics, one plain `severity at line:col: message` per row.
pub fn dump_diagnostics(source: &str) -> String {
    parse(source)
        .diagnostics()
        .filtered()
        .printer()
        .source(source)
        .plain(true)
        .render()
}

pub fn facts(json: &str) -> Vec<Fact> {
    facts_from_json(json).expect("valid fact JSON")
}

pub fn tag_map(json: &str) -> TagMap {
    index_by_tag(materialize(&facts(json)).into_values())
}

pub fn link_json(json: &str) -> Result<QueryGraph, LinkError> {
    link(&tag_map(json))
}

/// Graph of the single query in `source`.
pub fn link_program(source: &str) -> QueryGraph {
    let mut graphs = parse(source).link().expect("lowered program links");
    assert_eq!(graphs.len(), 1, "expected exactly one query header");
    graphs.remove(0)
}
