//! Builder facades over both pipelines.
//!
//! `ProgramBuilder` runs program text through the front end; `FactsBuilder`
//! materializes and indexes a literal fact set. Both end in `link()`.

use tracing::debug;

use evql_core::{Entities, Fact, TagMap, facts_from_json, index_by_tag, materialize};

use crate::diagnostics::Diagnostics;
use crate::graph::{QueryGraph, link, lower, lower_query};
use crate::parser::printer::{LinePrinter, ParseTreePrinter, TokenPrinter};
use crate::parser::scanner::decode_prefix;
use crate::parser::{LineTree, ParseTree, Token, build_line_tree, classify_lines, lex};
use crate::source::SourceKind;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// Front end settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Deepest line nesting accepted before aborting.
    pub max_nesting_depth: usize,
    /// Join adjacent top-level lines into one query title.
    pub merge_multiline_titles: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            merge_multiline_titles: true,
        }
    }
}

pub struct ProgramBuilder<'src> {
    src: &'src str,
    source_kind: SourceKind,
    config: CompileConfig,
}

impl<'src> ProgramBuilder<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            source_kind: SourceKind::default(),
            config: CompileConfig::default(),
        }
    }

    /// Program text from raw bytes; only the longest valid UTF-8 prefix is
    /// compiled.
    pub fn from_bytes(bytes: &'src [u8]) -> Self {
        Self::new(decode_prefix(bytes))
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    pub fn with_merge_multiline_titles(mut self, value: bool) -> Self {
        self.config.merge_multiline_titles = value;
        self
    }

    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.source_kind = kind;
        self
    }

    pub fn parse(self) -> crate::Result<ProgramParsed<'src>> {
        let src = self.src;
        let lines = build_line_tree(lex(src));
        let (tree, diagnostics) =
            classify_lines(src, &lines, self.config, self.source_kind.clone())?;

        debug!(
            source = self.source_kind.display_name(),
            lines = lines.len() - 1,
            nodes = tree.len(),
            diagnostics = diagnostics.len(),
            "parsed program"
        );

        Ok(ProgramParsed {
            src,
            source_kind: self.source_kind,
            lines,
            tree,
            diagnostics,
        })
    }
}

pub struct ProgramParsed<'src> {
    src: &'src str,
    source_kind: SourceKind,
    lines: LineTree<'src>,
    tree: ParseTree,
    diagnostics: Diagnostics,
}

impl<'src> ProgramParsed<'src> {
    pub fn source(&self) -> &'src str {
        self.src
    }

    pub fn source_kind(&self) -> &SourceKind {
        &self.source_kind
    }

    pub fn tokens(&self) -> &[Token<'src>] {
        self.lines.all_tokens()
    }

    pub fn lines(&self) -> &LineTree<'src> {
        &self.lines
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// No errors were reported. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Facts for every query header.
    pub fn lower(&self) -> Vec<Fact> {
        lower(&self.tree, self.src)
    }

    /// One linked graph per query header, in program order.
    pub fn link(&self) -> crate::Result<Vec<QueryGraph>> {
        let mut graphs = Vec::new();
        for query in self.tree.queries() {
            let facts = lower_query(&self.tree, self.src, query);
            let tag_map = index_by_tag(materialize(&facts).into_values());
            graphs.push(link(&tag_map)?);
        }
        Ok(graphs)
    }

    pub fn dump_tokens(&self) -> String {
        TokenPrinter::new(self.tokens()).dump()
    }

    pub fn dump_lines(&self) -> String {
        LinePrinter::new(self.src, &self.lines).dump()
    }

    pub fn dump_tree(&self) -> String {
        ParseTreePrinter::new(self.src, &self.tree).dump()
    }

    pub fn dump_facts(&self) -> String {
        self.lower().iter().map(|fact| format!("{fact}\n")).collect()
    }

    /// Filtered diagnostics rendered against the source with snippets.
    pub fn render_diagnostics(&self, colored: bool) -> String {
        self.diagnostics
            .filtered()
            .printer()
            .source(self.src)
            .path(self.source_kind.display_name())
            .colored(colored)
            .render()
    }
}

pub struct FactsBuilder {
    facts: Vec<Fact>,
}

impl FactsBuilder {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    /// Decode a literal `[[entity, attribute, value], ...]` array.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(Self::new(facts_from_json(json)?))
    }

    pub fn load(self) -> FactsLoaded {
        let entities = materialize(&self.facts);
        let tag_map = index_by_tag(entities.values().cloned());
        debug!(
            facts = self.facts.len(),
            entities = entities.len(),
            tags = tag_map.len(),
            "loaded facts"
        );
        FactsLoaded {
            facts: self.facts,
            entities,
            tag_map,
        }
    }
}

pub struct FactsLoaded {
    facts: Vec<Fact>,
    entities: Entities,
    tag_map: TagMap,
}

impl FactsLoaded {
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn tag_map(&self) -> &TagMap {
        &self.tag_map
    }

    pub fn link(&self) -> crate::Result<QueryGraph> {
        Ok(link(&self.tag_map)?)
    }
}
