//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use evql_compiler::CompileConfig;

use super::ColorChoice;
use crate::commands::load::LoadArgs;
use crate::commands::parse::{ParseArgs, Stages};

pub struct ParseParams {
    pub input: PathBuf,
    pub tokens: bool,
    pub lines: bool,
    pub facts: bool,
    pub graph: bool,
    pub spans: bool,
    pub json: bool,
    pub names: bool,
    pub max_depth: Option<usize>,
    pub no_merge_titles: bool,
    pub color: ColorChoice,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: input_path(m),
            tokens: m.get_flag("tokens"),
            lines: m.get_flag("lines"),
            facts: m.get_flag("facts"),
            graph: m.get_flag("graph"),
            spans: m.get_flag("spans"),
            json: m.get_flag("json"),
            names: m.get_flag("names"),
            max_depth: m.get_one::<usize>("max_depth").copied(),
            no_merge_titles: m.get_flag("no_merge_titles"),
            color: parse_color(m),
        }
    }

    /// Compiler settings implied by the flags.
    pub fn config(&self) -> CompileConfig {
        let defaults = CompileConfig::default();
        CompileConfig {
            max_nesting_depth: self.max_depth.unwrap_or(defaults.max_nesting_depth),
            merge_multiline_titles: !self.no_merge_titles,
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        // No stage flag means the parse tree alone.
        let any = p.tokens || p.lines || p.facts || p.graph;
        Self {
            config: p.config(),
            input: p.input,
            stages: Stages {
                tokens: p.tokens,
                lines: p.lines,
                tree: !any,
                facts: p.facts,
                graph: p.graph,
            },
            spans: p.spans,
            json: p.json,
            names: p.names,
            color: p.color.should_colorize(),
        }
    }
}

pub struct LoadParams {
    pub input: PathBuf,
    pub dot: bool,
    pub names: bool,
}

impl LoadParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: input_path(m),
            dot: m.get_flag("dot"),
            names: m.get_flag("names"),
        }
    }
}

impl From<LoadParams> for LoadArgs {
    fn from(p: LoadParams) -> Self {
        Self {
            input: p.input,
            dot: p.dot,
            names: p.names,
        }
    }
}

fn input_path(m: &ArgMatches) -> PathBuf {
    // Required by clap; "-" reads stdin.
    m.get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("-"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
