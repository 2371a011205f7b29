//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program or fact file (positional, `-` for stdin).
pub fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help(help)
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// Print the token stream (--tokens).
pub fn tokens_arg() -> Arg {
    Arg::new("tokens")
        .long("tokens")
        .action(ArgAction::SetTrue)
        .help("Print the token stream")
}

/// Print the indentation tree (--lines).
pub fn lines_arg() -> Arg {
    Arg::new("lines")
        .long("lines")
        .action(ArgAction::SetTrue)
        .help("Print the indentation tree")
}

/// Print lowered facts (--facts).
pub fn facts_arg() -> Arg {
    Arg::new("facts")
        .long("facts")
        .action(ArgAction::SetTrue)
        .help("Print the lowered facts")
}

/// Print linked query graphs (--graph).
pub fn graph_arg() -> Arg {
    Arg::new("graph")
        .long("graph")
        .action(ArgAction::SetTrue)
        .help("Print the linked query graphs")
}

/// Show token spans (--spans).
pub fn spans_arg() -> Arg {
    Arg::new("spans")
        .long("spans")
        .action(ArgAction::SetTrue)
        .help("Show token spans and node positions")
}

/// Facts as a JSON array (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print facts as a JSON array")
}

/// Nesting limit (--max-depth).
pub fn max_depth_arg() -> Arg {
    Arg::new("max_depth")
        .long("max-depth")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Deepest line nesting accepted [default: 256]")
}

/// Keep adjacent top-level lines apart (--no-merge-titles).
pub fn no_merge_titles_arg() -> Arg {
    Arg::new("no_merge_titles")
        .long("no-merge-titles")
        .action(ArgAction::SetTrue)
        .help("Treat each top-level line as its own query")
}

/// Graph as Graphviz dot (--dot).
pub fn dot_arg() -> Arg {
    Arg::new("dot")
        .long("dot")
        .action(ArgAction::SetTrue)
        .help("Print only the graph, as Graphviz dot")
}

/// Show variables by name in graph dumps (--names).
pub fn names_arg() -> Arg {
    Arg::new("names")
        .long("names")
        .action(ArgAction::SetTrue)
        .help("Show variable names instead of ids in graph dumps")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v for debug logs, -vv for trace logs)")
}
