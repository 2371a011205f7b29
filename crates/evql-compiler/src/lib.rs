//! evql: compile indentation-sensitive query programs into linked query graphs.
//!
//! Two pipelines meet at [`graph::QueryGraph`]: program text goes through the
//! lexer, block parser and classifier, then is lowered to facts; fact sets are
//! materialized into entities, bucketed by tag and linked.
//!
//! # Example
//!
//! ```
//! use evql_compiler::ProgramBuilder;
//!
//! let source = "people over nine\n  #person\n    age: 9\n";
//!
//! let program = ProgramBuilder::new(source).parse().expect("nesting limit");
//! assert!(program.is_valid());
//! let graphs = program.link().expect("lowered programs always link");
//! assert_eq!(graphs[0].root_query().name(), "people over nine");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod graph;
pub mod parser;
pub mod program;
pub mod source;
pub mod span;

#[cfg(test)]
pub(crate) mod test_utils;

/// Result type for passes that produce both output and diagnostics.
///
/// Recoverable defects travel in the [`Diagnostics`]; fatal errors (like the
/// nesting limit) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use graph::{LinkError, QueryGraph};
pub use program::{CompileConfig, FactsBuilder, FactsLoaded, ProgramBuilder, ProgramParsed};
pub use source::SourceKind;
pub use span::Span;

/// Errors that abort compilation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Program lines nested deeper than the configured limit.
    #[error("nesting limit of {limit} exceeded on line {line}")]
    NestingLimitExceeded { limit: usize, line: usize },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Decode(#[from] evql_core::DecodeError),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
