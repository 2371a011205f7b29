//! Front end for evql program text.
//!
//! Three stages, each usable on its own:
//!
//! - [`lexer`]: total tokenizer, every input produces a token list
//! - [`lines`]: groups tokens into physical lines nested by indentation
//! - [`classify`]: turns each line into a [`tree::ParseNode`] with
//!   diagnostics for malformed lines
//!
//! Only the nesting limit aborts; every other defect is reported and the tree
//! is still produced.

pub mod classify;
pub mod lexer;
pub mod lines;
pub mod printer;
pub mod scanner;
pub mod tree;

#[cfg(test)]
mod classify_tests;
#[cfg(test)]
mod lines_tests;

pub use classify::{Classifier, classify_lines};
pub use lexer::{KEYWORDS, Token, TokenKind, lex, lex_bytes, tokens_text};
pub use lines::{Line, LineId, LineTree, build_line_tree};
pub use printer::{LinePrinter, ParseTreePrinter, TokenPrinter};
pub use tree::{
    BindingValue, ConstantType, MutationOp, NodeId, NodeKind, ParseNode, ParseTree,
};
