//! Lexer for evql programs.
//!
//! Logos recognizes token shapes; a [`Scanner`] walked alongside maps each
//! span start to its line and column. Lexing is total: there are no lexical
//! errors, anything unmatched degrades to an identifier.

use std::fmt;

use logos::Logos;
use tracing::trace;

use super::scanner::{Scanner, decode_prefix};
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `#`
    Tag,
    /// `@`
    Name,
    Dot,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    Union,
    Choose,
    And,
    Or,
    Add,
    Remove,
    End,
    String,
    Number,
    Identifier,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }

    pub fn is_special(self) -> bool {
        matches!(
            self,
            Self::Tag
                | Self::Name
                | Self::Dot
                | Self::OpenBracket
                | Self::CloseBracket
                | Self::OpenParen
                | Self::CloseParen
                | Self::OpenCurly
                | Self::CloseCurly
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Exact identifier text retyped to a keyword kind.
pub static KEYWORDS: &[(&str, TokenKind)] = &[
    ("union", TokenKind::Union),
    ("choose", TokenKind::Choose),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("add", TokenKind::Add),
    ("remove", TokenKind::Remove),
    ("end", TokenKind::End),
];

fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Token text. Strings exclude their quotes.
    pub text: &'src str,
    /// Full lexeme, quotes included.
    pub span: Span,
    /// 1-based.
    pub line: usize,
    /// 0-based, in chars. For strings, the column after the opening quote.
    pub column: usize,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {}:{}",
            self.kind, self.text, self.line, self.column
        )
    }
}

/// Whether a string literal found its closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Closed,
    Unclosed,
}

/// Token shapes as Logos sees them. Keywords and separators are folded into
/// [`TokenKind`] afterwards.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    #[token("#")]
    Tag,
    #[token("@")]
    Name,
    #[token(".")]
    Dot,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,

    #[token("\"", lex_string)]
    Str(Quote),

    #[regex(r"[0-9][0-9.]*")]
    #[regex(r"-[0-9.]+")]
    Number,

    /// `:` and `=` end identifier runs and stand alone.
    #[token(":")]
    #[token("=")]
    Separator,

    /// A `-` not starting a number folds into an identifier.
    #[regex(
        r#"[^ \t\r\n#@.\[\](){}":=0-9\-][^ \t\r\n#@.\[\](){}:=]*"#,
        allow_greedy = true
    )]
    #[regex(
        r#"-([^ \t\r\n#@.\[\](){}":=0-9][^ \t\r\n#@.\[\](){}:=]*)?"#,
        allow_greedy = true
    )]
    Identifier,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Scan a string body after the opening quote.
///
/// Two states: a backslash enters `escaped` and any following char returns to
/// `normal`; a bare `"` in `normal` closes. A newline always ends the token.
fn lex_string(lex: &mut logos::Lexer<'_, RawKind>) -> Quote {
    let mut escaped = false;
    let mut consumed = 0;
    let mut quote = Quote::Unclosed;

    for (i, c) in lex.remainder().char_indices() {
        if c == '\n' {
            consumed = i;
            break;
        }
        consumed = i + c.len_utf8();
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            quote = Quote::Closed;
            break;
        }
    }

    lex.bump(consumed);
    quote
}

/// Tokenize `source`. Total and side-effect free.
pub fn lex(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut scanner = Scanner::new(source);
    let mut lexer = RawKind::lexer(source);

    while let Some(raw) = lexer.next() {
        let range = lexer.span();
        let span = Span::from(range.clone());
        let slice = &source[range];

        scanner.advance_to(span.start);
        let pos = scanner.position();

        let (kind, text, column) = match raw {
            Ok(RawKind::Whitespace) => continue,
            Ok(RawKind::Str(quote)) => {
                let end = match quote {
                    Quote::Closed => slice.len() - 1,
                    Quote::Unclosed => slice.len(),
                };
                (TokenKind::String, &slice[1..end], pos.column + 1)
            }
            Ok(RawKind::Number) => (TokenKind::Number, slice, pos.column),
            Ok(RawKind::Separator) => (TokenKind::Identifier, slice, pos.column),
            Ok(RawKind::Identifier) => (
                keyword(slice).unwrap_or(TokenKind::Identifier),
                slice,
                pos.column,
            ),
            Ok(special) => (special_kind(special), slice, pos.column),
            Err(()) => (TokenKind::Identifier, slice, pos.column),
        };

        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        tokens.push(Token {
            kind,
            text,
            span,
            line: pos.line,
            column,
        });
    }

    tokens
}

/// Tokenize the longest valid UTF-8 prefix of `bytes`.
pub fn lex_bytes(bytes: &[u8]) -> Vec<Token<'_>> {
    lex(decode_prefix(bytes))
}

fn special_kind(raw: RawKind) -> TokenKind {
    match raw {
        RawKind::Tag => TokenKind::Tag,
        RawKind::Name => TokenKind::Name,
        RawKind::Dot => TokenKind::Dot,
        RawKind::OpenBracket => TokenKind::OpenBracket,
        RawKind::CloseBracket => TokenKind::CloseBracket,
        RawKind::OpenParen => TokenKind::OpenParen,
        RawKind::CloseParen => TokenKind::CloseParen,
        RawKind::OpenCurly => TokenKind::OpenCurly,
        RawKind::CloseCurly => TokenKind::CloseCurly,
        _ => TokenKind::Identifier,
    }
}

/// Source text covered by a run of tokens, from the first token's start to the
/// last token's end.
pub fn tokens_text<'src>(source: &'src str, tokens: &[Token<'src>]) -> &'src str {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => &source[first.span.start..last.span.end],
        _ => "",
    }
}
