//! Indentation-sensitive block parser.
//!
//! Groups tokens into physical lines and nests each line under the nearest
//! preceding line with a smaller indentation. The synthetic root sits at
//! column `-1` so every real line is deeper than it.

use std::ops::Range;

use tracing::trace;

use super::lexer::Token;

/// Index of a line in its [`LineTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u32);

impl LineId {
    pub const ROOT: LineId = LineId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    parent: Option<LineId>,
    children: Vec<LineId>,
    tokens: Range<usize>,
    /// 1-based; 0 for the root.
    number: usize,
    /// Column of the first token; -1 for the root.
    column: i64,
    /// Distance from the root.
    depth: usize,
}

impl Line {
    pub fn parent(&self) -> Option<LineId> {
        self.parent
    }

    pub fn children(&self) -> &[LineId] {
        &self.children
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn column(&self) -> i64 {
        self.column
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn token_range(&self) -> Range<usize> {
        self.tokens.clone()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena of lines over an owned token list. Index 0 is the root.
#[derive(Clone, Debug)]
pub struct LineTree<'src> {
    tokens: Vec<Token<'src>>,
    lines: Vec<Line>,
}

impl<'src> LineTree<'src> {
    pub fn root(&self) -> LineId {
        LineId::ROOT
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.index()]
    }

    pub fn tokens(&self, id: LineId) -> &[Token<'src>] {
        &self.tokens[self.line(id).token_range()]
    }

    pub fn all_tokens(&self) -> &[Token<'src>] {
        &self.tokens
    }

    /// Number of lines, root included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1
    }

    /// Line ids in pre-order, root first.
    pub fn preorder(&self) -> Vec<LineId> {
        let mut order = Vec::with_capacity(self.lines.len());
        let mut stack = vec![LineId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.line(id).children.iter().rev().copied());
        }
        order
    }

    /// The sibling immediately before `id` under the same parent.
    pub fn previous_sibling(&self, id: LineId) -> Option<LineId> {
        let parent = self.line(id).parent?;
        let siblings = &self.line(parent).children;
        let ix = siblings.iter().position(|s| *s == id)?;
        ix.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn ancestors(&self, id: LineId) -> impl Iterator<Item = LineId> + '_ {
        std::iter::successors(self.line(id).parent, |p| self.line(*p).parent)
    }

    fn push(&mut self, parent: LineId, tokens: Range<usize>) -> LineId {
        let first = &self.tokens[tokens.start];
        let (number, column) = (first.line, first.column as i64);
        let depth = self.line(parent).depth + 1;

        let id = LineId(self.lines.len() as u32);
        self.lines.push(Line {
            parent: Some(parent),
            children: Vec::new(),
            tokens,
            number,
            column,
            depth,
        });
        self.lines[parent.index()].children.push(id);
        id
    }
}

/// Build the line forest for `tokens`.
///
/// Maximal runs of tokens sharing a line number form a line; its indentation
/// is the column of its first token. Permissive: a dedent past every open
/// line falls back to the root.
pub fn build_line_tree(tokens: Vec<Token<'_>>) -> LineTree<'_> {
    let mut tree = LineTree {
        tokens,
        lines: vec![Line {
            parent: None,
            children: Vec::new(),
            tokens: 0..0,
            number: 0,
            column: -1,
            depth: 0,
        }],
    };

    let mut cursor = LineId::ROOT;
    let mut start = 0;
    while start < tree.tokens.len() {
        let number = tree.tokens[start].line;
        let end = tree.tokens[start..]
            .iter()
            .position(|t| t.line != number)
            .map_or(tree.tokens.len(), |n| start + n);

        let indent = tree.tokens[start].column as i64;
        while cursor != LineId::ROOT && tree.line(cursor).column >= indent {
            cursor = tree.line(cursor).parent.unwrap_or(LineId::ROOT);
        }

        cursor = tree.push(cursor, start..end);
        trace!(line = number, indent, parent = ?tree.line(cursor).parent, "line");
        start = end;
    }

    tree
}
