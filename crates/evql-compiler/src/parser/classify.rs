//! Node classifier: assigns a parse node to every line.
//!
//! Classification is memoized per line and always runs parents first: asking
//! for a line classifies its unclassified ancestors top-down before the line
//! itself, so rules may inspect the parent's node without recursion. The
//! nearest enclosing query is found by walking the ancestor chain.

use indexmap::IndexMap;
use tracing::trace;

use super::lexer::{Token, TokenKind, tokens_text};
use super::lines::{LineId, LineTree};
use super::tree::{BindingValue, ConstantType, MutationOp, NodeId, NodeKind, ParseNode, ParseTree};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::program::CompileConfig;
use crate::source::SourceKind;
use crate::span::Span;
use crate::{Error, PassResult, Result};

pub struct Classifier<'a, 'src> {
    source: &'src str,
    lines: &'a LineTree<'src>,
    config: CompileConfig,
    tree: ParseTree,
    diagnostics: Diagnostics,
}

impl<'a, 'src> Classifier<'a, 'src> {
    pub fn new(
        source: &'src str,
        lines: &'a LineTree<'src>,
        config: CompileConfig,
        source_kind: SourceKind,
    ) -> Self {
        Self {
            source,
            lines,
            config,
            tree: ParseTree::new(source_kind, lines.len()),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Node for `line`, classifying it (and any unclassified ancestors) first.
    pub fn classify(&mut self, line: LineId) -> Result<NodeId> {
        if let Some(node) = self.tree.line_node(line) {
            return Ok(node);
        }

        let pending: Vec<LineId> = std::iter::once(line)
            .chain(self.lines.ancestors(line))
            .take_while(|id| self.tree.line_node(*id).is_none())
            .collect();

        let mut node = self.tree.root();
        for id in pending.into_iter().rev() {
            node = self.classify_line(id)?;
        }
        Ok(node)
    }

    /// Classify every line in program order.
    pub fn classify_all(&mut self) -> Result<()> {
        for id in self.lines.preorder() {
            self.classify(id)?;
        }
        Ok(())
    }

    pub fn finish(self) -> (ParseTree, Diagnostics) {
        (self.tree, self.diagnostics)
    }

    fn classify_line(&mut self, id: LineId) -> Result<NodeId> {
        let lines = self.lines;
        let line = lines.line(id);
        if line.depth() > self.config.max_nesting_depth {
            return Err(Error::NestingLimitExceeded {
                limit: self.config.max_nesting_depth,
                line: line.number(),
            });
        }

        let parent = line
            .parent()
            .and_then(|p| self.tree.line_node(p))
            .unwrap_or(self.tree.root());
        let tokens = lines.tokens(id);
        let Some(first) = tokens.first() else {
            return Ok(self.tree.root());
        };

        let parent_kind = &self.tree.node(parent).kind;
        let under_context = matches!(parent_kind, NodeKind::CodeContext { .. });
        let under_object = matches!(parent_kind, NodeKind::Object { .. });

        let node = match first.kind {
            _ if under_context => self.query_line(id, parent, tokens),
            TokenKind::Tag | TokenKind::Name => self.object_line(id, parent, tokens),
            TokenKind::Add => self.mutation_line(parent, tokens, MutationOp::Add),
            TokenKind::Remove => self.mutation_line(parent, tokens, MutationOp::Remove),
            _ if under_object => self.attribute_line(id, parent, tokens),
            _ => self.unknown_line(tokens),
        };

        trace!(
            line = line.number(),
            kind = self.tree.node(node).kind.name(),
            "classified"
        );
        self.tree.assign_line(id, node);
        Ok(node)
    }

    fn query_line(&mut self, id: LineId, parent: NodeId, tokens: &[Token<'src>]) -> NodeId {
        let text = tokens_text(self.source, tokens);
        let span = line_span(tokens);

        if self.config.merge_multiline_titles
            && let Some(query) = self.adjacent_title(id)
        {
            let node = self.tree.node_mut(query);
            node.span = node.span.cover(span);
            if let NodeKind::Query { name, .. } = &mut node.kind {
                name.push('\n');
                name.push_str(text);
            }
            return query;
        }

        let node = self.push(
            NodeKind::Query {
                name: text.to_owned(),
                variables: IndexMap::new(),
            },
            &tokens[0],
            span,
        );
        self.tree.attach(parent, node);
        node
    }

    /// Query node of the previous sibling, when that sibling sits on the line
    /// directly above.
    fn adjacent_title(&self, id: LineId) -> Option<NodeId> {
        let prev = self.lines.previous_sibling(id)?;
        if self.lines.line(prev).number() + 1 != self.lines.line(id).number() {
            return None;
        }
        let node = self.tree.line_node(prev)?;
        matches!(self.tree.node(node).kind, NodeKind::Query { .. }).then_some(node)
    }

    fn object_line(&mut self, id: LineId, parent: NodeId, tokens: &[Token<'src>]) -> NodeId {
        let object = self.push(NodeKind::Object { variable: None }, &tokens[0], line_span(tokens));
        self.tree.attach(parent, object);

        let mut name_token: Option<&Token<'src>> = None;
        let mut ix = 0;
        while ix < tokens.len() {
            let marker = &tokens[ix];
            ix += 1;
            let field = match marker.kind {
                TokenKind::Tag => "tag",
                TokenKind::Name => "name",
                _ => continue,
            };

            let Some(value) = tokens.get(ix).filter(|t| is_marker_value(t)) else {
                self.diagnostics
                    .report(DiagnosticKind::NakedMarker, marker.span)
                    .message(marker.text)
                    .emit();
                continue;
            };
            ix += 1;

            let binding = self.push(
                NodeKind::Binding {
                    source: object,
                    field: field.to_owned(),
                    value: BindingValue::Constant {
                        text: value.text.to_owned(),
                        ty: ConstantType::String,
                    },
                },
                value,
                marker.span.cover(value.span),
            );
            self.tree.attach(object, binding);
            if name_token.is_none() {
                name_token = Some(value);
            }
        }

        let Some(name_token) = name_token else {
            self.diagnostics
                .report(DiagnosticKind::UnnamedObject, line_span(tokens))
                .emit();
            return object;
        };

        let variable = self.assign_variable(id, name_token);
        if let NodeKind::Object { variable: slot } = &mut self.tree.node_mut(object).kind {
            *slot = variable;
        }
        object
    }

    fn mutation_line(&mut self, parent: NodeId, tokens: &[Token<'src>], op: MutationOp) -> NodeId {
        let node = self.push(NodeKind::Mutation(op), &tokens[0], line_span(tokens));
        self.tree.attach(parent, node);
        node
    }

    fn attribute_line(&mut self, id: LineId, object: NodeId, tokens: &[Token<'src>]) -> NodeId {
        let field = &tokens[0];
        if !is_field(field) {
            self.diagnostics
                .report(DiagnosticKind::EmptyAttribute, field.span)
                .message(format!("`{}`", field.text))
                .emit();
            return self.push(NodeKind::Unknown, field, line_span(tokens));
        }

        let value = match tokens.get(1) {
            None => match self.assign_variable(id, field) {
                Some(variable) => BindingValue::Variable(variable),
                None => BindingValue::Missing,
            },
            Some(sep) if is_separator(sep) => match &tokens[2..] {
                [] => {
                    self.diagnostics
                        .report(DiagnosticKind::MissingRightHandSide, sep.span)
                        .message(field.text)
                        .emit();
                    BindingValue::Missing
                }
                [single] if single.kind == TokenKind::String => BindingValue::Constant {
                    text: single.text.to_owned(),
                    ty: ConstantType::String,
                },
                [single] if single.kind == TokenKind::Number => BindingValue::Constant {
                    text: single.text.to_owned(),
                    ty: ConstantType::Number,
                },
                rhs => BindingValue::Expression {
                    span: line_span(rhs),
                },
            },
            Some(other) => {
                self.diagnostics
                    .report(DiagnosticKind::ExpectedSeparator, other.span)
                    .message(other.text)
                    .related_to(format!("field `{}`", field.text), field.span)
                    .emit();
                BindingValue::Missing
            }
        };

        let binding = self.push(
            NodeKind::Binding {
                source: object,
                field: field.text.to_owned(),
                value,
            },
            field,
            line_span(tokens),
        );
        self.tree.attach(object, binding);
        binding
    }

    fn unknown_line(&mut self, tokens: &[Token<'src>]) -> NodeId {
        let span = line_span(tokens);
        self.diagnostics
            .report(DiagnosticKind::UnrecognizedLine, span)
            .message(format!("`{}`", tokens_text(self.source, tokens)))
            .emit();
        self.push(NodeKind::Unknown, &tokens[0], span)
    }

    /// Look up or create the variable `token` names in the nearest enclosing
    /// query's cache.
    fn assign_variable(&mut self, line: LineId, token: &Token<'src>) -> Option<NodeId> {
        let Some(query) = self.enclosing_query(line) else {
            self.diagnostics
                .report(DiagnosticKind::NoEnclosingQuery, token.span)
                .emit();
            return None;
        };

        if let NodeKind::Query { variables, .. } = &self.tree.node(query).kind
            && let Some(existing) = variables.get(token.text)
        {
            return Some(*existing);
        }

        let variable = self.push(
            NodeKind::Variable {
                name: token.text.to_owned(),
            },
            token,
            token.span,
        );
        if let NodeKind::Query { variables, .. } = &mut self.tree.node_mut(query).kind {
            variables.insert(token.text.to_owned(), variable);
        }
        Some(variable)
    }

    fn enclosing_query(&self, line: LineId) -> Option<NodeId> {
        self.lines
            .ancestors(line)
            .filter_map(|id| self.tree.line_node(id))
            .find(|node| matches!(self.tree.node(*node).kind, NodeKind::Query { .. }))
    }

    fn push(&mut self, kind: NodeKind, at: &Token<'src>, span: Span) -> NodeId {
        self.tree.push(ParseNode {
            kind,
            children: Vec::new(),
            line: at.line,
            column: at.column,
            span,
        })
    }
}

/// Classify every line of `lines`.
pub fn classify_lines(
    source: &str,
    lines: &LineTree<'_>,
    config: CompileConfig,
    source_kind: SourceKind,
) -> PassResult<ParseTree> {
    let mut classifier = Classifier::new(source, lines, config, source_kind);
    classifier.classify_all()?;
    Ok(classifier.finish())
}

fn line_span(tokens: &[Token<'_>]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.cover(last.span),
        _ => Span::default(),
    }
}

fn is_separator(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Identifier && matches!(token.text, ":" | "=")
}

fn is_field(token: &Token<'_>) -> bool {
    (token.kind == TokenKind::Identifier && !is_separator(token)) || token.kind.is_keyword()
}

fn is_marker_value(token: &Token<'_>) -> bool {
    !token.kind.is_special() && !is_separator(token)
}
