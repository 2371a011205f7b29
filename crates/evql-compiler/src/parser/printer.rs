use std::fmt::Write;

use super::lexer::{Token, tokens_text};
use super::lines::{LineId, LineTree};
use super::tree::{BindingValue, ConstantType, NodeId, NodeKind, ParseTree};
use crate::span::Span;

pub struct TokenPrinter<'t, 'src> {
    tokens: &'t [Token<'src>],
    spans: bool,
}

impl<'t, 'src> TokenPrinter<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        Self {
            tokens,
            spans: false,
        }
    }

    pub fn with_spans(mut self, value: bool) -> Self {
        self.spans = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for token in self.tokens {
            write!(w, "{token}")?;
            if self.spans {
                write!(w, "{}", span_str(token.span))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

/// Prints the line forest, one line per row, indented by depth.
pub struct LinePrinter<'t, 'src> {
    source: &'src str,
    lines: &'t LineTree<'src>,
}

impl<'t, 'src> LinePrinter<'t, 'src> {
    pub fn new(source: &'src str, lines: &'t LineTree<'src>) -> Self {
        Self { source, lines }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        writeln!(w, "Root")?;
        for child in self.lines.line(self.lines.root()).children() {
            self.format_line(*child, 1, w)?;
        }
        Ok(())
    }

    fn format_line(&self, id: LineId, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let line = self.lines.line(id);
        let text = tokens_text(self.source, self.lines.tokens(id));
        writeln!(
            w,
            "{}{}:{} {}",
            "  ".repeat(indent),
            line.number(),
            line.column(),
            text
        )?;
        for child in line.children() {
            self.format_line(*child, indent + 1, w)?;
        }
        Ok(())
    }
}

/// Prints attached parse nodes from the code context down.
///
/// Lines classified as `Unknown` are never attached and so never printed.
pub struct ParseTreePrinter<'t, 'src> {
    source: &'src str,
    tree: &'t ParseTree,
    positions: bool,
}

impl<'t, 'src> ParseTreePrinter<'t, 'src> {
    pub fn new(source: &'src str, tree: &'t ParseTree) -> Self {
        Self {
            source,
            tree,
            positions: false,
        }
    }

    pub fn with_positions(mut self, value: bool) -> Self {
        self.positions = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        self.format_node(self.tree.root(), 0, w)
    }

    fn format_node(&self, id: NodeId, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let node = self.tree.node(id);
        write!(w, "{}", "  ".repeat(indent))?;

        match &node.kind {
            NodeKind::CodeContext { source } => write!(w, "CodeContext {}", source.display_name())?,
            NodeKind::Query { name, variables } => {
                write!(w, "Query {name:?}")?;
                if !variables.is_empty() {
                    let names: Vec<&str> = variables.keys().map(String::as_str).collect();
                    write!(w, " [{}]", names.join(", "))?;
                }
            }
            NodeKind::Object { variable } => {
                write!(w, "Object")?;
                if let Some(name) = variable.and_then(|v| self.tree.variable_name(v)) {
                    write!(w, " ${name}")?;
                }
            }
            NodeKind::Binding { field, value, .. } => {
                write!(w, "Binding {field}")?;
                self.format_value(value, w)?;
            }
            NodeKind::Variable { name } => write!(w, "Variable ${name}")?,
            NodeKind::Mutation(op) => write!(w, "Mutation {}", op.as_str())?,
            NodeKind::Unknown => write!(w, "Unknown")?,
        }

        if self.positions && node.line > 0 {
            write!(w, " @{}:{}", node.line, node.column)?;
        }
        writeln!(w)?;

        for child in &node.children {
            self.format_node(*child, indent + 1, w)?;
        }
        Ok(())
    }

    fn format_value(&self, value: &BindingValue, w: &mut impl Write) -> std::fmt::Result {
        match value {
            BindingValue::Variable(v) => {
                write!(w, " = ${}", self.tree.variable_name(*v).unwrap_or("?"))
            }
            BindingValue::Constant {
                text,
                ty: ConstantType::String,
            } => write!(w, " = {text:?}"),
            BindingValue::Constant {
                text,
                ty: ConstantType::Number,
            } => write!(w, " = {text}"),
            BindingValue::Expression { span } => {
                write!(w, " = expr {:?}", &self.source[span.range()])
            }
            BindingValue::Missing => write!(w, " = ?"),
        }
    }
}

fn span_str(span: Span) -> String {
    format!(" [{}..{}]", span.start, span.end)
}
