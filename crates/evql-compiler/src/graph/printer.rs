use std::fmt::Write;

use evql_core::EntityId;

use super::QueryGraph;
use super::nodes::Query;

/// Text dump of a linked graph, one node per row, grouped by query.
pub struct GraphPrinter<'g> {
    graph: &'g QueryGraph,
    names: bool,
}

impl<'g> GraphPrinter<'g> {
    pub fn new(graph: &'g QueryGraph) -> Self {
        Self {
            graph,
            names: false,
        }
    }

    /// Show variable references by name instead of id.
    pub fn with_names(mut self, value: bool) -> Self {
        self.names = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for query in self.graph.queries() {
            self.format_query(query, w)?;
        }
        Ok(())
    }

    fn format_query(&self, query: &Query, w: &mut impl Write) -> std::fmt::Result {
        write!(w, "Query {} {:?}", query.id, query.name)?;
        if let Some(parent) = &query.parent {
            write!(w, " parent {parent}")?;
        }
        writeln!(w)?;

        for v in query.variables.values() {
            writeln!(w, "  Variable {} {} {}", v.id, v.name, list(&v.bindings))?;
        }
        for b in query.bindings.values() {
            writeln!(
                w,
                "  Binding {} {} {} <- {} {}",
                b.id,
                self.variable(query, &b.variable),
                b.field,
                b.source.kind,
                b.source.id
            )?;
        }
        for s in query.scans.values() {
            writeln!(w, "  Scan {} {}", s.id, list(&s.bindings))?;
        }
        for e in query.expressions.values() {
            write!(w, "  Expression {}", e.id)?;
            if let Some(operator) = &e.operator {
                write!(w, " {operator}")?;
            }
            writeln!(
                w,
                " {} projection {} grouping {}",
                list(&e.bindings),
                self.variables(query, &e.projection),
                self.variables(query, &e.grouping)
            )?;
        }
        for m in query.mutates.values() {
            writeln!(
                w,
                "  Mutate {} {} {}",
                m.id,
                m.operator.as_str(),
                list(&m.bindings)
            )?;
        }
        for n in query.nots.values() {
            writeln!(w, "  Not {} {}", n.id, n.body)?;
        }
        for u in query.unions.values() {
            writeln!(w, "  Union {} {}", u.id, list(&u.members))?;
        }
        for c in query.chooses.values() {
            writeln!(w, "  Choose {} {}", c.id, list(&c.members))?;
        }
        Ok(())
    }

    fn variable(&self, query: &Query, id: &EntityId) -> String {
        match query.variables.get(id) {
            Some(v) if self.names => v.name.clone(),
            _ => id.to_string(),
        }
    }

    fn variables(&self, query: &Query, ids: &[EntityId]) -> String {
        let items: Vec<String> = ids.iter().map(|id| self.variable(query, id)).collect();
        format!("[{}]", items.join(", "))
    }
}

fn list(ids: &[EntityId]) -> String {
    let items: Vec<&str> = ids.iter().map(EntityId::as_str).collect();
    format!("[{}]", items.join(", "))
}
