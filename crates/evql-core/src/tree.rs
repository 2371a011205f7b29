//! Generic map/set/leaf tree with a Graphviz dot renderer.
//!
//! Used to visualize linked query graphs: maps become labeled edges, sets
//! become edges labeled by position, leaves become labeled nodes.

use std::fmt::Write as _;

use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeNode {
    Map(IndexMap<String, TreeNode>),
    Set(Vec<TreeNode>),
    Leaf(String),
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl TreeNode {
    pub fn map() -> Self {
        Self::default()
    }

    pub fn leaf(text: impl Into<String>) -> Self {
        Self::Leaf(text.into())
    }

    /// Insert `node` at `path`, creating intermediate maps.
    ///
    /// Set segments are positions; the position one past the end appends.
    /// Returns `false` when the path runs through a leaf or names a position
    /// that does not exist. An empty path replaces `self`.
    pub fn insert(&mut self, path: &[&str], node: TreeNode) -> bool {
        let Some((head, rest)) = path.split_first() else {
            *self = node;
            return true;
        };

        let child = match self {
            Self::Map(children) => children.entry((*head).to_owned()).or_default(),
            Self::Set(items) => {
                let Ok(ix) = head.parse::<usize>() else {
                    return false;
                };
                if ix == items.len() {
                    items.push(TreeNode::default());
                }
                match items.get_mut(ix) {
                    Some(child) => child,
                    None => return false,
                }
            }
            Self::Leaf(_) => return false,
        };
        child.insert(rest, node)
    }

    pub fn lookup(&self, path: &[&str]) -> Option<&TreeNode> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        let child = match self {
            Self::Map(children) => children.get(*head)?,
            Self::Set(items) => items.get(head.parse::<usize>().ok()?)?,
            Self::Leaf(_) => return None,
        };
        child.lookup(rest)
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(text) => Some(text),
            _ => None,
        }
    }

    /// Render as a `digraph`. Node ids are assigned in pre-order.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph evql {\n");
        let mut next_id = 0usize;
        self.write_dot(&mut out, &mut next_id);
        out.push('}');
        out.push('\n');
        out
    }

    fn write_dot(&self, out: &mut String, next_id: &mut usize) -> usize {
        let id = *next_id;
        *next_id += 1;

        match self {
            Self::Leaf(text) => {
                writeln!(out, "  n{id} [label=\"{}\"];", escape_label(text))
                    .expect("String write never fails");
            }
            Self::Map(children) => {
                for (name, child) in children {
                    let child_id = child.write_dot(out, next_id);
                    writeln!(out, "  n{id} -> n{child_id} [label=\"{}\"];", escape_label(name))
                        .expect("String write never fails");
                }
            }
            Self::Set(items) => {
                for (ix, child) in items.iter().enumerate() {
                    let child_id = child.write_dot(out, next_id);
                    writeln!(out, "  n{id} -> n{child_id} [label=\"{ix}\"];")
                        .expect("String write never fails");
                }
            }
        }
        id
    }
}

fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
