use indoc::indoc;
use proptest::prelude::*;

use super::lexer::lex;
use super::lines::{LineId, LineTree, build_line_tree};

fn first_texts<'a>(tree: &LineTree<'a>, ids: &[LineId]) -> Vec<&'a str> {
    ids.iter().map(|id| tree.tokens(*id)[0].text).collect()
}

#[test]
fn nests_by_indentation() {
    let source = indoc! {"
        a
          b
          c
        d
    "};
    let tree = build_line_tree(lex(source));

    let root = tree.line(tree.root());
    assert_eq!(root.column(), -1);
    assert_eq!(first_texts(&tree, root.children()), ["a", "d"]);

    let a = root.children()[0];
    assert_eq!(first_texts(&tree, tree.line(a).children()), ["b", "c"]);
    assert!(tree.line(root.children()[1]).children().is_empty());
}

#[test]
fn line_tokens_share_a_line_number() {
    let source = "q one two\n  #p @bob\n";
    let tree = build_line_tree(lex(source));

    for id in tree.preorder().into_iter().skip(1) {
        let line = tree.line(id);
        assert!(tree.tokens(id).iter().all(|t| t.line == line.number()));
    }
    assert_eq!(tree.len(), 3);
}

#[test]
fn dedent_pops_to_matching_level() {
    let source = indoc! {"
        a
          b
            c
           d
        e
    "};
    let tree = build_line_tree(lex(source));
    let lines = tree.preorder();

    // d (column 3) pops c (4) and nests under b (2).
    let d = lines[4];
    assert_eq!(tree.tokens(d)[0].text, "d");
    let parent = tree.line(d).parent().unwrap();
    assert_eq!(tree.tokens(parent)[0].text, "b");
    assert_eq!(tree.line(d).depth(), 3);
}

#[test]
fn stray_indent_still_nests() {
    let tree = build_line_tree(lex("    a\n  b\n"));
    let root = tree.line(tree.root());
    assert_eq!(first_texts(&tree, root.children()), ["a", "b"]);
}

#[test]
fn previous_sibling_and_ancestors() {
    let tree = build_line_tree(lex("a\n  b\n  c\n    x\n"));
    let ids = tree.preorder();
    let (a, b, c, x) = (ids[1], ids[2], ids[3], ids[4]);

    assert_eq!(tree.previous_sibling(c), Some(b));
    assert_eq!(tree.previous_sibling(b), None);
    assert_eq!(tree.previous_sibling(tree.root()), None);
    assert_eq!(tree.ancestors(x).collect::<Vec<_>>(), [c, a, LineId::ROOT]);
}

#[test]
fn empty_source_has_only_root() {
    let tree = build_line_tree(lex(""));
    assert!(tree.is_empty());
    assert_eq!(tree.preorder(), [LineId::ROOT]);
}

proptest! {
    #[test]
    fn children_are_deeper_than_parents(
        lines in prop::collection::vec((0usize..8, "[a-z#@]{1,4}"), 0..24)
    ) {
        let source: String = lines
            .iter()
            .map(|(indent, text)| format!("{}{}\n", " ".repeat(*indent), text))
            .collect();
        let tree = build_line_tree(lex(&source));

        for id in tree.preorder() {
            let line = tree.line(id);
            for child in line.children() {
                prop_assert!(tree.line(*child).column() > line.column());
            }
        }
    }
}
