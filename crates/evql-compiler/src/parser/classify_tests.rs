use indoc::indoc;

use super::classify::{Classifier, classify_lines};
use super::lexer::lex;
use super::lines::build_line_tree;
use super::tree::{BindingValue, ConstantType, NodeKind, ParseTree};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::program::CompileConfig;
use crate::source::SourceKind;
use crate::test_utils::{dump_diagnostics, dump_tree};
use crate::Error;

fn classify(source: &str) -> (ParseTree, Diagnostics) {
    classify_with(source, CompileConfig::default())
}

fn classify_with(source: &str, config: CompileConfig) -> (ParseTree, Diagnostics) {
    let lines = build_line_tree(lex(source));
    classify_lines(source, &lines, config, SourceKind::Inline).unwrap()
}

fn bindings<'t>(tree: &'t ParseTree, field: &str) -> Vec<&'t BindingValue> {
    tree.descendants(tree.root())
        .into_iter()
        .filter_map(|id| match &tree.node(id).kind {
            NodeKind::Binding { field: f, value, .. } if f == field => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn query_with_object_and_attributes() {
    let source = indoc! {"
        people over nine
          #person @p
            age: 9
            name
    "};

    insta::assert_snapshot!(dump_tree(source), @r#"
    CodeContext <program>
      Query "people over nine" [person, name]
        Object $person
          Binding tag = "person"
          Binding name = "p"
          Binding age = 9
          Binding name = $name
    "#);
}

#[test]
fn adjacent_title_lines_merge() {
    let source = indoc! {"
        first line
        second line
          #x
    "};
    let (tree, diagnostics) = classify(source);

    assert!(diagnostics.is_empty());
    let queries: Vec<_> = tree.queries().collect();
    assert_eq!(queries.len(), 1);
    assert_eq!(tree.query_name(queries[0]), Some("first line\nsecond line"));
    assert_eq!(tree.node(queries[0]).children.len(), 1);
}

#[test]
fn blank_line_separates_titles() {
    let (tree, _) = classify("a\n\nb\n");
    let names: Vec<_> = tree.queries().filter_map(|q| tree.query_name(q)).collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn title_merging_can_be_disabled() {
    let config = CompileConfig {
        merge_multiline_titles: false,
        ..CompileConfig::default()
    };
    let (tree, _) = classify_with("first\nsecond\n", config);
    let names: Vec<_> = tree.queries().filter_map(|q| tree.query_name(q)).collect();
    assert_eq!(names, ["first", "second"]);
}

#[test]
fn inline_tokens_after_markers_are_ignored() {
    let (tree, diagnostics) = classify("q\n  #person(@bob .age: 9)\n");

    assert!(diagnostics.is_empty());
    assert_eq!(
        bindings(&tree, "tag"),
        [&BindingValue::Constant {
            text: "person".to_owned(),
            ty: ConstantType::String
        }]
    );
    assert_eq!(
        bindings(&tree, "name"),
        [&BindingValue::Constant {
            text: "bob".to_owned(),
            ty: ConstantType::String
        }]
    );
}

#[test]
fn mutation_wraps_objects() {
    let source = indoc! {"
        q
          add
            #person
              age: 9
    "};

    insta::assert_snapshot!(dump_tree(source), @r#"
    CodeContext <program>
      Query "q" [person]
        Mutation add
          Object $person
            Binding tag = "person"
            Binding age = 9
    "#);
}

#[test]
fn expression_right_hand_side() {
    let source = indoc! {"
        q
          #order
            total = price * qty
            owner: who
    "};

    insta::assert_snapshot!(dump_tree(source), @r#"
    CodeContext <program>
      Query "q" [order]
        Object $order
          Binding tag = "order"
          Binding total = expr "price * qty"
          Binding owner = expr "who"
    "#);
}

#[test]
fn variable_referenced_many_times_is_shared() {
    let source = indoc! {"
        q
          #person
            friend
          #dog
            friend
          #cat
            friend
    "};
    let (tree, diagnostics) = classify(source);

    assert!(diagnostics.is_empty());
    let query = tree.queries().next().unwrap();
    let NodeKind::Query { variables, .. } = &tree.node(query).kind else {
        panic!("expected query");
    };
    assert_eq!(
        variables.keys().map(String::as_str).collect::<Vec<_>>(),
        ["person", "friend", "dog", "cat"]
    );

    let friend = variables["friend"];
    let refs = bindings(&tree, "friend");
    assert_eq!(refs.len(), 3);
    assert!(refs.iter().all(|v| **v == BindingValue::Variable(friend)));
}

#[test]
fn naked_marker() {
    let (tree, diagnostics) = classify("q\n  #\n");

    assert_eq!(
        diagnostics.kinds(),
        [DiagnosticKind::NakedMarker, DiagnosticKind::UnnamedObject]
    );
    assert_eq!(diagnostics.filtered().kinds(), [DiagnosticKind::NakedMarker]);

    let object = tree.descendants(tree.root())[1];
    assert_eq!(tree.node(object).kind, NodeKind::Object { variable: None });
}

#[test]
fn naked_marker_after_named_pair_keeps_name() {
    let (tree, diagnostics) = classify("q\n  #person @\n");

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::NakedMarker]);
    let object = tree.descendants(tree.root())[1];
    let NodeKind::Object {
        variable: Some(variable),
    } = tree.node(object).kind
    else {
        panic!("expected named object");
    };
    assert_eq!(tree.variable_name(variable), Some("person"));
}

#[test]
fn naked_marker_renders_plain() {
    insta::assert_snapshot!(dump_diagnostics("q\n  #\n"), @"error at 2:3: `#` has no value");
}

#[test]
fn attribute_defects() {
    let source = indoc! {"
        q
          #p
            9: 1
            age:
            age 9
    "};
    let (tree, diagnostics) = classify(source);

    assert_eq!(
        diagnostics.kinds(),
        [
            DiagnosticKind::EmptyAttribute,
            DiagnosticKind::MissingRightHandSide,
            DiagnosticKind::ExpectedSeparator,
        ]
    );
    assert_eq!(
        bindings(&tree, "age"),
        [&BindingValue::Missing, &BindingValue::Missing]
    );

    insta::assert_snapshot!(dump_diagnostics(source), @r"
    error at 3:5: expected a field name, found `9`
    error at 4:8: `age` has no value after the separator
    error at 5:9: expected `:` or `=`, found `9`
    ");
}

#[test]
fn missing_separator_points_back_at_the_field() {
    let (_, diagnostics) = classify("q\n  #p\n    age 9\n");

    insta::assert_snapshot!(
        diagnostics.printer().render(),
        @"error at 15..16: expected `:` or `=`, found `9` (related: field `age` at 11..14)"
    );
}

#[test]
fn unrecognized_line_is_a_warning() {
    let (tree, diagnostics) = classify("q\n  stray words\n");

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::UnrecognizedLine]);
    assert!(diagnostics.has_warnings());
    assert!(!diagnostics.has_errors());

    let query = tree.queries().next().unwrap();
    assert!(tree.node(query).children.is_empty());
}

#[test]
fn lines_under_unknown_still_find_their_query() {
    let source = indoc! {"
        q
          stray
            #p
    "};
    let (tree, diagnostics) = classify(source);

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::UnrecognizedLine]);
    let query = tree.queries().next().unwrap();
    let NodeKind::Query { variables, .. } = &tree.node(query).kind else {
        panic!("expected query");
    };
    assert!(variables.contains_key("p"));
}

#[test]
fn nesting_limit_aborts() {
    let config = CompileConfig {
        max_nesting_depth: 2,
        ..CompileConfig::default()
    };
    let lines = build_line_tree(lex("a\n b\n  c\n"));
    let result = classify_lines("a\n b\n  c\n", &lines, config, SourceKind::Inline);

    assert!(matches!(
        result,
        Err(Error::NestingLimitExceeded { limit: 2, line: 3 })
    ));
}

#[test]
fn classify_is_memoized_and_parents_first() {
    let source = "q\n  #p\n    age: 9\n";
    let lines = build_line_tree(lex(source));
    let deepest = *lines.preorder().last().unwrap();

    let mut classifier =
        Classifier::new(source, &lines, CompileConfig::default(), SourceKind::Inline);
    let binding = classifier.classify(deepest).unwrap();
    let again = classifier.classify(deepest).unwrap();
    assert_eq!(binding, again);

    classifier.classify_all().unwrap();
    let (tree, diagnostics) = classifier.finish();
    assert!(diagnostics.is_empty());
    // root, query, object, tag binding, variable, age binding
    assert_eq!(tree.len(), 6);
    assert!(matches!(
        tree.node(binding).kind,
        NodeKind::Binding { ref field, .. } if field == "age"
    ));
}

#[test]
fn code_context_records_source_kind() {
    let lines = build_line_tree(lex("q\n"));
    let (tree, _) = classify_lines(
        "q\n",
        &lines,
        CompileConfig::default(),
        SourceKind::File("people.evql".to_owned()),
    )
    .unwrap();

    assert_eq!(
        tree.node(tree.root()).kind,
        NodeKind::CodeContext {
            source: SourceKind::File("people.evql".to_owned())
        }
    );
}
