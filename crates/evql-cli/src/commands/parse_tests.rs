use std::path::PathBuf;

use evql_compiler::CompileConfig;

use super::input_loader::Input;
use super::parse::{ParseArgs, Stages, render};

fn args(stages: Stages) -> ParseArgs {
    ParseArgs {
        input: PathBuf::from("-"),
        config: CompileConfig::default(),
        stages,
        spans: false,
        json: false,
        names: true,
        color: false,
    }
}

fn tree_only() -> Stages {
    Stages {
        tree: true,
        ..Stages::default()
    }
}

#[test]
fn prints_parse_tree() {
    let rendered = render(&args(tree_only()), &Input::inline("q\n  #person\n    age: 9\n")).unwrap();

    assert_eq!(rendered.diagnostics, "");
    insta::assert_snapshot!(rendered.output, @r#"
    CodeContext <program>
      Query "q" [person]
        Object $person
          Binding tag = "person"
          Binding age = 9
    "#);
}

#[test]
fn sections_follow_pipeline_order() {
    let stages = Stages {
        lines: true,
        graph: true,
        ..Stages::default()
    };
    let rendered = render(&args(stages), &Input::inline("q\n  #p\n")).unwrap();

    insta::assert_snapshot!(rendered.output, @r#"
    Root
      1:0 q
        2:2 #p

    Query q0 "q"
      Variable q0.v0 p [q0.b0]
      Binding q0.b0 p entity <- scan q0.s0
      Scan q0.s0 [q0.b0]
    "#);
}

#[test]
fn facts_as_json() {
    let mut args = args(Stages {
        facts: true,
        ..Stages::default()
    });
    args.json = true;
    let rendered = render(&args, &Input::inline("q\n")).unwrap();

    assert!(rendered.output.starts_with("[\n"));
    assert!(rendered.output.contains(r#"["q0","tag","query"]"#));
    assert!(rendered.output.ends_with("]\n"));
}

#[test]
fn tokens_with_spans() {
    let mut args = args(Stages {
        tokens: true,
        ..Stages::default()
    });
    args.spans = true;
    let rendered = render(&args, &Input::inline("q\n")).unwrap();
    assert!(rendered.output.ends_with(" [0..1]\n"));
}

#[test]
fn warnings_are_reported_but_do_not_fail() {
    let rendered = render(&args(tree_only()), &Input::inline("q\n  stray\n")).unwrap();
    assert!(rendered.diagnostics.contains("`stray`"));
    assert!(rendered.output.starts_with("CodeContext"));
}

#[test]
fn errors_fail_with_diagnostics() {
    let failure = render(&args(tree_only()), &Input::inline("q\n  #\n")).err().unwrap();
    assert!(failure.contains("has no value"));
}

#[test]
fn nesting_limit_fails() {
    let mut args = args(tree_only());
    args.config.max_nesting_depth = 1;

    let failure = render(&args, &Input::inline("q\n  #a\n")).err().unwrap();
    assert_eq!(failure, "error: nesting limit of 1 exceeded on line 2\n");
}
