use indoc::indoc;
use proptest::prelude::*;

use super::{ExpressionShape, GraphShape, SourceRef, SourceType, VariableShape};
use crate::test_utils::{link_json, link_program};

const EXPRESSION_FACTS: &str = r#"[
  ["q", "tag", "query"], ["q", "name", "totals"],
  ["v1", "tag", "variable"], ["v1", "query", "q"], ["v1", "name", "item"],
  ["v2", "tag", "variable"], ["v2", "query", "q"], ["v2", "name", "sum"],
  ["e", "tag", "expression"], ["e", "query", "q"], ["e", "operator", "sum"],
  ["p", "tag", "projection"], ["p", "expression", "e"], ["p", "variable", "v2"],
  ["g", "tag", "grouping"], ["g", "expression", "e"], ["g", "variable", "v1"], ["g", "ix", 0],
  ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "field", "in"], ["b1", "source", "e"],
  ["b2", "tag", "binding"], ["b2", "variable", "v2"], ["b2", "field", "out"], ["b2", "source", "e"]
]"#;

#[test]
fn shape_of_expression_query() {
    let graph = link_json(EXPRESSION_FACTS).unwrap();
    let shape = GraphShape::of(&graph);

    assert_eq!(shape.queries.len(), 1);
    let query = &shape.queries[0];
    assert_eq!(query.name, "totals");
    assert_eq!(query.scans, 0);
    assert_eq!(
        query.expressions,
        [ExpressionShape {
            operator: Some("sum".to_owned()),
            bindings: vec![
                ("item".to_owned(), "in".to_owned()),
                ("sum".to_owned(), "out".to_owned()),
            ],
            projection: vec!["sum".to_owned()],
            grouping: vec!["item".to_owned()],
        }]
    );
    assert_eq!(
        query.variables[0],
        VariableShape {
            name: "item".to_owned(),
            bindings: vec![("expression".to_owned(), "in".to_owned())],
        }
    );
}

#[test]
fn shape_ignores_ids_and_fact_order() {
    let renamed = EXPRESSION_FACTS
        .replace("\"v1\"", "\"first\"")
        .replace("\"b2\"", "\"zz\"");
    let a = link_json(EXPRESSION_FACTS).unwrap();
    let b = link_json(&renamed).unwrap();

    assert_ne!(a, b);
    assert_eq!(GraphShape::of(&a), GraphShape::of(&b));
}

#[test]
fn shape_tells_different_fields_apart() {
    let a = link_program("q\n  #p\n    x\n");
    let b = link_program("q\n  #p\n    y\n");
    assert_ne!(GraphShape::of(&a), GraphShape::of(&b));
}

#[test]
fn control_members_show_up_as_queries() {
    let graph = link_json(indoc! {r#"
        [
          ["root", "tag", "query"], ["root", "name", "outer"],
          ["u", "tag", "union"], ["u", "query", "root"],
          ["a", "tag", "query"], ["a", "name", "left"], ["a", "parent", "u"],
          ["b", "tag", "query"], ["b", "name", "right"], ["b", "parent", "u"]
        ]
    "#})
    .unwrap();
    let shape = GraphShape::of(&graph);

    let names: Vec<&str> = shape.queries.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, ["outer", "left", "right"]);
    assert_eq!(shape.queries[0].unions, [2]);
}

fn program(objects: &[(usize, Vec<usize>)]) -> String {
    const TAGS: [&str; 3] = ["person", "dog", "city"];
    const FIELDS: [&str; 3] = ["x", "y", "z"];

    let mut out = String::from("q\n");
    for (tag, fields) in objects {
        out.push_str(&format!("  #{}\n", TAGS[*tag]));
        for field in fields {
            out.push_str(&format!("    {}\n", FIELDS[*field]));
        }
    }
    out
}

proptest! {
    #[test]
    fn bindings_are_linked_both_ways(
        objects in prop::collection::vec((0..3usize, prop::collection::vec(0..3usize, 0..4)), 1..5)
    ) {
        let graph = link_program(&program(&objects));
        let query = graph.root_query();

        let expected = objects.len() + objects.iter().map(|(_, f)| f.len()).sum::<usize>();
        prop_assert_eq!(query.bindings.len(), expected);
        prop_assert_eq!(query.scans.len(), objects.len());

        for binding in query.bindings.values() {
            let variable = &query.variables[&binding.variable];
            prop_assert_eq!(variable.bindings.iter().filter(|b| **b == binding.id).count(), 1);

            prop_assert_eq!(binding.source.kind, SourceType::Scan);
            let listed = query.source_bindings(&binding.source).unwrap_or_default();
            prop_assert!(listed.contains(&binding.id));
        }

        for variable in query.variables.values() {
            for id in &variable.bindings {
                prop_assert_eq!(&query.bindings[id].variable, &variable.id);
            }
        }

        let missing = SourceRef { kind: SourceType::Scan, id: "nowhere".into() };
        prop_assert!(query.source_bindings(&missing).is_none());
    }
}
