use indoc::indoc;

use evql_core::EntityId;

use super::{LinkError, QueryGraph, SourceType};
use crate::test_utils::link_json;

fn ids(list: &[EntityId]) -> Vec<&str> {
    list.iter().map(EntityId::as_str).collect()
}

fn assert_bidirectional(graph: &QueryGraph) {
    for query in graph.queries() {
        for binding in query.bindings.values() {
            let variable = &query.variables[&binding.variable];
            assert!(variable.bindings.contains(&binding.id));
            let source = query.source_bindings(&binding.source).unwrap();
            assert!(source.contains(&binding.id));
        }
    }
}

#[test]
fn query_with_one_variable() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"],
          ["v1", "query", "q1"],
          ["v1", "name", "x"]
        ]
    "#})
    .unwrap();

    let root = graph.root_query();
    assert_eq!(root.id.as_str(), "q1");
    assert_eq!(root.name(), "q1");
    assert_eq!(root.variables.len(), 1);
    assert_eq!(root.variables["v1"].name, "x");
    assert!(root.variables["v1"].bindings.is_empty());
}

#[test]
fn names_fall_back_to_ids() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["q1", "name", "people"],
          ["v1", "tag", "variable"],
          ["v1", "query", "q1"]
        ]
    "#})
    .unwrap();

    assert_eq!(graph.root_query().name(), "people");
    assert_eq!(graph.root_query().variables["v1"].name, "v1");
}

#[test]
fn grouping_follows_ix_not_fact_order() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"], ["v1", "name", "a"],
          ["v2", "tag", "variable"], ["v2", "query", "q1"], ["v2", "name", "b"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"], ["e1", "operator", "count"],
          ["g1", "tag", "grouping"], ["g1", "expression", "e1"], ["g1", "ix", 1], ["g1", "variable", "v2"],
          ["g2", "tag", "grouping"], ["g2", "expression", "e1"], ["g2", "ix", 0], ["g2", "variable", "v1"]
        ]
    "#})
    .unwrap();

    let expression = &graph.root_query().expressions["e1"];
    assert_eq!(ids(&expression.grouping), ["v1", "v2"]);
    assert_eq!(expression.operator.as_deref(), Some("count"));
}

#[test]
fn grouping_ties_keep_fact_order_and_gaps_compact() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["v2", "tag", "variable"], ["v2", "query", "q1"],
          ["v3", "tag", "variable"], ["v3", "query", "q1"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"],
          ["g1", "tag", "grouping"], ["g1", "expression", "e1"], ["g1", "ix", 7], ["g1", "variable", "v1"],
          ["g2", "tag", "grouping"], ["g2", "expression", "e1"], ["g2", "ix", 2], ["g2", "variable", "v2"],
          ["g3", "tag", "grouping"], ["g3", "expression", "e1"], ["g3", "ix", 7], ["g3", "variable", "v3"]
        ]
    "#})
    .unwrap();

    let expression = &graph.root_query().expressions["e1"];
    assert_eq!(ids(&expression.grouping), ["v2", "v1", "v3"]);
    assert_eq!(expression.operator, None);
}

#[test]
fn projection_in_fact_order() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["v2", "tag", "variable"], ["v2", "query", "q1"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"],
          ["p1", "tag", "projection"], ["p1", "expression", "e1"], ["p1", "variable", "v2"],
          ["p2", "tag", "projection"], ["p2", "expression", "e1"], ["p2", "variable", "v1"]
        ]
    "#})
    .unwrap();

    assert_eq!(
        ids(&graph.root_query().expressions["e1"].projection),
        ["v2", "v1"]
    );
}

#[test]
fn bindings_link_both_ways() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"], ["v1", "name", "person"],
          ["v2", "tag", "variable"], ["v2", "query", "q1"], ["v2", "name", "age"],
          ["s1", "tag", "scan"], ["s1", "query", "q1"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"],
          ["m1", "tag", "mutate"], ["m1", "query", "q1"], ["m1", "operator", "update"],
          ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "field", "entity"], ["b1", "source", "s1"],
          ["b2", "tag", "binding"], ["b2", "variable", "v2"], ["b2", "field", "age"], ["b2", "source", "s1"],
          ["b3", "tag", "binding"], ["b3", "variable", "v2"], ["b3", "field", "value"], ["b3", "source", "e1"],
          ["b4", "tag", "binding"], ["b4", "variable", "v1"], ["b4", "field", "entity"], ["b4", "source", "m1"],
          ["b5", "tag", "binding"], ["b5", "field", "tag"], ["b5", "source", "s1"], ["b5", "value", "person"]
        ]
    "#})
    .unwrap();

    assert_bidirectional(&graph);
    let query = graph.root_query();
    assert_eq!(query.bindings.len(), 4);
    assert_eq!(ids(&query.variables["v1"].bindings), ["b1", "b4"]);
    assert_eq!(ids(&query.variables["v2"].bindings), ["b2", "b3"]);
    assert_eq!(ids(&query.scans["s1"].bindings), ["b1", "b2"]);
    assert_eq!(ids(&query.expressions["e1"].bindings), ["b3"]);
    assert_eq!(ids(&query.mutates["m1"].bindings), ["b4"]);
    assert_eq!(query.bindings["b3"].source.kind, SourceType::Expression);
    assert_eq!(query.mutates["m1"].operator.as_str(), "update");
}

#[test]
fn control_members_link_in_pre_order() {
    let graph = link_json(indoc! {r#"
        [
          ["q0", "tag", "query"],
          ["u1", "tag", "union"], ["u1", "query", "q0"],
          ["qa", "tag", "query"], ["qa", "parent", "u1"],
          ["qb", "tag", "query"], ["qb", "parent", "u1"],
          ["n1", "tag", "not"], ["n1", "query", "qa"],
          ["qc", "tag", "query"], ["qc", "parent", "n1"],
          ["c1", "tag", "choose"], ["c1", "query", "q0"]
        ]
    "#})
    .unwrap();

    let order: Vec<&str> = graph.queries().map(|q| q.id.as_str()).collect();
    assert_eq!(order, ["q0", "qa", "qc", "qb"]);

    let root = graph.root_query();
    assert_eq!(ids(&root.unions["u1"].members), ["qa", "qb"]);
    assert!(root.chooses["c1"].members.is_empty());
    assert_eq!(graph.query("qa").unwrap().nots["n1"].body.as_str(), "qc");
    assert_eq!(
        graph.query("qc").unwrap().parent.as_ref().map(EntityId::as_str),
        Some("n1")
    );
}

#[test]
fn node_lookup_by_id() {
    let graph = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["s1", "tag", "scan"], ["s1", "query", "q1"],
          ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "field", "f"], ["b1", "source", "s1"]
        ]
    "#})
    .unwrap();

    let kinds: Vec<_> = ["q1", "v1", "s1", "b1"]
        .iter()
        .map(|id| graph.node(id).map(|n| (n.kind_name(), n.id().as_str())))
        .collect();
    assert_eq!(
        kinds,
        [
            Some(("Query", "q1")),
            Some(("Variable", "v1")),
            Some(("Scan", "s1")),
            Some(("Binding", "b1")),
        ]
    );
    assert!(graph.node("nope").is_none());
}

#[test]
fn missing_root() {
    assert_eq!(link_json("[]"), Err(LinkError::MissingRoot));
    let err = link_json(r#"[["q1", "tag", "query"], ["q1", "parent", "x"]]"#);
    assert_eq!(err, Err(LinkError::MissingRoot));
}

#[test]
fn multiple_roots() {
    let err = link_json(r#"[["q1", "tag", "query"], ["q2", "tag", "query"]]"#).unwrap_err();
    assert_eq!(
        err,
        LinkError::MultipleRoots {
            first: "q1".into(),
            second: "q2".into()
        }
    );
    insta::assert_snapshot!(err.to_string(), @"multiple root queries: `q1` and `q2`");
}

#[test]
fn unknown_source() {
    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "field", "f"], ["b1", "source", "ghost"]
        ]
    "#})
    .unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"binding `b1` in query `q1` names unknown source `ghost`");
}

#[test]
fn source_of_another_query_is_unknown() {
    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["n1", "tag", "not"], ["n1", "query", "q1"],
          ["q2", "tag", "query"], ["q2", "parent", "n1"],
          ["s2", "tag", "scan"], ["s2", "query", "q2"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "field", "f"], ["b1", "source", "s2"]
        ]
    "#})
    .unwrap_err();

    assert!(matches!(err, LinkError::UnknownSource { ref source_id, .. } if source_id == "s2"));
}

#[test]
fn unknown_variable() {
    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"],
          ["p1", "tag", "projection"], ["p1", "expression", "e1"], ["p1", "variable", "v9"]
        ]
    "#})
    .unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"`p1` in query `q1` names unknown variable `v9`");
}

#[test]
fn missing_attribute() {
    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["s1", "tag", "scan"], ["s1", "query", "q1"],
          ["b1", "tag", "binding"], ["b1", "variable", "v1"], ["b1", "source", "s1"]
        ]
    "#})
    .unwrap_err();

    assert_eq!(
        err,
        LinkError::MissingAttribute {
            entity: "b1".into(),
            attribute: "field"
        }
    );
}

#[test]
fn mutate_needs_an_operator() {
    let err = link_json(r#"[["q1", "tag", "query"], ["m1", "tag", "mutate"], ["m1", "query", "q1"]]"#)
        .unwrap_err();
    assert_eq!(
        err,
        LinkError::MissingAttribute {
            entity: "m1".into(),
            attribute: "operator"
        }
    );
}

#[test]
fn attribute_type() {
    let err = link_json(r#"[["q1", "tag", "query"], ["q1", "name", 5]]"#).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"`q1` attribute `name` should be text, found number");

    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["v1", "tag", "variable"], ["v1", "query", "q1"],
          ["e1", "tag", "expression"], ["e1", "query", "q1"],
          ["g1", "tag", "grouping"], ["g1", "expression", "e1"], ["g1", "ix", "first"], ["g1", "variable", "v1"]
        ]
    "#})
    .unwrap_err();
    assert_eq!(
        err,
        LinkError::AttributeType {
            entity: "g1".into(),
            attribute: "ix",
            expected: "number",
            found: "text"
        }
    );
}

#[test]
fn invalid_operator() {
    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["m1", "tag", "mutate"], ["m1", "query", "q1"], ["m1", "operator", "explode"]
        ]
    "#})
    .unwrap_err();

    assert_eq!(
        err,
        LinkError::InvalidOperator {
            entity: "m1".into(),
            operator: "explode".to_owned()
        }
    );
}

#[test]
fn not_needs_exactly_one_body() {
    let err = link_json(r#"[["q1", "tag", "query"], ["n1", "tag", "not"], ["n1", "query", "q1"]]"#)
        .unwrap_err();
    assert_eq!(
        err,
        LinkError::NotBody {
            entity: "n1".into(),
            count: 0
        }
    );

    let err = link_json(indoc! {r#"
        [
          ["q1", "tag", "query"],
          ["n1", "tag", "not"], ["n1", "query", "q1"],
          ["qa", "tag", "query"], ["qa", "parent", "n1"],
          ["qb", "tag", "query"], ["qb", "parent", "n1"]
        ]
    "#})
    .unwrap_err();
    assert_eq!(
        err,
        LinkError::NotBody {
            entity: "n1".into(),
            count: 2
        }
    );
}

#[test]
fn revisiting_a_query_is_a_cycle() {
    let tags = crate::test_utils::tag_map(r#"[["q1", "tag", "query"]]"#);
    let root = &tags.get(&evql_core::Tag::Query)[0];

    let mut linker = super::link::Linker::new(&tags);
    linker.build_query(root).unwrap();
    assert_eq!(
        linker.build_query(root),
        Err(LinkError::QueryCycle { query: "q1".into() })
    );
}
