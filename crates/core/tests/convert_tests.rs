//! Integration tests for the script-to-graph conversion.
//!
//! These tests assemble script documents in memory, run the full traversal
//! and graph construction, and verify the resulting nodes, edges, and
//! attributes against known expectations.

use scriptgraph_core::builder::add_transition_entry;
use scriptgraph_core::{
    graph_to_script, script_to_graph, ConvertError, FlowNode, MapResolver, NodeId, ParsedValue,
    ScriptDoc, ScriptMap, SourceRef, TaggedValue, Value,
};

fn lit(s: &str) -> TaggedValue {
    TaggedValue::literal(s, SourceRef::root())
}

fn expr(s: &str) -> TaggedValue {
    TaggedValue::expression(s, SourceRef::root())
}

fn tag(tag: TaggedValue) -> Value {
    Value::Tag(tag)
}

fn map(entries: Vec<(TaggedValue, Value)>) -> Value {
    Value::Map(entries.into_iter().collect())
}

fn entries(value: Value) -> ScriptMap {
    match value {
        Value::Map(map) => map,
        Value::Tag(_) => panic!("expected a mapping"),
    }
}

/// Two flows exercising every destination kind, a global scope, and a
/// transition-less node.
fn sample_doc() -> ScriptDoc {
    let script = map(vec![
        (
            expr("GLOBAL"),
            map(vec![(
                expr("TRANSITIONS"),
                map(vec![(expr("lbl.to_start()"), tag(expr("cnd.regexp('hi')")))]),
            )]),
        ),
        (
            lit("flow_a"),
            map(vec![
                (
                    lit("n1"),
                    map(vec![
                        (expr("RESPONSE"), tag(lit("hello"))),
                        (
                            expr("TRANSITIONS"),
                            map(vec![
                                (lit("n2"), tag(expr("cnd.exact_match('next')"))),
                                (expr("lbl.forward()"), tag(expr("cnd.true()"))),
                            ]),
                        ),
                    ]),
                ),
                (
                    lit("n2"),
                    map(vec![(
                        expr("TRANSITIONS"),
                        map(vec![
                            (
                                TaggedValue::expression_with_parsed(
                                    "(\"flow_b\", \"start\")",
                                    ParsedValue::Pair(lit("flow_b"), lit("start")),
                                    SourceRef::root(),
                                ),
                                tag(expr("cnd.true()")),
                            ),
                            (expr("lbl.repeat()"), tag(expr("cnd.otherwise()"))),
                        ]),
                    )]),
                ),
                (lit("n3"), map(vec![(expr("RESPONSE"), tag(lit("bye")))])),
            ]),
        ),
        (
            lit("flow_b"),
            map(vec![(
                lit("start"),
                map(vec![(
                    expr("TRANSITIONS"),
                    map(vec![(expr("unknown.pick()"), tag(expr("cnd.true()")))]),
                )]),
            )]),
        ),
    ]);
    ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "n1"),
        fallback_label: Some(FlowNode::new("flow_a", "n1")),
    }
}

// ──────────────────────────────────────────────
// Node registration
// ──────────────────────────────────────────────

#[test]
fn all_declared_nodes_appear() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    for id in [
        NodeId::Global,
        NodeId::label("flow_a", "n1"),
        NodeId::label("flow_a", "n2"),
        NodeId::label("flow_a", "n3"),
        NodeId::label("flow_b", "start"),
    ] {
        assert!(graph.node(&id).is_some(), "missing node {}", id);
    }
}

#[test]
fn transition_less_node_has_attributes_and_no_edges() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    let id = NodeId::label("flow_a", "n3");
    let data = graph.node(&id).unwrap();
    assert_eq!(data.source_ref.segments(), ["script", "flow_a", "n3"]);
    assert!(!data.local);
    assert!(graph.edges_from(&id).is_empty());
}

#[test]
fn global_scope_becomes_the_singleton_node() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    let data = graph.node(&NodeId::Global).unwrap();
    assert_eq!(data.source_ref.segments(), ["script", "GLOBAL"]);

    let out = graph.edges_from(&NodeId::Global);
    assert_eq!(out.len(), 1);
    assert_eq!(*out[0].0, NodeId::label("flow_a", "n1"));
    assert_eq!(out[0].1.label, "lbl.to_start()");
}

#[test]
fn local_key_sets_the_local_flag() {
    let script = map(vec![(
        lit("flow_a"),
        map(vec![
            (
                expr("LOCAL"),
                map(vec![(expr("RESPONSE"), tag(lit("fallback text")))]),
            ),
            (lit("n1"), map(vec![(expr("RESPONSE"), tag(lit("hi")))])),
        ]),
    )]);
    let doc = ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "n1"),
        fallback_label: None,
    };
    let graph = script_to_graph(&doc, &MapResolver::new()).unwrap();

    assert!(graph.node(&NodeId::label("flow_a", "LOCAL")).unwrap().local);
    assert!(!graph.node(&NodeId::label("flow_a", "n1")).unwrap().local);
}

// ──────────────────────────────────────────────
// Edges and destinations
// ──────────────────────────────────────────────

#[test]
fn destinations_cover_all_resolution_kinds() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    let n1 = graph.edges_from(&NodeId::label("flow_a", "n1"));
    assert_eq!(n1.len(), 2);
    // bare sibling reference
    assert_eq!(*n1[0].0, NodeId::label("flow_a", "n2"));
    assert_eq!(n1[0].1.label, "n2");
    assert_eq!(n1[0].1.condition, "cnd.exact_match('next')");
    // forward from n1 in [n1, n2, n3]
    assert_eq!(*n1[1].0, NodeId::label("flow_a", "n2"));
    assert_eq!(n1[1].1.label, "lbl.forward()");

    let n2 = graph.edges_from(&NodeId::label("flow_a", "n2"));
    assert_eq!(n2.len(), 2);
    // statically-encoded pair
    assert_eq!(*n2[0].0, NodeId::label("flow_b", "start"));
    // repeat
    assert_eq!(*n2[1].0, NodeId::label("flow_a", "n2"));

    let start = graph.edges_from(&NodeId::label("flow_b", "start"));
    assert_eq!(start.len(), 1);
    // unrecognized call becomes the sentinel destination
    assert_eq!(*start[0].0, NodeId::Unresolved);
}

#[test]
fn edge_refs_point_into_the_document() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    let n1 = graph.edges_from(&NodeId::label("flow_a", "n1"));
    assert_eq!(
        n1[0].1.label_ref.segments(),
        ["script", "flow_a", "n1", "TRANSITIONS"]
    );
    assert_eq!(
        n1[0].1.condition_ref.segments(),
        ["script", "flow_a", "n1", "TRANSITIONS", "n2"]
    );
}

#[test]
fn parallel_transitions_between_the_same_nodes_are_kept() {
    let script = map(vec![(
        lit("flow_a"),
        map(vec![
            (
                lit("n1"),
                map(vec![(
                    expr("TRANSITIONS"),
                    map(vec![
                        (lit("n2"), tag(expr("cnd.exact_match('a')"))),
                        (expr("lbl.forward()"), tag(expr("cnd.exact_match('b')"))),
                    ]),
                )]),
            ),
            (lit("n2"), map(vec![])),
        ]),
    )]);
    let doc = ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "n1"),
        fallback_label: None,
    };
    let graph = script_to_graph(&doc, &MapResolver::new()).unwrap();

    let out = graph.edges_from(&NodeId::label("flow_a", "n1"));
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|(to, _)| **to == NodeId::label("flow_a", "n2")));
    assert_eq!(out[0].1.condition, "cnd.exact_match('a')");
    assert_eq!(out[1].1.condition, "cnd.exact_match('b')");
}

// ──────────────────────────────────────────────
// Resolver interaction
// ──────────────────────────────────────────────

#[test]
fn expression_values_expand_through_the_resolver() {
    // flow_b is declared in another namespace and referenced by name
    let mut resolver = MapResolver::new();
    let flow_b = map(vec![(
        lit("start"),
        map(vec![(expr("RESPONSE"), tag(lit("hello")))]),
    )]);
    resolver.insert(
        "other.flow_b_def",
        flow_b,
        SourceRef::from_segments(["other", "flow_b_def"]),
    );

    let script = map(vec![
        (
            lit("flow_a"),
            map(vec![(lit("n1"), map(vec![(expr("RESPONSE"), tag(lit("hi")))]))]),
        ),
        (lit("flow_b"), tag(expr("other.flow_b_def"))),
    ]);
    let doc = ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "n1"),
        fallback_label: None,
    };
    let graph = script_to_graph(&doc, &resolver).unwrap();

    let data = graph.node(&NodeId::label("flow_b", "start")).unwrap();
    // the ref is redirected to where the flow is actually declared
    assert_eq!(data.source_ref.segments(), ["other", "flow_b_def", "start"]);
}

#[test]
fn condition_text_is_resolved_through_names() {
    let mut resolver = MapResolver::new();
    resolver.insert(
        "conditions.always",
        tag(expr("cnd.true()")),
        SourceRef::from_segments(["conditions", "always"]),
    );

    let script = map(vec![(
        lit("flow_a"),
        map(vec![(
            lit("n1"),
            map(vec![(
                expr("TRANSITIONS"),
                map(vec![(expr("lbl.repeat()"), tag(expr("conditions.always")))]),
            )]),
        )]),
    )]);
    let doc = ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "n1"),
        fallback_label: None,
    };
    let graph = script_to_graph(&doc, &resolver).unwrap();

    let out = graph.edges_from(&NodeId::label("flow_a", "n1"));
    assert_eq!(out[0].1.condition, "cnd.true()");
}

// ──────────────────────────────────────────────
// Validation failures
// ──────────────────────────────────────────────

#[test]
fn empty_traversed_path_fails_validation() {
    let mut graph = scriptgraph_core::ScriptGraph::new();
    let script = ScriptMap::new();
    let start = FlowNode::new("flow_a", "n1");
    let err = add_transition_entry(
        &mut graph,
        &[],
        &tag(lit("cnd.true()")),
        &[SourceRef::from_segments(["script"])],
        &MapResolver::new(),
        &script,
        &start,
        &start,
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
}

#[test]
fn mapping_valued_condition_fails_validation() {
    let mut graph = scriptgraph_core::ScriptGraph::new();
    let script = entries(map(vec![(
        lit("flow_a"),
        map(vec![(lit("n1"), map(vec![]))]),
    )]));
    let start = FlowNode::new("flow_a", "n1");
    let path = [lit("flow_a"), lit("n1"), expr("TRANSITIONS"), lit("n1")];
    let refs = [
        SourceRef::from_segments(["script"]),
        SourceRef::from_segments(["script", "flow_a"]),
        SourceRef::from_segments(["script", "flow_a", "n1"]),
        SourceRef::from_segments(["script", "flow_a", "n1", "TRANSITIONS"]),
        SourceRef::from_segments(["script", "flow_a", "n1", "TRANSITIONS", "n1"]),
    ];
    let err = add_transition_entry(
        &mut graph,
        &path,
        &map(vec![(lit("nested"), tag(lit("broken")))]),
        &refs,
        &MapResolver::new(),
        &script,
        &start,
        &start,
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
}

#[test]
fn unknown_start_label_fails_validation() {
    let script = map(vec![(
        lit("flow_a"),
        map(vec![(lit("n1"), map(vec![(expr("RESPONSE"), tag(lit("hi")))]))]),
    )]);
    let doc = ScriptDoc {
        script: entries(script),
        start_label: FlowNode::new("flow_a", "missing"),
        fallback_label: None,
    };
    let err = script_to_graph(&doc, &MapResolver::new()).unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
}

// ──────────────────────────────────────────────
// Markers and determinism
// ──────────────────────────────────────────────

#[test]
fn start_and_fallback_nodes_are_marked() {
    let graph = script_to_graph(&sample_doc(), &MapResolver::new()).unwrap();

    let start = graph.node(&NodeId::label("flow_a", "n1")).unwrap();
    assert!(start.start_label);
    assert!(start.fallback_label);
    let other = graph.node(&NodeId::label("flow_a", "n2")).unwrap();
    assert!(!other.start_label);
    assert!(!other.fallback_label);
}

#[test]
fn conversion_is_deterministic() {
    let doc = sample_doc();
    let resolver = MapResolver::new();
    let first = script_to_graph(&doc, &resolver).unwrap();
    let second = script_to_graph(&doc, &resolver).unwrap();

    let nodes = |g: &scriptgraph_core::ScriptGraph| {
        g.nodes()
            .map(|(id, data)| (id.clone(), data.clone()))
            .collect::<Vec<_>>()
    };
    let edges = |g: &scriptgraph_core::ScriptGraph| {
        g.edges()
            .map(|(from, to, data)| (from.clone(), to.clone(), data.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(nodes(&first), nodes(&second));
    assert_eq!(edges(&first), edges(&second));
}

// ──────────────────────────────────────────────
// Regeneration
// ──────────────────────────────────────────────

#[test]
fn regenerated_script_preserves_flows_nodes_and_transitions() {
    let doc = sample_doc();
    let graph = script_to_graph(&doc, &MapResolver::new()).unwrap();
    let regenerated = graph_to_script(&graph).unwrap();

    assert_eq!(regenerated.start_label, FlowNode::new("flow_a", "n1"));
    assert_eq!(
        regenerated.fallback_label,
        Some(FlowNode::new("flow_a", "n1"))
    );

    let top_keys: Vec<String> = regenerated
        .script
        .keys()
        .map(|k| k.display_text())
        .collect();
    assert_eq!(top_keys, ["GLOBAL", "flow_a", "flow_b"]);

    let flow_a = regenerated
        .script
        .iter()
        .find(|(k, _)| k.display_text() == "flow_a")
        .and_then(|(_, v)| v.as_map())
        .unwrap();
    let node_keys: Vec<String> = flow_a.keys().map(|k| k.display_text()).collect();
    assert_eq!(node_keys, ["n1", "n2", "n3"]);

    let n1_transitions = flow_a
        .iter()
        .find(|(k, _)| k.display_text() == "n1")
        .and_then(|(_, v)| v.as_map())
        .and_then(|node| {
            node.iter()
                .find(|(k, _)| k.display_text() == "TRANSITIONS")
                .and_then(|(_, v)| v.as_map())
        })
        .unwrap();
    let labels: Vec<String> = n1_transitions.keys().map(|k| k.display_text()).collect();
    assert_eq!(labels, ["n2", "lbl.forward()"]);
}

#[test]
fn regenerating_an_unmarked_graph_fails() {
    let graph = scriptgraph_core::ScriptGraph::new();
    let err = graph_to_script(&graph).unwrap_err();
    assert!(matches!(err, ConvertError::Validation { .. }));
}
