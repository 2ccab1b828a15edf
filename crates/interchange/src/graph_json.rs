//! Conversions between the core graph and the node-link JSON document.

use scriptgraph_core::{EdgeData, NodeId, ScriptGraph, SourceRef};

use crate::types::{GraphDocument, GraphEdge, GraphNode};
use crate::InterchangeError;

/// Encode a populated graph as an interchange document.
pub fn to_document(graph: &ScriptGraph) -> GraphDocument {
    let nodes = graph
        .nodes()
        .map(|(id, data)| GraphNode {
            id: id.segments(),
            source_ref: data.source_ref.segments().to_vec(),
            local: data.local,
            start_label: data.start_label,
            fallback_label: data.fallback_label,
        })
        .collect();
    let edges = graph
        .edges()
        .map(|(source, target, data)| GraphEdge {
            source: source.segments(),
            target: target.segments(),
            label: data.label.clone(),
            label_ref: data.label_ref.segments().to_vec(),
            condition: data.condition.clone(),
            condition_ref: data.condition_ref.segments().to_vec(),
        })
        .collect();
    GraphDocument { nodes, edges }
}

/// Decode an interchange document back into a graph.
pub fn from_document(document: &GraphDocument) -> Result<ScriptGraph, InterchangeError> {
    let mut graph = ScriptGraph::new();
    for node in &document.nodes {
        let id = decode_id(&node.id)?;
        graph.upsert_node(id.clone(), SourceRef(node.source_ref.clone()), node.local);
        if node.start_label {
            graph.mark_start_label(&id);
        }
        if node.fallback_label {
            graph.mark_fallback_label(&id);
        }
    }
    for edge in &document.edges {
        let source = decode_id(&edge.source)?;
        let target = decode_id(&edge.target)?;
        graph.add_transition(
            &source,
            &target,
            EdgeData {
                label: edge.label.clone(),
                label_ref: SourceRef(edge.label_ref.clone()),
                condition: edge.condition.clone(),
                condition_ref: SourceRef(edge.condition_ref.clone()),
            },
        );
    }
    Ok(graph)
}

/// Serialize a graph to pretty-printed JSON.
pub fn save_graph(graph: &ScriptGraph) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(&to_document(graph))?)
}

/// Deserialize a graph from JSON text.
pub fn load_graph(text: &str) -> Result<ScriptGraph, InterchangeError> {
    let document: GraphDocument = serde_json::from_str(text)?;
    from_document(&document)
}

fn decode_id(segments: &[String]) -> Result<NodeId, InterchangeError> {
    NodeId::from_segments(segments)
        .ok_or_else(|| InterchangeError::InvalidNodeId(segments.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(label: &str) -> EdgeData {
        EdgeData {
            label: label.to_owned(),
            label_ref: SourceRef::from_segments(["script", "flow_a", "n1", "TRANSITIONS"]),
            condition: "cnd.true()".to_owned(),
            condition_ref: SourceRef::from_segments([
                "script",
                "flow_a",
                "n1",
                "TRANSITIONS",
                label,
            ]),
        }
    }

    fn sample_graph() -> ScriptGraph {
        let mut graph = ScriptGraph::new();
        let n1 = NodeId::label("flow_a", "n1");
        let n2 = NodeId::label("flow_a", "n2");
        graph.upsert_node(
            n1.clone(),
            SourceRef::from_segments(["script", "flow_a", "n1"]),
            false,
        );
        graph.upsert_node(
            n2.clone(),
            SourceRef::from_segments(["script", "flow_a", "n2"]),
            false,
        );
        graph.mark_start_label(&n1);
        graph.add_transition(&n1, &n2, edge("n2"));
        graph.add_transition(&n1, &NodeId::Unresolved, edge("fn.choose()"));
        graph
    }

    #[test]
    fn document_round_trips_through_json() {
        let graph = sample_graph();
        let decoded = load_graph(&save_graph(&graph).unwrap()).unwrap();

        let nodes = |g: &ScriptGraph| {
            g.nodes()
                .map(|(id, data)| (id.clone(), data.clone()))
                .collect::<Vec<_>>()
        };
        let edges = |g: &ScriptGraph| {
            g.edges()
                .map(|(a, b, d)| (a.clone(), b.clone(), d.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(nodes(&graph), nodes(&decoded));
        assert_eq!(edges(&graph), edges(&decoded));
    }

    #[test]
    fn sentinel_ids_use_the_tuple_encoding() {
        let document = to_document(&sample_graph());
        assert_eq!(document.edges[1].target, ["NONE"]);
        assert!(document.nodes.iter().any(|n| n.id == ["NONE"]));
    }

    #[test]
    fn start_marker_survives_the_round_trip() {
        let decoded = load_graph(&save_graph(&sample_graph()).unwrap()).unwrap();
        assert!(
            decoded
                .node(&NodeId::label("flow_a", "n1"))
                .unwrap()
                .start_label
        );
    }

    #[test]
    fn unknown_sentinel_is_rejected() {
        let document = GraphDocument {
            nodes: vec![GraphNode {
                id: vec!["OTHER".to_owned()],
                source_ref: Vec::new(),
                local: false,
                start_label: false,
                fallback_label: false,
            }],
            edges: Vec::new(),
        };
        assert!(matches!(
            from_document(&document),
            Err(InterchangeError::InvalidNodeId(_))
        ));
    }
}
