//! Script regeneration from a populated graph.
//!
//! The reverse of [`script_to_graph`](crate::builder::script_to_graph):
//! walks nodes and edges in insertion order and re-emits an equivalent
//! structured script document. Label and condition text are reproduced
//! verbatim from the edge attributes; destination-only nodes (created by
//! edges pointing at states the script never declared) are left out.

use crate::error::ConvertError;
use crate::graph::{NodeId, ScriptGraph};
use crate::script::{FlowNode, ScriptDoc, ScriptMap, Value};
use crate::tags::{SourceRef, TaggedValue};

const TRANSITIONS_KEY: &str = "TRANSITIONS";
const GLOBAL_KEY: &str = "GLOBAL";

/// Rebuild a script document from a graph.
///
/// Fails when the graph carries no start-label marker: a document cannot be
/// regenerated without one.
pub fn graph_to_script(graph: &ScriptGraph) -> Result<ScriptDoc, ConvertError> {
    let script_root = SourceRef::from_segments(["script"]);
    let mut script = ScriptMap::new();
    let mut start_label = None;
    let mut fallback_label = None;

    for (id, data) in graph.nodes() {
        match id {
            NodeId::Global => {
                ensure_map_entry(&mut script, keyword_tag(GLOBAL_KEY, &script_root));
            }
            NodeId::Label(label) => {
                // Declared nodes carry the ref recorded during traversal;
                // destination-only nodes do not and are skipped.
                if data.source_ref.is_empty() {
                    continue;
                }
                ensure_node_entry(&mut script, &script_root, label);
                if data.start_label {
                    start_label = Some(label.clone());
                }
                if data.fallback_label {
                    fallback_label = Some(label.clone());
                }
            }
            NodeId::Unresolved => {}
        }
    }

    for (source, _, edge) in graph.edges() {
        let (node, node_path) = match source {
            NodeId::Global => (
                ensure_map_entry(&mut script, keyword_tag(GLOBAL_KEY, &script_root)),
                script_root.child(GLOBAL_KEY),
            ),
            NodeId::Label(label) => (
                ensure_node_entry(&mut script, &script_root, label),
                script_root.child(&label.flow).child(&label.node),
            ),
            NodeId::Unresolved => continue,
        };
        let transitions = ensure_map_entry(node, keyword_tag(TRANSITIONS_KEY, &node_path));
        let label_path = node_path.child(TRANSITIONS_KEY).child(&edge.label);
        transitions.insert(
            text_tag(&edge.label, label_path.clone()),
            Value::Tag(text_tag(&edge.condition, label_path)),
        );
    }

    let Some(start_label) = start_label else {
        return Err(ConvertError::validation(
            "graph has no start-label node, cannot regenerate a script",
            SourceRef::root(),
        ));
    };

    Ok(ScriptDoc {
        script,
        start_label,
        fallback_label,
    })
}

fn ensure_node_entry<'a>(
    script: &'a mut ScriptMap,
    script_root: &SourceRef,
    label: &FlowNode,
) -> &'a mut ScriptMap {
    let flow_ref = script_root.child(&label.flow);
    let node_ref = flow_ref.child(&label.node);
    let flow = ensure_map_entry(script, TaggedValue::literal(&label.flow, flow_ref));
    ensure_map_entry(flow, TaggedValue::literal(&label.node, node_ref))
}

fn keyword_tag(keyword: &str, parent: &SourceRef) -> TaggedValue {
    TaggedValue::expression(keyword, parent.child(keyword))
}

/// Labels and conditions were flattened to text when the graph was built;
/// anything that reads as a call or dotted name goes back out as an
/// expression, plain names as literals.
fn text_tag(text: &str, source_ref: SourceRef) -> TaggedValue {
    if text.contains('(') || text.contains('.') {
        TaggedValue::expression(text, source_ref)
    } else {
        TaggedValue::literal(text, source_ref)
    }
}

fn ensure_map_entry(map: &mut ScriptMap, key: TaggedValue) -> &mut ScriptMap {
    let slot = map
        .entry(key)
        .or_insert_with(|| Value::Map(ScriptMap::new()));
    if matches!(slot, Value::Tag(_)) {
        *slot = Value::Map(ScriptMap::new());
    }
    match slot {
        Value::Map(inner) => inner,
        Value::Tag(_) => unreachable!("slot was just replaced with a map"),
    }
}
