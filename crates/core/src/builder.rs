//! Graph construction from a structured script document.
//!
//! [`script_to_graph`] walks the script depth-first in declaration order,
//! expanding expression values through the resolver where possible, and
//! invokes [`add_transition_entry`] at every leaf. Each invocation derives
//! the source node identity from the traversed key path, registers the node,
//! and -- when the entry sits under a transition-list key -- resolves the
//! destination and appends an edge. Afterwards the configured start and
//! fallback labels are marked on their nodes.

use crate::destination::{get_destination, DestinationContext};
use crate::error::ConvertError;
use crate::graph::{EdgeData, NodeId, ScriptGraph};
use crate::keywords::{classify_tag, Keyword};
use crate::resolve::{NameResolver, Request};
use crate::script::{FlowNode, ScriptDoc, ScriptMap, Value};
use crate::tags::{SourceRef, TaggedValue};

/// Convert a script document into its graph representation.
pub fn script_to_graph(
    doc: &ScriptDoc,
    resolver: &dyn NameResolver,
) -> Result<ScriptGraph, ConvertError> {
    let mut graph = ScriptGraph::new();
    let fallback_label = doc.effective_fallback();

    let mut traversed: Vec<TaggedValue> = Vec::new();
    let mut paths = vec![SourceRef::from_segments(["script"])];
    traverse(
        &doc.script,
        resolver,
        &mut traversed,
        &mut paths,
        &mut graph,
        &doc.script,
        &doc.start_label,
        &fallback_label,
    )?;

    let start_id = NodeId::Label(doc.start_label.clone());
    if !graph.mark_start_label(&start_id) {
        return Err(ConvertError::validation(
            format!("start label names an unknown node: {}", doc.start_label),
            SourceRef::from_segments(["start_label"]),
        ));
    }
    if let Some(fallback) = &doc.fallback_label {
        let fallback_id = NodeId::Label(fallback.clone());
        if !graph.mark_fallback_label(&fallback_id) {
            return Err(ConvertError::validation(
                format!("fallback label names an unknown node: {}", fallback),
                SourceRef::from_segments(["fallback_label"]),
            ));
        }
    }

    Ok(graph)
}

/// Depth-first walk of a script mapping. `paths` holds one source ref per
/// traversal depth (`paths[k]` is the -- possibly redirected -- path after
/// following `k` keys); `traversed` holds the keys themselves.
#[allow(clippy::too_many_arguments)]
fn traverse(
    map: &ScriptMap,
    resolver: &dyn NameResolver,
    traversed: &mut Vec<TaggedValue>,
    paths: &mut Vec<SourceRef>,
    graph: &mut ScriptGraph,
    script: &ScriptMap,
    start_label: &FlowNode,
    fallback_label: &FlowNode,
) -> Result<(), ConvertError> {
    for (key, value) in map {
        let mut path = paths
            .last()
            .cloned()
            .unwrap_or_default()
            .child(key.display_text());

        // Expression values may point at objects declared elsewhere; expand
        // them so the walk continues inside the referenced mapping, and
        // redirect the ref path accordingly.
        let expanded;
        let value = match value {
            Value::Tag(TaggedValue::Expression { text, .. }) => {
                match resolver.get_requested_object(&Request::from_text(text)) {
                    Ok((object, object_path)) => {
                        path = object_path;
                        expanded = object;
                        &expanded
                    }
                    Err(err) => {
                        tracing::debug!(request = %text, %err, "cannot expand value, kept as leaf");
                        value
                    }
                }
            }
            _ => value,
        };

        traversed.push(key.clone());
        paths.push(path);
        let result = match value {
            Value::Map(inner) => traverse(
                inner,
                resolver,
                traversed,
                paths,
                graph,
                script,
                start_label,
                fallback_label,
            ),
            Value::Tag(_) => add_transition_entry(
                graph,
                traversed,
                value,
                paths,
                resolver,
                script,
                start_label,
                fallback_label,
            ),
        };
        paths.pop();
        traversed.pop();
        result?;
    }
    Ok(())
}

/// Process one discovered leaf entry.
///
/// Registers the source node in any case; appends a transition edge only
/// when the key path places the leaf under a transition-list keyword.
#[allow(clippy::too_many_arguments)]
pub fn add_transition_entry(
    graph: &mut ScriptGraph,
    traversed_path: &[TaggedValue],
    final_value: &Value,
    paths: &[SourceRef],
    resolver: &dyn NameResolver,
    script: &ScriptMap,
    start_label: &FlowNode,
    fallback_label: &FlowNode,
) -> Result<(), ConvertError> {
    let Some(first) = traversed_path.first() else {
        return Err(ConvertError::validation(
            "transition entry has an empty traversed path",
            paths.first().cloned().unwrap_or_default(),
        ));
    };

    let node_id = if classify_tag(&resolver.resolve_name(first)?) == Some(Keyword::Global) {
        NodeId::Global
    } else {
        let Some(second) = traversed_path.get(1) else {
            return Err(ConvertError::validation(
                "transition path stops at a flow name, expected a node label",
                first.source_ref().clone(),
            ));
        };
        NodeId::label(
            resolver.resolve_name(first)?.display_text(),
            resolver.resolve_name(second)?.display_text(),
        )
    };
    let arity = node_id.arity();

    let local = match traversed_path.get(1) {
        Some(second) => classify_tag(&resolver.resolve_name(second)?) == Some(Keyword::Local),
        None => false,
    };
    let node_ref = paths.get(arity).cloned().unwrap_or_default();
    graph.upsert_node(node_id.clone(), node_ref, local);

    // Entries that do not sit under a transition-list key only register
    // their node: responses, processing, and the like stay out of the graph.
    let is_transition = match traversed_path.get(arity) {
        Some(gate) => classify_tag(&resolver.resolve_name(gate)?) == Some(Keyword::Transitions),
        None => false,
    };
    if !is_transition {
        return Ok(());
    }

    let condition = match final_value {
        Value::Tag(tag) => resolver.resolve_name(tag)?,
        Value::Map(_) => {
            return Err(ConvertError::validation(
                "transition condition is not a scalar value",
                paths.last().cloned().unwrap_or_default(),
            ));
        }
    };

    let Some(label_token) = traversed_path.get(arity + 1) else {
        return Err(ConvertError::validation(
            "transition list holds a scalar where a label mapping was expected",
            paths.get(arity).cloned().unwrap_or_default(),
        ));
    };

    // Prefer the cross-referenced object for the label text and ref; fall
    // back to the raw path token when the lookup cannot be satisfied.
    let (label_value, label_ref) =
        match resolver.get_requested_object(&Request::from_text(&label_token.display_text())) {
            Ok((object, object_path)) => (object, object_path),
            Err(err) => {
                tracing::debug!(label = %label_token.display_text(), %err, "label lookup failed, using path token");
                (
                    Value::Tag(label_token.clone()),
                    paths.get(arity + 1).cloned().unwrap_or_default(),
                )
            }
        };
    let label = match label_value {
        Value::Tag(tag) => tag,
        Value::Map(_) => {
            return Err(ConvertError::defect(format!(
                "transition label '{}' resolved to a mapping, labels must be scalar",
                label_token.display_text()
            )));
        }
    };

    let ctx = DestinationContext {
        script,
        start_label,
        fallback_label,
        current: &node_id,
    };
    let destination = get_destination(label_token, resolver, &ctx)?;

    graph.add_transition(
        &node_id,
        &destination,
        EdgeData {
            label: label.display_text(),
            label_ref,
            condition: condition.display_text(),
            condition_ref: paths.get(arity + 2).cloned().unwrap_or_default(),
        },
    );
    Ok(())
}
