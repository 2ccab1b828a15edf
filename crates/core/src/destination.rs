//! Transition destination resolution.
//!
//! A transition label can name its destination several ways: an expression
//! that statically encodes a `(flow, node)` pair, a bare reference to a
//! sibling node in the same flow, or a call to one of the five built-in
//! navigation primitives (`forward`, `backward`, `repeat`, `to_start`,
//! `to_fallback`). Resolution tries these in order; anything else yields the
//! unresolved sentinel, which downstream consumers must treat as a dangling
//! edge rather than an error.

use crate::error::ConvertError;
use crate::graph::NodeId;
use crate::navigate::get_by_index_shifting;
use crate::resolve::NameResolver;
use crate::script::{flow_node_labels, FlowNode, ScriptMap};
use crate::tags::{ParsedValue, TaggedValue};

/// Everything destination resolution needs besides the label itself.
pub struct DestinationContext<'a> {
    pub script: &'a ScriptMap,
    pub start_label: &'a FlowNode,
    pub fallback_label: &'a FlowNode,
    /// Identity of the node the transition leaves from.
    pub current: &'a NodeId,
}

/// Resolve a label token into a destination. First match wins:
/// statically-encoded pair, bare in-flow reference, navigation primitive,
/// then the unresolved sentinel.
pub fn get_destination(
    label: &TaggedValue,
    resolver: &dyn NameResolver,
    ctx: &DestinationContext<'_>,
) -> Result<NodeId, ConvertError> {
    if matches!(label, TaggedValue::Expression { .. }) {
        let resolved = resolver.resolve_name(label)?;
        if let TaggedValue::Expression {
            parsed: Some(parsed),
            ..
        } = &resolved
        {
            if let ParsedValue::Pair(flow, node) = parsed.as_ref() {
                let flow = reduce_to_literal(flow, resolver)?;
                let node = reduce_to_literal(node, resolver)?;
                // Partial static resolution is unsupported: unless both
                // components reduce to literals, fall through.
                if let (Some(flow), Some(node)) = (flow, node) {
                    return Ok(NodeId::Label(FlowNode::new(flow, node)));
                }
            }
        }
    }

    let text = label.display_text();

    if let NodeId::Label(at) = ctx.current {
        if flow_node_labels(ctx.script, &at.flow)
            .iter()
            .any(|node| *node == text)
        {
            return Ok(NodeId::label(at.flow.clone(), text));
        }
    }

    match trailing_call_name(&text) {
        Some("to_fallback") => Ok(NodeId::Label(ctx.fallback_label.clone())),
        Some("to_start") => Ok(NodeId::Label(ctx.start_label.clone())),
        Some("repeat") => Ok(ctx.current.clone()),
        Some("backward") => Ok(NodeId::Label(get_by_index_shifting(
            ctx.script,
            ctx.current,
            ctx.fallback_label,
            false,
            true,
        ))),
        Some("forward") => Ok(NodeId::Label(get_by_index_shifting(
            ctx.script,
            ctx.current,
            ctx.fallback_label,
            true,
            true,
        ))),
        _ => Ok(NodeId::Unresolved),
    }
}

/// Reduce a pair component to its literal text, following one resolution
/// step for expressions. `None` when the component stays symbolic.
fn reduce_to_literal(
    tag: &TaggedValue,
    resolver: &dyn NameResolver,
) -> Result<Option<String>, ConvertError> {
    match tag {
        TaggedValue::Literal { value, .. } => Ok(Some(value.clone())),
        TaggedValue::Expression { .. } => match resolver.resolve_name(tag)? {
            TaggedValue::Literal { value, .. } => Ok(Some(value)),
            _ => Ok(None),
        },
        TaggedValue::Call { .. } => Ok(None),
    }
}

/// The trailing call name of a label text: the segment after the last `.`
/// and before the first `(`. `None` when the text is not a call at all.
fn trailing_call_name(text: &str) -> Option<&str> {
    let (head, _) = text.split_once('(')?;
    Some(head.rsplit('.').next().unwrap_or(head))
}
