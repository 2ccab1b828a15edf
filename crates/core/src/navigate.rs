//! Relative navigation within a flow.
//!
//! Computes the sibling of the current node in its flow's declaration
//! order, stepping forward or backward with optional cyclic wrap. Relative
//! navigation is undefined outside a flow (the global scope) and for nodes
//! the flow does not contain; both cases fall back to the configured
//! fallback label rather than failing.

use crate::graph::NodeId;
use crate::script::{flow_node_labels, FlowNode, ScriptMap};

/// Shift the current position by one node within its flow.
///
/// Pure function of its inputs. `increment` selects the direction;
/// `cyclic` controls whether stepping past either end wraps around or
/// falls back.
pub fn get_by_index_shifting(
    script: &ScriptMap,
    current: &NodeId,
    fallback_label: &FlowNode,
    increment: bool,
    cyclic: bool,
) -> FlowNode {
    let NodeId::Label(at) = current else {
        return fallback_label.clone();
    };
    let labels = flow_node_labels(script, &at.flow);
    let Some(position) = labels.iter().position(|label| *label == at.node) else {
        return fallback_label.clone();
    };

    let shifted = if increment {
        position as i64 + 1
    } else {
        position as i64 - 1
    };
    if !cyclic && !(0..labels.len() as i64).contains(&shifted) {
        return fallback_label.clone();
    }
    let wrapped = shifted.rem_euclid(labels.len() as i64) as usize;

    FlowNode::new(at.flow.clone(), labels[wrapped].clone())
}
