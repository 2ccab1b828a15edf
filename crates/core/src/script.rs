//! Structured script document model.
//!
//! A script is a nested mapping: flow name -> node label -> node body, where
//! a node body maps structural keys (transition lists among them) to values.
//! Mappings are insertion-ordered -- the order of node labels inside a flow
//! defines the cyclic sequence used by relative navigation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tags::TaggedValue;

/// An insertion-ordered mapping of tagged keys to script values.
pub type ScriptMap = IndexMap<TaggedValue, Value>;

/// One value in a script document: a scalar token or a nested mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Tag(TaggedValue),
    Map(ScriptMap),
}

impl Value {
    pub fn as_tag(&self) -> Option<&TaggedValue> {
        match self {
            Value::Tag(tag) => Some(tag),
            Value::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&ScriptMap> {
        match self {
            Value::Map(map) => Some(map),
            Value::Tag(_) => None,
        }
    }
}

/// A fully resolved `(flow, node)` label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowNode {
    pub flow: String,
    pub node: String,
}

impl FlowNode {
    pub fn new(flow: impl Into<String>, node: impl Into<String>) -> Self {
        FlowNode {
            flow: flow.into(),
            node: node.into(),
        }
    }
}

impl std::fmt::Display for FlowNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.flow, self.node)
    }
}

/// A complete script document: the script mapping plus the configured
/// start and fallback labels. When no fallback label is configured the
/// start label doubles as the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDoc {
    pub script: ScriptMap,
    pub start_label: FlowNode,
    pub fallback_label: Option<FlowNode>,
}

impl ScriptDoc {
    /// The effective fallback label: the configured one, or the start label.
    pub fn effective_fallback(&self) -> FlowNode {
        self.fallback_label
            .clone()
            .unwrap_or_else(|| self.start_label.clone())
    }
}

/// Ordered node labels of a flow, by display text. Empty when the flow is
/// unknown or its value is not a mapping.
pub fn flow_node_labels(script: &ScriptMap, flow: &str) -> Vec<String> {
    script
        .iter()
        .find(|(key, _)| key.display_text() == flow)
        .and_then(|(_, value)| value.as_map())
        .map(|nodes| nodes.keys().map(|key| key.display_text()).collect())
        .unwrap_or_default()
}
