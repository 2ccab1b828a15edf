//! Serde types for the graph interchange document.
//!
//! The document is a flat node-link encoding: a node list and an edge list,
//! both in graph insertion order. Node ids use the tuple encoding
//! `["GLOBAL"]` / `["NONE"]` / `[flow, node]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Vec<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Vec::is_empty")]
    pub source_ref: Vec<String>,
    #[serde(default)]
    pub local: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub start_label: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fallback_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: Vec<String>,
    pub target: Vec<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ref: Vec<String>,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_ref: Vec<String>,
}

fn is_false(flag: &bool) -> bool {
    !flag
}
