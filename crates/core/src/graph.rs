//! Directed multigraph of dialogue states.
//!
//! Nodes are dialogue states identified by [`NodeId`]; edges are transitions
//! carrying the resolved label and condition text plus their source refs.
//! Parallel edges between the same pair of nodes are permitted, and both
//! node and edge iteration preserve insertion order -- the order transition
//! entries appear in the script is observable in generated output.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::script::FlowNode;
use crate::tags::SourceRef;

/// Identity of a graph node: the singleton global scope, a `(flow, node)`
/// pair, or the sentinel destination for transitions the engine could not
/// resolve statically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    Global,
    Unresolved,
    Label(FlowNode),
}

impl NodeId {
    pub fn label(flow: impl Into<String>, node: impl Into<String>) -> Self {
        NodeId::Label(FlowNode::new(flow, node))
    }

    /// Number of path segments the identity occupies in a traversed path.
    pub fn arity(&self) -> usize {
        match self {
            NodeId::Global | NodeId::Unresolved => 1,
            NodeId::Label(_) => 2,
        }
    }

    /// The tuple encoding used by the interchange format:
    /// `["GLOBAL"]`, `["NONE"]`, or `[flow, node]`.
    pub fn segments(&self) -> Vec<String> {
        match self {
            NodeId::Global => vec!["GLOBAL".to_owned()],
            NodeId::Unresolved => vec!["NONE".to_owned()],
            NodeId::Label(label) => vec![label.flow.clone(), label.node.clone()],
        }
    }

    /// Decode the tuple encoding. Returns `None` for arities other than
    /// one or two, or an unknown one-element sentinel.
    pub fn from_segments(segments: &[String]) -> Option<Self> {
        match segments {
            [sentinel] if sentinel == "GLOBAL" => Some(NodeId::Global),
            [sentinel] if sentinel == "NONE" => Some(NodeId::Unresolved),
            [flow, node] => Some(NodeId::label(flow.clone(), node.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Global => write!(f, "(GLOBAL,)"),
            NodeId::Unresolved => write!(f, "(NONE,)"),
            NodeId::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Attributes of a dialogue-state node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub source_ref: SourceRef,
    /// Whether the node was declared under a LOCAL-classified key.
    pub local: bool,
    pub start_label: bool,
    pub fallback_label: bool,
}

/// Attributes of a transition edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub label: String,
    pub label_ref: SourceRef,
    pub condition: String,
    pub condition_ref: SourceRef,
}

/// The populated multigraph. Mutated only by the graph builder during a
/// single synchronous traversal; read-only afterwards.
#[derive(Debug, Default)]
pub struct ScriptGraph {
    graph: DiGraph<NodeData, EdgeData>,
    index: IndexMap<NodeId, NodeIndex>,
}

impl ScriptGraph {
    pub fn new() -> Self {
        ScriptGraph::default()
    }

    /// Insert a node or update its attributes in place. Marker flags set by
    /// [`mark_start_label`](Self::mark_start_label) and
    /// [`mark_fallback_label`](Self::mark_fallback_label) survive the update.
    pub fn upsert_node(&mut self, id: NodeId, source_ref: SourceRef, local: bool) -> NodeIndex {
        match self.index.get(&id) {
            Some(&ix) => {
                let data = &mut self.graph[ix];
                data.source_ref = source_ref;
                data.local = local;
                ix
            }
            None => {
                let ix = self.graph.add_node(NodeData {
                    source_ref,
                    local,
                    ..NodeData::default()
                });
                self.index.insert(id, ix);
                ix
            }
        }
    }

    /// Look up a node, creating it with default attributes if absent.
    /// Destination nodes that were never declared in the script enter the
    /// graph this way.
    fn ensure_node(&mut self, id: NodeId) -> NodeIndex {
        match self.index.get(&id) {
            Some(&ix) => ix,
            None => {
                let ix = self.graph.add_node(NodeData::default());
                self.index.insert(id, ix);
                ix
            }
        }
    }

    /// Append a transition edge. Both endpoints are created on demand.
    pub fn add_transition(&mut self, from: &NodeId, to: &NodeId, edge: EdgeData) {
        let from_ix = self.ensure_node(from.clone());
        let to_ix = self.ensure_node(to.clone());
        self.graph.add_edge(from_ix, to_ix, edge);
    }

    /// Flag a node as the configured start label. Returns false when the
    /// node is not in the graph.
    pub fn mark_start_label(&mut self, id: &NodeId) -> bool {
        match self.index.get(id) {
            Some(&ix) => {
                self.graph[ix].start_label = true;
                true
            }
            None => false,
        }
    }

    /// Flag a node as the configured fallback label. Returns false when the
    /// node is not in the graph.
    pub fn mark_fallback_label(&mut self, id: &NodeId) -> bool {
        match self.index.get(id) {
            Some(&ix) => {
                self.graph[ix].fallback_label = true;
                true
            }
            None => false,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeData> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodeData)> {
        self.index.iter().map(|(id, &ix)| (id, &self.graph[ix]))
    }

    /// Edges in insertion order, with their endpoint identities.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &EdgeData)> {
        self.graph.edge_references().map(|edge| {
            (
                self.id_of(edge.source()),
                self.id_of(edge.target()),
                edge.weight(),
            )
        })
    }

    /// Outgoing edges of one node, in insertion order.
    pub fn edges_from<'a>(&'a self, id: &NodeId) -> Vec<(&'a NodeId, &'a EdgeData)> {
        let Some(&from_ix) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edge_references()
            .filter(|edge| edge.source() == from_ix)
            .map(|edge| (self.id_of(edge.target()), edge.weight()))
            .collect()
    }

    // Nodes are only ever added, so petgraph indices coincide with the
    // insertion order of the id index.
    fn id_of(&self, ix: NodeIndex) -> &NodeId {
        self.index
            .get_index(ix.index())
            .map(|(id, _)| id)
            .unwrap_or(&NodeId::Unresolved)
    }
}
