//! scriptgraph-core: dialogue script resolution and graph construction.
//!
//! Converts a structured dialogue-script document -- named flows of named
//! nodes with transition lists -- into a directed multigraph of dialogue
//! states, and regenerates an equivalent document from the graph.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`script_to_graph()`] -- convert a script document to a graph
//! - [`graph_to_script()`] -- regenerate a script document from a graph
//! - [`ScriptGraph`], [`NodeId`] -- the populated multigraph
//! - [`TaggedValue`], [`SourceRef`] -- the token model
//! - [`NameResolver`] -- the injected front-end resolution capability
//! - [`ConvertError`], [`ResolutionError`] -- the error taxonomy
//!
//! The parsing front-end that produces tagged tokens from raw sources is a
//! separate concern: the engine only sees it through [`NameResolver`].

pub mod builder;
pub mod destination;
pub mod error;
pub mod graph;
pub mod keywords;
pub mod navigate;
pub mod regenerate;
pub mod resolve;
pub mod script;
pub mod tags;

// ── Convenience re-exports: key types ────────────────────────────────

pub use error::{ConvertError, ResolutionError};
pub use graph::{EdgeData, NodeData, NodeId, ScriptGraph};
pub use resolve::{MapResolver, NameResolver, Request};
pub use script::{FlowNode, ScriptDoc, ScriptMap, Value};
pub use tags::{ParsedValue, SourceRef, TaggedValue};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use builder::script_to_graph;
pub use destination::{get_destination, DestinationContext};
pub use navigate::get_by_index_shifting;
pub use regenerate::graph_to_script;
