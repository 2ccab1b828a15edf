//! scriptgraph-interchange: on-disk formats for scripts and graphs.
//!
//! Provides the serde document types for the populated graph (a node-link
//! JSON document) and YAML loading/saving of script documents, so that the
//! core engine never touches a concrete file format.
//!
//! Script YAML uses plain strings for literals and local tags for the other
//! token kinds: `!expr` for symbolic expressions and `!call` for calls.
//! Source refs are derived from the key path during loading.

pub mod graph_json;
pub mod script_yaml;
pub mod types;

pub use graph_json::{from_document, load_graph, save_graph, to_document};
pub use script_yaml::{load_script, save_script};
pub use types::{GraphDocument, GraphEdge, GraphNode};

/// Errors raised while reading or writing interchange documents.
#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    /// A node id tuple with an arity or sentinel the graph does not know.
    #[error("invalid node id {0:?}: expected [\"GLOBAL\"], [\"NONE\"], or [flow, node]")]
    InvalidNodeId(Vec<String>),

    /// The script document lacks a required top-level section.
    #[error("script document is missing the `{0}` section")]
    MissingSection(&'static str),

    /// A start or fallback label that is not a two-element `[flow, node]` list.
    #[error("`{field}` must be a two-element [flow, node] list")]
    InvalidLabel { field: &'static str },

    /// A YAML construct the script format has no meaning for.
    #[error("unsupported YAML value at {at}: {what}")]
    Unsupported { at: String, what: &'static str },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
