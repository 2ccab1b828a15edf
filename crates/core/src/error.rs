//! Error taxonomy for the conversion engine.
//!
//! Two fatal kinds abort a conversion run: a malformed script
//! ([`ConvertError::Validation`]) and a broken invariant between the engine
//! and its upstream resolver ([`ConvertError::Defect`]). A failed
//! cross-reference lookup ([`ResolutionError`]) is recoverable: the graph
//! builder catches it and falls back to the raw path token. An unresolvable
//! transition destination is not an error at all -- it becomes a sentinel
//! node in the graph.

use crate::tags::SourceRef;

/// A fatal conversion error. No partial graph is trustworthy after one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The structured script is malformed relative to the expected shape.
    #[error("script validation failed at {source_ref}: {message}")]
    Validation {
        message: String,
        source_ref: SourceRef,
    },

    /// A value the upstream resolver guarantees to exist was absent or had
    /// an impossible shape. Indicates a defect in the front-end, not in the
    /// script being converted.
    #[error("resolver defect: {message}")]
    Defect { message: String },
}

impl ConvertError {
    pub fn validation(message: impl Into<String>, source_ref: SourceRef) -> Self {
        ConvertError::Validation {
            message: message.into(),
            source_ref,
        }
    }

    pub fn defect(message: impl Into<String>) -> Self {
        ConvertError::Defect {
            message: message.into(),
        }
    }
}

/// A failed cross-reference lookup. Always recovered locally by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("cannot find object '{request}'")]
    NotFound { request: String },

    /// An index step was applied to a scalar value.
    #[error("object '{request}' is not a mapping, cannot look up '{index}'")]
    NotAMapping { request: String, index: String },
}
