//! Name resolution abstraction for front-end-independent conversion.
//!
//! The [`NameResolver`] trait abstracts the recursive-resolution front-end
//! so the engine can be driven by any parser -- or by the in-memory
//! [`MapResolver`] in tests and in the CLI, where documents are
//! self-contained.

use indexmap::IndexMap;

use crate::error::{ConvertError, ResolutionError};
use crate::script::Value;
use crate::tags::{SourceRef, TaggedValue};

/// A request for an object: a dotted attribute path, optionally followed by
/// mapping lookups (`ns.script[flow_a][node_1]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub attributes: Vec<String>,
    pub indices: Vec<String>,
}

impl Request {
    /// Parse a request from its textual form. The attribute path is the
    /// dotted head; every `[...]` segment after it becomes an index. Quotes
    /// around an index are stripped.
    pub fn from_text(text: &str) -> Self {
        let (head, rest) = match text.find('[') {
            Some(pos) => text.split_at(pos),
            None => (text, ""),
        };
        let attributes = head
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        let indices = rest
            .split(['[', ']'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(unquote)
            .collect();
        Request {
            attributes,
            indices,
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.attributes.join("."))?;
        for index in &self.indices {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

fn unquote(s: &str) -> String {
    let stripped = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
    stripped.unwrap_or(s).to_owned()
}

/// The resolution capability the engine requires from its front-end.
pub trait NameResolver {
    /// Resolve a token into its final scalar form. Returns the token
    /// unchanged when the name cannot be followed further (a benign
    /// outcome), and fails only when a chain that must resolve to a scalar
    /// lands on a mapping -- a defect in the upstream resolver.
    fn resolve_name(&self, tag: &TaggedValue) -> Result<TaggedValue, ConvertError>;

    /// Return the object a request points at, together with the path it is
    /// declared under.
    fn get_requested_object(
        &self,
        request: &Request,
    ) -> Result<(Value, SourceRef), ResolutionError>;
}

/// In-memory resolver: a flat namespace of dotted names. Used by tests and
/// by the CLI, where scripts carry no cross-module references.
#[derive(Debug, Default)]
pub struct MapResolver {
    names: IndexMap<String, (Value, SourceRef)>,
}

impl MapResolver {
    pub fn new() -> Self {
        MapResolver::default()
    }

    /// Register an object under a dotted name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value, source_ref: SourceRef) {
        self.names.insert(name.into(), (value, source_ref));
    }
}

impl NameResolver for MapResolver {
    fn resolve_name(&self, tag: &TaggedValue) -> Result<TaggedValue, ConvertError> {
        let TaggedValue::Expression { text, .. } = tag else {
            return Ok(tag.clone());
        };
        match self.get_requested_object(&Request::from_text(text)) {
            Ok((Value::Tag(resolved), _)) => Ok(resolved),
            Ok((Value::Map(_), _)) => Err(ConvertError::defect(format!(
                "name '{}' resolved to a mapping where a scalar was required",
                text
            ))),
            Err(err) => {
                tracing::debug!(name = %text, %err, "name not resolvable, kept as-is");
                Ok(tag.clone())
            }
        }
    }

    fn get_requested_object(
        &self,
        request: &Request,
    ) -> Result<(Value, SourceRef), ResolutionError> {
        let name = request.attributes.join(".");
        let (mut value, mut path) =
            self.names
                .get(&name)
                .cloned()
                .ok_or_else(|| ResolutionError::NotFound {
                    request: request.to_string(),
                })?;
        for index in &request.indices {
            let map = match &value {
                Value::Map(map) => map,
                Value::Tag(_) => {
                    return Err(ResolutionError::NotAMapping {
                        request: request.to_string(),
                        index: index.clone(),
                    })
                }
            };
            let entry = map
                .iter()
                .find(|(key, _)| key.display_text() == *index)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| ResolutionError::NotFound {
                    request: request.to_string(),
                })?;
            path = path.child(index.clone());
            value = entry;
        }
        Ok((value, path))
    }
}
