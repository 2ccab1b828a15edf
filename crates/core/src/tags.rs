//! Tagged value model shared by every stage of the conversion.
//!
//! A [`TaggedValue`] is the resolved-and-annotated form of one script token:
//! a plain string, an unresolved symbolic expression, or a call. Every tagged
//! value carries a [`SourceRef`] -- the key path that leads to the token in
//! the original document -- so the graph can report errors precisely and the
//! script can be regenerated from the graph later.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path of keys from the document root to a value.
///
/// Refs accumulate one segment per mapping key followed during traversal.
/// A ref may be redirected mid-walk when a value resolves to an object
/// declared elsewhere; consumers only ever see the final path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub Vec<String>);

impl SourceRef {
    /// The empty path, pointing at the document root.
    pub fn root() -> Self {
        SourceRef(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceRef(segments.into_iter().map(Into::into).collect())
    }

    /// A new ref extended with one more key segment.
    pub fn child(&self, segment: impl AsRef<str>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.as_ref().to_owned());
        SourceRef(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<document>")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

/// A value statically recovered from an expression by the front-end.
///
/// The pair form is used when an expression spells out a `(flow, node)`
/// destination inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParsedValue {
    Single(TaggedValue),
    Pair(TaggedValue, TaggedValue),
}

/// One script token: a literal string, a symbolic expression, or a call.
///
/// The variant set is closed; the engine matches on it exhaustively instead
/// of probing runtime types. `Expression` may carry a [`ParsedValue`] when
/// the front-end decoded the expression statically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaggedValue {
    Literal {
        value: String,
        source_ref: SourceRef,
    },
    Expression {
        text: String,
        parsed: Option<Box<ParsedValue>>,
        source_ref: SourceRef,
    },
    Call {
        name: String,
        args: Vec<TaggedValue>,
        source_ref: SourceRef,
    },
}

impl TaggedValue {
    pub fn literal(value: impl Into<String>, source_ref: SourceRef) -> Self {
        TaggedValue::Literal {
            value: value.into(),
            source_ref,
        }
    }

    pub fn expression(text: impl Into<String>, source_ref: SourceRef) -> Self {
        TaggedValue::Expression {
            text: text.into(),
            parsed: None,
            source_ref,
        }
    }

    pub fn expression_with_parsed(
        text: impl Into<String>,
        parsed: ParsedValue,
        source_ref: SourceRef,
    ) -> Self {
        TaggedValue::Expression {
            text: text.into(),
            parsed: Some(Box::new(parsed)),
            source_ref,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<TaggedValue>, source_ref: SourceRef) -> Self {
        TaggedValue::Call {
            name: name.into(),
            args,
            source_ref,
        }
    }

    /// The display text of the token: the literal string itself, the raw
    /// expression text, or the rendered call. Node identities, edge labels,
    /// and keyword classification all operate on this text.
    pub fn display_text(&self) -> String {
        match self {
            TaggedValue::Literal { value, .. } => value.clone(),
            TaggedValue::Expression { text, .. } => text.clone(),
            TaggedValue::Call { name, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| a.display_text()).collect();
                format!("{}({})", name, args.join(", "))
            }
        }
    }

    pub fn source_ref(&self) -> &SourceRef {
        match self {
            TaggedValue::Literal { source_ref, .. }
            | TaggedValue::Expression { source_ref, .. }
            | TaggedValue::Call { source_ref, .. } => source_ref,
        }
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ref_child_extends_path() {
        let root = SourceRef::from_segments(["script"]);
        let child = root.child("flow_a");
        assert_eq!(child.segments(), ["script", "flow_a"]);
        assert_eq!(root.segments(), ["script"]);
    }

    #[test]
    fn source_ref_display_joins_segments() {
        let r = SourceRef::from_segments(["script", "flow_a", "node_1"]);
        assert_eq!(r.to_string(), "script.flow_a.node_1");
        assert_eq!(SourceRef::root().to_string(), "<document>");
    }

    #[test]
    fn display_text_renders_call_with_args() {
        let arg = TaggedValue::literal("'hi'", SourceRef::root());
        let call = TaggedValue::call("cnd.exact_match", vec![arg], SourceRef::root());
        assert_eq!(call.display_text(), "cnd.exact_match('hi')");
    }

    #[test]
    fn display_text_of_expression_is_raw_text() {
        let e = TaggedValue::expression("lbl.forward()", SourceRef::root());
        assert_eq!(e.display_text(), "lbl.forward()");
    }
}
