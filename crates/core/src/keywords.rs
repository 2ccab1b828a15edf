//! Keyword classifier for the well-known script keys.
//!
//! The script format marks three kinds of structural keys: the top-level
//! global scope, node-local declarations, and transition lists. The set is
//! fixed by the framework and loaded once; classification tolerates dotted
//! module prefixes (`keywords.TRANSITIONS` classifies the same as
//! `TRANSITIONS`).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::tags::TaggedValue;

/// The three keyword categories recognized by the graph builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Global,
    Local,
    Transitions,
}

static KEYWORDS: Lazy<HashMap<&'static str, Keyword>> = Lazy::new(|| {
    HashMap::from([
        ("GLOBAL", Keyword::Global),
        ("LOCAL", Keyword::Local),
        ("TRANSITIONS", Keyword::Transitions),
    ])
});

/// Classify an identifier, ignoring any dotted module prefix.
pub fn classify(identifier: &str) -> Option<Keyword> {
    let tail = identifier.rsplit('.').next().unwrap_or(identifier);
    KEYWORDS.get(tail).copied()
}

/// Classify the display text of a tagged value.
pub fn classify_tag(tag: &TaggedValue) -> Option<Keyword> {
    classify(&tag.display_text())
}
