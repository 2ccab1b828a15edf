//! YAML loading and saving of script documents.
//!
//! Plain YAML strings become literal tokens. Local tags mark the other
//! token kinds: `!expr` for symbolic expressions (with a recognizer that
//! fills in the parsed pair for inline `("flow", "node")` destinations) and
//! `!call` for calls. Mapping keys follow the same encoding. Source refs
//! are derived from the key path while loading.

use scriptgraph_core::{FlowNode, ParsedValue, ScriptDoc, ScriptMap, SourceRef, TaggedValue, Value};
use serde_yaml::value::{Tag, TaggedValue as YamlTagged};
use serde_yaml::Value as Yaml;

use crate::InterchangeError;

/// Load a script document from YAML text.
///
/// The document must carry a `script` mapping and a `start_label` list;
/// `fallback_label` is optional.
pub fn load_script(text: &str) -> Result<ScriptDoc, InterchangeError> {
    let root: Yaml = serde_yaml::from_str(text)?;
    let Yaml::Mapping(root) = root else {
        return Err(InterchangeError::Unsupported {
            at: "<document>".to_owned(),
            what: "the top level must be a mapping",
        });
    };

    let script_yaml =
        section(&root, "script").ok_or(InterchangeError::MissingSection("script"))?;
    let script_ref = SourceRef::from_segments(["script"]);
    let script = match value_from_yaml(script_yaml, &script_ref)? {
        Value::Map(map) => map,
        Value::Tag(_) => {
            return Err(InterchangeError::Unsupported {
                at: script_ref.to_string(),
                what: "the script section must be a mapping",
            });
        }
    };

    let start_label = label_from_yaml(
        section(&root, "start_label").ok_or(InterchangeError::MissingSection("start_label"))?,
        "start_label",
    )?;
    let fallback_label = section(&root, "fallback_label")
        .map(|yaml| label_from_yaml(yaml, "fallback_label"))
        .transpose()?;

    Ok(ScriptDoc {
        script,
        start_label,
        fallback_label,
    })
}

/// Save a script document as YAML text.
pub fn save_script(doc: &ScriptDoc) -> Result<String, InterchangeError> {
    let mut root = serde_yaml::Mapping::new();
    root.insert(Yaml::String("script".to_owned()), yaml_from_map(&doc.script));
    root.insert(
        Yaml::String("start_label".to_owned()),
        yaml_from_label(&doc.start_label),
    );
    if let Some(fallback) = &doc.fallback_label {
        root.insert(
            Yaml::String("fallback_label".to_owned()),
            yaml_from_label(fallback),
        );
    }
    Ok(serde_yaml::to_string(&Yaml::Mapping(root))?)
}

fn section<'a>(root: &'a serde_yaml::Mapping, name: &str) -> Option<&'a Yaml> {
    root.iter()
        .find(|(key, _)| matches!(key, Yaml::String(s) if s == name))
        .map(|(_, value)| value)
}

fn value_from_yaml(yaml: &Yaml, source_ref: &SourceRef) -> Result<Value, InterchangeError> {
    match yaml {
        Yaml::Mapping(map) => {
            let mut out = ScriptMap::new();
            for (key, value) in map {
                let key_text = scalar_text(key).ok_or_else(|| InterchangeError::Unsupported {
                    at: source_ref.to_string(),
                    what: "mapping keys must be scalars",
                })?;
                let key_ref = source_ref.child(&key_text);
                let key_tag = tag_from_yaml(key, key_ref.clone())?;
                out.insert(key_tag, value_from_yaml(value, &key_ref)?);
            }
            Ok(Value::Map(out))
        }
        // an empty node body is commonly written as `node:` with no value
        Yaml::Null => Ok(Value::Map(ScriptMap::new())),
        Yaml::Sequence(_) => Err(InterchangeError::Unsupported {
            at: source_ref.to_string(),
            what: "sequences are not part of the script format",
        }),
        _ => Ok(Value::Tag(tag_from_yaml(yaml, source_ref.clone())?)),
    }
}

fn tag_from_yaml(yaml: &Yaml, source_ref: SourceRef) -> Result<TaggedValue, InterchangeError> {
    match yaml {
        Yaml::String(s) => Ok(TaggedValue::literal(s, source_ref)),
        Yaml::Number(n) => Ok(TaggedValue::literal(n.to_string(), source_ref)),
        Yaml::Bool(b) => Ok(TaggedValue::literal(b.to_string(), source_ref)),
        Yaml::Tagged(tagged) => {
            let text = scalar_text(&tagged.value).ok_or_else(|| InterchangeError::Unsupported {
                at: source_ref.to_string(),
                what: "tagged values must be scalars",
            })?;
            match tagged.tag.to_string().trim_start_matches('!') {
                "expr" => Ok(match recognize_static_pair(&text, &source_ref) {
                    Some(parsed) => TaggedValue::expression_with_parsed(text, parsed, source_ref),
                    None => TaggedValue::expression(text, source_ref),
                }),
                "call" => Ok(parse_call(&text, source_ref)),
                _ => Err(InterchangeError::Unsupported {
                    at: source_ref.to_string(),
                    what: "unknown tag, expected !expr or !call",
                }),
            }
        }
        _ => Err(InterchangeError::Unsupported {
            at: source_ref.to_string(),
            what: "expected a scalar value",
        }),
    }
}

fn scalar_text(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn label_from_yaml(yaml: &Yaml, field: &'static str) -> Result<FlowNode, InterchangeError> {
    let Yaml::Sequence(items) = yaml else {
        return Err(InterchangeError::InvalidLabel { field });
    };
    match items.as_slice() {
        [flow, node] => {
            let flow = scalar_text(flow).ok_or(InterchangeError::InvalidLabel { field })?;
            let node = scalar_text(node).ok_or(InterchangeError::InvalidLabel { field })?;
            Ok(FlowNode::new(flow, node))
        }
        _ => Err(InterchangeError::InvalidLabel { field }),
    }
}

/// Recognize an expression that spells out a `(flow, node)` destination
/// inline. Quoted components are literal, unquoted ones stay symbolic.
fn recognize_static_pair(text: &str, source_ref: &SourceRef) -> Option<ParsedValue> {
    let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
    let parts: Vec<&str> = inner
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let [flow, node] = parts.as_slice() else {
        return None;
    };
    Some(ParsedValue::Pair(
        pair_component(flow, source_ref),
        pair_component(node, source_ref),
    ))
}

fn pair_component(text: &str, source_ref: &SourceRef) -> TaggedValue {
    match unquote(text) {
        Some(value) => TaggedValue::literal(value, source_ref.clone()),
        None => TaggedValue::expression(text, source_ref.clone()),
    }
}

fn unquote(text: &str) -> Option<&str> {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
}

fn parse_call(text: &str, source_ref: SourceRef) -> TaggedValue {
    match text.split_once('(') {
        Some((name, rest)) => {
            let args_text = rest.strip_suffix(')').unwrap_or(rest);
            let args = args_text
                .split(',')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .map(|arg| TaggedValue::literal(arg, source_ref.clone()))
                .collect();
            TaggedValue::call(name.trim(), args, source_ref)
        }
        None => TaggedValue::call(text, Vec::new(), source_ref),
    }
}

fn yaml_from_map(map: &ScriptMap) -> Yaml {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in map {
        let value = match value {
            Value::Map(inner) => yaml_from_map(inner),
            Value::Tag(tag) => yaml_from_tag(tag),
        };
        out.insert(yaml_from_tag(key), value);
    }
    Yaml::Mapping(out)
}

fn yaml_from_tag(tag: &TaggedValue) -> Yaml {
    match tag {
        TaggedValue::Literal { value, .. } => Yaml::String(value.clone()),
        TaggedValue::Expression { text, .. } => tagged_scalar("expr", text),
        TaggedValue::Call { .. } => tagged_scalar("call", &tag.display_text()),
    }
}

fn yaml_from_label(label: &FlowNode) -> Yaml {
    Yaml::Sequence(vec![
        Yaml::String(label.flow.clone()),
        Yaml::String(label.node.clone()),
    ])
}

fn tagged_scalar(tag: &str, text: &str) -> Yaml {
    Yaml::Tagged(Box::new(YamlTagged {
        tag: Tag::new(tag),
        value: Yaml::String(text.to_owned()),
    }))
}
