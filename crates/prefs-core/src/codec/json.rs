//! JSON codec mirroring the property-list tree.
//!
//! ```json
//! {
//!     "version": "1.0",
//!     "dict": {
//!         "Name": "demo",
//!         "LastRun": { "$date": "2024-01-02T03:04:05Z" },
//!         "Tags": ["a", "b"]
//!     }
//! }
//! ```
//!
//! JSON has no date type, so a date is a single-member object tagged with
//! [`DATE_TAG`].  To keep that tag unambiguous, dictionary keys starting with
//! `$` are written with one extra leading `$` (`$date` becomes `$$date`) and
//! one leading `$` is stripped again from keys starting with `$$` on decode.
//! Numbers, booleans and `null` have no counterpart in the document model and
//! are rejected on decode.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use super::FormatError;
use crate::domain::document::{
    PrefDate, PrefDict, PrefValue, PreferenceDocument, DEFAULT_PLIST_VERSION,
};

/// Member name marking a tagged date object.
pub const DATE_TAG: &str = "$date";

/// Leading character of reserved member names.
const TAG_PREFIX: char = '$';

const VERSION_MEMBER: &str = "version";
const DICT_MEMBER: &str = "dict";

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes `doc` as pretty-printed JSON indented by `indent` spaces per level.
///
/// # Errors
///
/// Returns [`FormatError::Encode`] if the JSON serializer fails.
pub fn encode(doc: &PreferenceDocument, indent: usize) -> Result<Vec<u8>, FormatError> {
    let mut root = Map::new();
    root.insert(VERSION_MEMBER.to_string(), Value::String(doc.version.clone()));
    root.insert(DICT_MEMBER.to_string(), dict_to_json(&doc.dict));
    let root = Value::Object(root);

    let indent_bytes = vec![b' '; indent];
    let mut out = Vec::with_capacity(256);
    {
        let formatter = PrettyFormatter::with_indent(&indent_bytes);
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        root.serialize(&mut serializer)
            .map_err(|e| FormatError::Encode(e.to_string()))?;
    }
    out.push(b'\n');
    Ok(out)
}

fn dict_to_json(dict: &PrefDict) -> Value {
    let map = dict
        .iter()
        .map(|(key, value)| (escape_key(key), value_to_json(value)))
        .collect::<Map<String, Value>>();
    Value::Object(map)
}

fn value_to_json(value: &PrefValue) -> Value {
    match value {
        PrefValue::String(s) => Value::String(s.clone()),
        PrefValue::Date(d) => {
            let mut tagged = Map::new();
            tagged.insert(DATE_TAG.to_string(), Value::String(d.to_string()));
            Value::Object(tagged)
        }
        PrefValue::Dict(d) => dict_to_json(d),
        PrefValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
    }
}

fn escape_key(key: &str) -> String {
    if key.starts_with(TAG_PREFIX) {
        format!("{TAG_PREFIX}{key}")
    } else {
        key.to_string()
    }
}

/// Inverse of [`escape_key`].  A single leading `$` is kept as is, so
/// hand-written files with `$`-keys still load.
fn unescape_key(key: String) -> String {
    let mut chars = key.chars();
    if chars.next() == Some(TAG_PREFIX) && chars.next() == Some(TAG_PREFIX) {
        key[TAG_PREFIX.len_utf8()..].to_string()
    } else {
        key
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes a JSON preference document.
///
/// A missing `version` defaults to `"1.0"` and a missing `dict` to an empty
/// dictionary.
///
/// # Errors
///
/// Returns [`FormatError::Json`] for malformed JSON (with line and column) and
/// [`FormatError::Schema`] for well-formed JSON of the wrong shape.
pub fn decode(bytes: &[u8]) -> Result<PreferenceDocument, FormatError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let root = match value {
        Value::Object(root) => root,
        other => {
            return Err(schema("", format!("expected an object, found {}", kind_of(&other))));
        }
    };

    let mut version = DEFAULT_PLIST_VERSION.to_string();
    let mut dict = PrefDict::new();
    for (member, value) in root {
        match (member.as_str(), value) {
            (VERSION_MEMBER, Value::String(s)) => version = s,
            (VERSION_MEMBER, other) => {
                return Err(schema(
                    VERSION_MEMBER,
                    format!("expected a string, found {}", kind_of(&other)),
                ));
            }
            (DICT_MEMBER, Value::Object(map)) => dict = dict_from_json(map, DICT_MEMBER)?,
            (DICT_MEMBER, other) => {
                return Err(schema(
                    DICT_MEMBER,
                    format!("expected an object, found {}", kind_of(&other)),
                ));
            }
            (unknown, _) => return Err(schema(unknown, "unknown top-level member")),
        }
    }
    Ok(PreferenceDocument { version, dict })
}

fn dict_from_json(map: Map<String, Value>, path: &str) -> Result<PrefDict, FormatError> {
    let mut dict = PrefDict::new();
    for (key, value) in map {
        let key = unescape_key(key);
        let child = format!("{path}/{key}");
        let value = value_from_json(value, &child)?;
        dict.insert(key, value);
    }
    Ok(dict)
}

fn value_from_json(value: Value, path: &str) -> Result<PrefValue, FormatError> {
    match value {
        Value::String(s) => Ok(PrefValue::String(s)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| value_from_json(item, &format!("{path}/{i}")))
            .collect::<Result<Vec<_>, _>>()
            .map(PrefValue::Array),
        Value::Object(map) if map.len() == 1 && map.contains_key(DATE_TAG) => match &map[DATE_TAG] {
            Value::String(text) => PrefDate::parse(text)
                .map(PrefValue::Date)
                .map_err(|e| schema(path, format!("invalid date {text:?}: {e}"))),
            other => Err(schema(
                path,
                format!("`{DATE_TAG}` must be a string, found {}", kind_of(other)),
            )),
        },
        Value::Object(map) => dict_from_json(map, path).map(PrefValue::Dict),
        other => Err(schema(
            path,
            format!(
                "unsupported {}; expected a string, object, array, or date",
                kind_of(&other)
            ),
        )),
    }
}

fn schema(path: &str, message: impl Into<String>) -> FormatError {
    FormatError::Schema {
        path: path.to_string(),
        message: message.into(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
