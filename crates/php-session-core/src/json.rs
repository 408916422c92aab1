//! JSON view of decoded session values.
//!
//! This module converts `Value` trees to JSON using serde_json, and offers a
//! typed view on top of that conversion. Enable the `serde` feature to use
//! this module.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value as JsonValue};

use crate::error::{ErrorKind, Result, SessionDecodeError};
use crate::parser::decode;
use crate::types::{Document, Key, Value};

/// Convert a decoded value to a JSON value.
///
/// # Mapping Rules
///
/// | Decoded | JSON |
/// |---------|------|
/// | `Null` | `null` |
/// | `Bool` | `boolean` |
/// | `Number` (integral, fits `i64`) | integer `number` |
/// | `Number` (other finite) | `number` |
/// | `Number` (infinite) | `"Infinity"` / `"-Infinity"` |
/// | `String` | `string` |
/// | `List` (keys `0..n` in order) | `array` |
/// | `List` (any other keys) | `object` with stringified keys |
/// | `Object` | `{ name: { members } }` |
/// | `Class` | `{ name: [ members ] }` |
///
/// # Example
///
/// ```rust
/// use php_session_core::{decode_value, to_json};
///
/// let value = decode_value(r#"o:6:"object":1:{s:3:"key";s:5:"value";}"#).unwrap();
/// assert_eq!(to_json(&value), serde_json::json!({"object": {"key": "value"}}));
/// ```
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::List(items) => {
            // Keys 0, 1, 2, ... in order make a plain array
            let is_indexed = items.keys().enumerate().all(|(i, k)| {
                matches!(k, Key::Number(idx) if *idx == i as f64)
            });

            if is_indexed {
                JsonValue::Array(items.values().map(to_json).collect())
            } else {
                JsonValue::Object(members_to_json(items.iter()))
            }
        }
        Value::Object { name, members } => {
            named(name, JsonValue::Object(members_to_json(members.iter())))
        }
        Value::Class { name, members } => {
            named(name, JsonValue::Array(members.iter().map(to_json).collect()))
        }
    }
}

/// Wrap `inner` as the single-entry object `{ name: inner }`.
fn named(name: &str, inner: JsonValue) -> JsonValue {
    let mut map = Map::with_capacity(1);
    map.insert(name.to_string(), inner);
    JsonValue::Object(map)
}

fn number_to_json(n: f64) -> JsonValue {
    if n.is_nan() {
        JsonValue::Null
    } else if n.is_infinite() {
        if n.is_sign_positive() {
            json!("Infinity")
        } else {
            json!("-Infinity")
        }
    } else if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn members_to_json<'k>(members: impl Iterator<Item = (&'k Key, &'k Value)>) -> Map<String, JsonValue> {
    members.map(|(k, v)| (k.to_string(), to_json(v))).collect()
}

/// Convert a decoded document to a JSON object.
///
/// # Example
///
/// ```rust
/// use php_session_core::{decode, json::document_to_json};
///
/// let session = decode(r#"key|a:0:{}"#).unwrap();
/// assert_eq!(document_to_json(&session), serde_json::json!({"key": []}));
/// ```
pub fn document_to_json(document: &Document) -> JsonValue {
    JsonValue::Object(
        document
            .iter()
            .map(|(k, v)| (k.clone(), to_json(v)))
            .collect(),
    )
}

/// Convert a decoded value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_session_core::{decode_value, json::to_json_string};
///
/// let value = decode_value(r#"c:5:"class":2:{s:3:"foo";i:87;}"#).unwrap();
/// assert_eq!(to_json_string(&value).unwrap(), r#"{"class":["foo",87]}"#);
/// ```
pub fn to_json_string(value: &Value) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string(&json)
}

/// Convert a decoded value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &Value) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string_pretty(&json)
}

/// Decode session data and deserialize it into a caller-chosen shape.
///
/// The decoded tree is rendered with [`document_to_json`] and then checked
/// against `T`. A mismatch fails with [`ErrorKind::ShapeMismatch`].
///
/// # Example
///
/// ```rust
/// use php_session_core::decode_as;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Session {
///     user: String,
///     visits: u32,
/// }
///
/// let session: Session = decode_as(r#"user|s:5:"alice";visits|i:3;"#).unwrap();
/// assert_eq!(session.user, "alice");
/// assert_eq!(session.visits, 3);
/// ```
pub fn decode_as<T: DeserializeOwned>(input: &str) -> Result<T> {
    let document = decode(input)?;
    let offset = input.chars().count();
    serde_json::from_value(document_to_json(&document))
        .map_err(|err| SessionDecodeError::new(ErrorKind::ShapeMismatch(err.to_string()), offset))
}
