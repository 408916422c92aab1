//! PHP session decoder.
//!
//! Session data is a run of `key|value` pairs where every value is in PHP's
//! `serialize()` format. The decoder walks a [`Cursor`] once, front to back,
//! and rebuilds each value recursively.
//!
//! The decoder is lenient about structure: declared string lengths are
//! ignored, and a missing `"` or `}` is not reported by itself. It surfaces as
//! truncated text at the end of input or as a later tag or scalar error. Only
//! type tags, scalar literals and container keys are validated.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for decode instrumentation:
//!
//! ```toml
//! php-session-core = { version = "0.1", features = ["tracing"] }
//! ```

use indexmap::IndexMap;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::cursor::Cursor;
use crate::error::{ErrorKind, Result, SessionDecodeError};
use crate::types::{Document, Key, Value};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// Decoder configuration options.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum nesting depth for lists, objects and classes.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A recursive-descent decoder for PHP session data.
pub struct Decoder<'a> {
    /// Read position over the input.
    cursor: Cursor<'a>,
    /// Decoder configuration.
    config: DecoderConfig,
    /// Current nesting depth.
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder with default configuration.
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, DecoderConfig::default())
    }

    /// Create a new decoder with custom configuration.
    pub fn with_config(input: &'a str, config: DecoderConfig) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Decode `key|value` pairs until the input is used up.
    ///
    /// A key that shows up twice keeps the value decoded last. On failure the
    /// error carries whatever input was left unconsumed.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(input_len = self.cursor.remaining().len())))]
    pub fn decode_document(&mut self) -> Result<Document> {
        #[cfg(feature = "tracing")]
        debug!(input_len = self.cursor.remaining().len(), "Starting session decode");

        let mut document = Document::new();

        while !self.cursor.is_empty() {
            if let Err(err) = self.decode_pair(&mut document) {
                #[cfg(feature = "tracing")]
                warn!(error = %err, offset = self.cursor.offset(), "Session decode failed");

                return Err(err.with_remaining(self.cursor.remaining()));
            }
        }

        #[cfg(feature = "tracing")]
        debug!(keys = document.len(), "Session decode completed successfully");

        Ok(document)
    }

    /// Decode one `key|value` pair into `document`.
    fn decode_pair(&mut self, document: &mut Document) -> Result<()> {
        let key = self.cursor.consume_until(b"|");

        #[cfg(feature = "tracing")]
        trace!(key, offset = self.cursor.offset(), "Decoding pair");

        let value = self.decode_value()?;

        #[cfg(feature = "tracing")]
        if document.contains_key(key) {
            trace!(key, "Duplicate key, keeping the later value");
        }

        document.insert(key.to_owned(), value);
        Ok(())
    }

    /// Decode a single tagged value at the current position.
    ///
    /// This is the dispatch point that routes each tag to its reader. Tags
    /// match case-insensitively.
    #[cfg_attr(feature = "tracing", instrument(skip(self), level = "trace", fields(offset = self.cursor.offset(), depth = self.depth)))]
    pub fn decode_value(&mut self) -> Result<Value> {
        if self.depth > self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(SessionDecodeError::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                self.cursor.offset(),
            ));
        }

        // `n` and `b` end on `;`, length-prefixed tags on `:`
        let tag = self.cursor.consume_until(b":;");

        #[cfg(feature = "tracing")]
        trace!(tag, offset = self.cursor.offset(), "Decoding value");

        match tag.to_ascii_lowercase().as_str() {
            "s" => Ok(self.decode_string()),
            "i" | "d" | "r" => self.decode_number(),
            "b" => self.decode_bool(),
            "n" => Ok(Value::Null),
            "a" => self.decode_list(),
            "o" => self.decode_object(),
            "c" => self.decode_class(),
            _ => {
                #[cfg(feature = "tracing")]
                warn!(tag, offset = self.cursor.offset(), "Unknown type tag");
                Err(SessionDecodeError::new(
                    ErrorKind::UnknownType(tag.to_owned()),
                    self.cursor.offset(),
                ))
            }
        }
    }

    /// Decode a string: `<len>:"<text>";`
    ///
    /// The text runs to the next `"`; the declared length is skipped, so
    /// multi-byte text survives whatever unit the length was counted in.
    fn decode_string(&mut self) -> Value {
        self.cursor.consume_until(b":");
        self.cursor.consume_until(b"\"");
        let text = self.cursor.consume_until(b"\"");
        self.cursor.consume_until(b";");
        Value::String(text.to_owned())
    }

    /// Decode a number: `<digits>;`
    fn decode_number(&mut self) -> Result<Value> {
        let text = self.cursor.consume_until(b";");
        match parse_number(text) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(SessionDecodeError::new(
                ErrorKind::NotANumber(text.to_owned()),
                self.cursor.offset(),
            )),
        }
    }

    /// Decode a boolean: `0;` or `1;`
    fn decode_bool(&mut self) -> Result<Value> {
        let text = self.cursor.consume_until(b";");
        match text {
            "0" => Ok(Value::Bool(false)),
            "1" => Ok(Value::Bool(true)),
            _ => Err(SessionDecodeError::new(
                ErrorKind::NotABoolean(text.to_owned()),
                self.cursor.offset(),
            )),
        }
    }

    /// Decode a list: `<count>:{<key><value>...}`
    fn decode_list(&mut self) -> Result<Value> {
        let count = parse_count(self.cursor.consume_until(b":"));
        self.cursor.consume_until(b"{");

        self.depth += 1;
        let items = self.decode_members(count)?;
        self.depth -= 1;

        self.cursor.consume_until(b"}");
        Ok(Value::List(items))
    }

    /// Decode an object: `<namelen>:"<name>":<count>:{<key><value>...}`
    fn decode_object(&mut self) -> Result<Value> {
        let (name, count) = self.decode_header();
        self.cursor.consume_until(b"{");

        self.depth += 1;
        let members = self.decode_members(count)?;
        self.depth -= 1;

        self.cursor.consume_until(b"}");
        Ok(Value::Object { name, members })
    }

    /// Decode a class: `<namelen>:"<name>":<count>:{<value>...}`
    fn decode_class(&mut self) -> Result<Value> {
        let (name, count) = self.decode_header();
        self.cursor.consume_until(b"{");

        self.depth += 1;
        let mut members = Vec::with_capacity(count.min(1024)); // Cap initial allocation
        for _ in 0..count {
            members.push(self.decode_value()?);
        }
        self.depth -= 1;

        self.cursor.consume_until(b"}");
        Ok(Value::Class { name, members })
    }

    /// Read the `<namelen>:"<name>":<count>:` header shared by objects and
    /// classes.
    fn decode_header(&mut self) -> (String, usize) {
        self.cursor.consume_until(b":");
        self.cursor.consume_until(b"\"");
        let name = self.cursor.consume_until(b"\"").to_owned();
        self.cursor.consume_until(b":");
        let count = parse_count(self.cursor.consume_until(b":"));
        (name, count)
    }

    /// Decode `count` key/value pairs into one keyed container.
    fn decode_members(&mut self, count: usize) -> Result<IndexMap<Key, Value>> {
        let mut members = IndexMap::with_capacity(count.min(1024)); // Cap initial allocation

        for _ in 0..count {
            let key = Key::from_value(self.decode_value()?).map_err(|found| {
                SessionDecodeError::new(
                    ErrorKind::InvalidKey(found.type_name()),
                    self.cursor.offset(),
                )
            })?;
            let value = self.decode_value()?;
            members.insert(key, value);
        }

        Ok(members)
    }
}

/// Parse the text of a numeric value.
///
/// Surrounding whitespace is ignored and empty text reads as zero. Both the
/// `Infinity` and PHP `INF` spellings are accepted; NaN never is.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed {
        "" => Some(0.0),
        "INF" | "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-INF" | "-Infinity" => Some(f64::NEG_INFINITY),
        _ => {
            // str::parse also takes "inf", "infinity" and "nan"
            if trimmed
                .bytes()
                .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
            {
                return None;
            }
            trimmed.parse().ok()
        }
    }
}

/// Parse a member count. Anything that is not a non-negative integer reads
/// as zero.
fn parse_count(text: &str) -> usize {
    text.trim().parse().unwrap_or(0)
}

/// Decode PHP session data.
///
/// This is the primary API.
///
/// # Example
///
/// ```rust
/// use php_session_core::decode;
///
/// let session = decode(r#"user|s:5:"alice";visits|i:3;"#).unwrap();
/// assert_eq!(session["user"].as_str(), Some("alice"));
/// assert_eq!(session["visits"].as_f64(), Some(3.0));
/// ```
#[inline]
pub fn decode(input: &str) -> Result<Document> {
    #[cfg(feature = "tracing")]
    trace!(input_len = input.len(), "decode called");

    let mut decoder = Decoder::new(input);
    decoder.decode_document()
}

/// Decode PHP session data with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_session_core::{decode_with_config, DecoderConfig};
///
/// let config = DecoderConfig { max_depth: 64 };
/// let session = decode_with_config("flag|b:1;", config).unwrap();
/// assert_eq!(session["flag"].as_bool(), Some(true));
/// ```
#[inline]
pub fn decode_with_config(input: &str, config: DecoderConfig) -> Result<Document> {
    #[cfg(feature = "tracing")]
    trace!(input_len = input.len(), ?config, "decode_with_config called");

    let mut decoder = Decoder::with_config(input, config);
    decoder.decode_document()
}

/// Decode a single bare value, without `key|` framing.
///
/// Input after the first complete value is ignored.
///
/// # Example
///
/// ```rust
/// use php_session_core::{decode_value, Key};
///
/// let value = decode_value(r#"a:1:{s:3:"foo";i:87;}"#).unwrap();
/// assert_eq!(value.get(&Key::from("foo")).and_then(|v| v.as_f64()), Some(87.0));
/// ```
#[inline]
pub fn decode_value(input: &str) -> Result<Value> {
    #[cfg(feature = "tracing")]
    trace!(input_len = input.len(), "decode_value called");

    let mut decoder = Decoder::new(input);
    decoder.decode_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: Vec<(Key, Value)>) -> Value {
        Value::List(entries.into_iter().collect())
    }

    #[test]
    fn test_null() {
        assert_eq!(decode_value("n;").unwrap(), Value::Null);
        assert_eq!(decode_value("N;").unwrap(), Value::Null);
    }

    #[test]
    fn test_bool() {
        assert_eq!(decode_value("b:0;").unwrap(), Value::Bool(false));
        assert_eq!(decode_value("b:1;").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_number() {
        assert_eq!(decode_value("i:0;").unwrap(), Value::Number(0.0));
        assert_eq!(decode_value("i:87;").unwrap(), Value::Number(87.0));
        assert_eq!(decode_value("i:-123;").unwrap(), Value::Number(-123.0));
        assert_eq!(decode_value("d:2.5;").unwrap(), Value::Number(2.5));
        assert_eq!(decode_value("d:1.5E3;").unwrap(), Value::Number(1500.0));
        assert_eq!(decode_value("r:2;").unwrap(), Value::Number(2.0));
        assert_eq!(decode_value("R:2;").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_number_special_values() {
        assert!(matches!(decode_value("d:INF;").unwrap(), Value::Number(f) if f.is_infinite() && f.is_sign_positive()));
        assert!(matches!(decode_value("d:-INF;").unwrap(), Value::Number(f) if f.is_infinite() && f.is_sign_negative()));
        assert!(matches!(
            decode_value("d:NAN;").unwrap_err().kind,
            ErrorKind::NotANumber(ref s) if s == "NAN"
        ));
        assert!(decode_value("d:inf;").is_err());
    }

    #[test]
    fn test_number_lenient_text() {
        assert_eq!(decode_value("i:;").unwrap(), Value::Number(0.0));
        assert_eq!(decode_value("i: 42 ;").unwrap(), Value::Number(42.0));
    }

    #[test]
    fn test_string() {
        assert_eq!(
            decode_value("s:0:\"\";").unwrap(),
            Value::String(String::new())
        );
        assert_eq!(
            decode_value("s:5:\"hello\";").unwrap(),
            Value::String("hello".into())
        );
    }

    #[test]
    fn test_string_ignores_declared_length() {
        assert_eq!(
            decode_value("s:2:\"中文鍵盤\";").unwrap().as_str(),
            Some("中文鍵盤")
        );
        assert_eq!(
            decode_value("s:99:\"short\";").unwrap().as_str(),
            Some("short")
        );
    }

    #[test]
    fn test_string_with_semicolon() {
        assert_eq!(
            decode_value("s:11:\"hello;world\";").unwrap().as_str(),
            Some("hello;world")
        );
    }

    #[test]
    fn test_list_empty() {
        assert_eq!(decode_value("a:0:{}").unwrap(), list(vec![]));
    }

    #[test]
    fn test_list_indexed() {
        let value = decode_value("a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}").unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items.len(), 2);
        let keys: Vec<_> = items.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from(0i64), Key::from(1i64)]);
        assert_eq!(items[&Key::from(1i64)].as_str(), Some("bar"));
    }

    #[test]
    fn test_list_mixed_keys() {
        let value = decode_value("a:2:{s:3:\"foo\";i:87;b:1;n;}").unwrap();
        assert_eq!(
            value,
            list(vec![
                (Key::from("foo"), Value::Number(87.0)),
                (Key::from(true), Value::Null),
            ])
        );
    }

    #[test]
    fn test_list_repeated_key_replaces() {
        let value = decode_value("a:2:{i:0;s:1:\"a\";i:0;s:1:\"b\";}").unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[&Key::from(0i64)].as_str(), Some("b"));
    }

    #[test]
    fn test_object() {
        let value = decode_value("o:6:\"object\":2:{s:3:\"key\";s:5:\"value\";i:8;i:7;}").unwrap();
        let mut members = IndexMap::new();
        members.insert(Key::from("key"), Value::String("value".into()));
        members.insert(Key::from(8i64), Value::Number(7.0));
        assert_eq!(
            value,
            Value::Object {
                name: "object".into(),
                members,
            }
        );
    }

    #[test]
    fn test_object_uppercase_tag() {
        let value = decode_value("O:8:\"stdClass\":1:{s:4:\"name\";s:5:\"Alice\";}").unwrap();
        assert_eq!(value.name(), Some("stdClass"));
        assert_eq!(
            value.get(&Key::from("name")).and_then(Value::as_str),
            Some("Alice")
        );
    }

    #[test]
    fn test_class() {
        let value = decode_value("c:5:\"class\":4:{s:3:\"foo\";i:87;b:1;n;}").unwrap();
        assert_eq!(
            value,
            Value::Class {
                name: "class".into(),
                members: vec![
                    Value::String("foo".into()),
                    Value::Number(87.0),
                    Value::Bool(true),
                    Value::Null,
                ],
            }
        );
    }

    #[test]
    fn test_nested_list_depth() {
        let mut data = String::from("s:4:\"leaf\";");
        for _ in 0..100 {
            data = format!("a:1:{{s:1:\"k\";{}}}", data);
        }
        let value = decode_value(&data).unwrap();
        assert!(value.is_list());
    }

    #[test]
    fn test_max_depth_exceeded() {
        let mut data = String::from("n;");
        for _ in 0..10 {
            data = format!("a:1:{{i:0;{}}}", data);
        }
        let config = DecoderConfig { max_depth: 4 };
        let err = Decoder::with_config(&data, config)
            .decode_value()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded(4));
    }

    #[test]
    fn test_error_unknown_type() {
        let err = decode_value("z:foo;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType("z".into()));
        assert_eq!(err.offset, 2);
        // Bare values are not enriched with leftover text
        assert_eq!(err.remaining, None);
    }

    #[test]
    fn test_error_invalid_number() {
        let err = decode_value("i:abc;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotANumber("abc".into()));
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_error_invalid_bool() {
        let err = decode_value("b:2;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotABoolean("2".into()));
    }

    #[test]
    fn test_error_composite_key() {
        let err = decode_value("a:1:{a:0:{}i:1;}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidKey("list"));
        assert_eq!(err.offset, 11);
    }

    #[test]
    fn test_truncated_string_is_lenient() {
        assert_eq!(
            decode_value("s:10:\"hello").unwrap().as_str(),
            Some("hello")
        );
    }

    #[test]
    fn test_missing_brace_cascades() {
        // The count promises two pairs but only one is there.
        let err = decode_value("a:2:{i:0;i:1;}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownType(ref t) if t == "}"));
    }

    #[test]
    fn test_document_pairs() {
        let document = decode("key|s:3:\"foo\";key2|s:3:\"bar\"").unwrap();
        assert_eq!(document.len(), 2);
        assert_eq!(document["key"].as_str(), Some("foo"));
        assert_eq!(document["key2"].as_str(), Some("bar"));
    }

    #[test]
    fn test_document_empty_input() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_document_last_write_wins() {
        let document = decode("a|i:1;b|i:2;a|i:3;").unwrap();
        let keys: Vec<_> = document.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(document["a"].as_f64(), Some(3.0));
    }

    #[test]
    fn test_document_error_carries_remaining() {
        let err = decode("key|z:foo;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType("z".into()));
        assert_eq!(err.offset, 6);
        assert_eq!(err.remaining.as_deref(), Some("foo;"));
    }

    #[test]
    fn test_config_default() {
        assert_eq!(DecoderConfig::default().max_depth, MAX_DEPTH);
    }
}
