//! Decoded value types.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// A decoded session document: top-level keys mapped to their values.
///
/// Iteration follows the order keys first appeared in the input. A repeated
/// key keeps its first position and takes the last value.
pub type Document = IndexMap<String, Value>;

/// A value decoded from PHP serialize text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `n;`
    #[default]
    Null,

    /// `b:0;` or `b:1;`
    Bool(bool),

    /// `i:`, `d:` and `r:` values. References are not resolved and decode to
    /// their index like any other number.
    Number(f64),

    /// `s:` value. The declared length is not used.
    String(String),

    /// `a:` value. PHP arrays mix sequential and associative members in one
    /// container, so every member is keyed.
    List(IndexMap<Key, Value>),

    /// `o:` value.
    Object {
        /// Object name.
        name: String,
        /// Keyed members.
        members: IndexMap<Key, Value>,
    },

    /// `c:` value.
    Class {
        /// Class name.
        name: String,
        /// Positional members.
        members: Vec<Value>,
    },
}

/// A key inside a `List` or `Object`.
///
/// Only scalar values can act as keys.
#[derive(Debug, Clone)]
pub enum Key {
    /// Null key.
    Null,
    /// Boolean key.
    Bool(bool),
    /// Numeric key.
    Number(f64),
    /// String key.
    String(String),
}

impl Key {
    /// Build a key from a decoded value. Returns the value back if it is not
    /// a scalar.
    pub fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Null => Ok(Key::Null),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Number(n) => Ok(Key::Number(n)),
            Value::String(s) => Ok(Key::String(s)),
            other => Err(other),
        }
    }

    /// Get the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the key as a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Key::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Bit pattern used for equality and hashing of numeric keys.
    #[inline]
    fn number_bits(n: f64) -> u64 {
        // -0.0 and 0.0 are the same slot
        if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => Key::number_bits(*a) == Key::number_bits(*b),
            (Key::String(a), Key::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Null => {}
            Key::Bool(b) => b.hash(state),
            Key::Number(n) => Key::number_bits(*n).hash(state),
            Key::String(s) => s.hash(state),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Number(n)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Number(n as f64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "null"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Number(n) => write!(f, "{}", format_number(*n)),
            Key::String(s) => write!(f, "{}", s),
        }
    }
}

/// Format a number the way it reads in the source data: integral values
/// print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl Value {
    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if the value is a number.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if the value is a list.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Check if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object { .. })
    }

    /// Check if the value is a class.
    #[inline]
    pub fn is_class(&self) -> bool {
        matches!(self, Value::Class { .. })
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the members of a list.
    #[inline]
    pub fn as_list(&self) -> Option<&IndexMap<Key, Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The name of an object or class.
    pub fn name(&self) -> Option<&str> {
        match self {
            Value::Object { name, .. } | Value::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Look up a keyed member of a list or object.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        match self {
            Value::List(items) | Value::Object { members: items, .. } => items.get(key),
            _ => None,
        }
    }

    /// Look up a positional member of a class.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Class { members, .. } => members.get(index),
            _ => None,
        }
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object { .. } => "object",
            Value::Class { .. } => "class",
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(b),
            Key::Number(n) => Value::Number(n),
            Key::String(s) => Value::String(s),
        }
    }
}

fn write_members<'k>(
    f: &mut fmt::Formatter<'_>,
    members: impl Iterator<Item = (&'k Key, &'k Value)>,
) -> fmt::Result {
    for (i, (k, v)) in members.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} => {}", k, v)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                write_members(f, items.iter())?;
                write!(f, "]")
            }
            Value::Object { name, members } => {
                write!(f, "{}{{", name)?;
                write_members(f, members.iter())?;
                write!(f, "}}")
            }
            Value::Class { name, members } => {
                write!(f, "{}(", name)?;
                for (i, v) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}
