//! Decoder for PHP session data.
//!
//! PHP's default session handler stores `$_SESSION` as a run of
//! `key|value` pairs, where each value is written with PHP's `serialize()`
//! format. This crate decodes that text into a [`Document`] of generic
//! [`Value`] trees.
//!
//! # Features
//!
//! - **Single pass** - One forward walk over the input, linear time
//! - **All session value tags** - Strings, numbers, booleans, null, arrays,
//!   objects and class containers
//! - **UTF-8 aware** - Multi-byte text survives regardless of declared length
//! - **Detailed errors** - Character offset, offending text, and the input
//!   left unconsumed
//!
//! # Quick Start
//!
//! ```rust
//! use php_session_core::{decode, Key, Value};
//!
//! let data = r#"user|s:5:"alice";cart|a:2:{i:0;s:5:"apple";i:1;s:4:"pear";}"#;
//! let session = decode(data).unwrap();
//!
//! assert_eq!(session["user"].as_str(), Some("alice"));
//! if let Value::List(items) = &session["cart"] {
//!     for (key, item) in items {
//!         println!("{} => {}", key, item);
//!     }
//! }
//! assert_eq!(
//!     session["cart"].get(&Key::from(1i64)).and_then(Value::as_str),
//!     Some("pear")
//! );
//! ```
//!
//! # Supported Types
//!
//! | Tag | Rust Type |
//! |-----|-----------|
//! | `n` | `Value::Null` |
//! | `b` | `Value::Bool(bool)` |
//! | `i`, `d`, `r` | `Value::Number(f64)` |
//! | `s` | `Value::String(String)` |
//! | `a` | `Value::List(IndexMap<Key, Value>)` |
//! | `o` | `Value::Object { name, members }` |
//! | `c` | `Value::Class { name, members }` |
//!
//! Tags are matched case-insensitively.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod cursor;
pub mod error;
pub mod parser;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;

pub use cursor::Cursor;
pub use error::{ErrorKind, Result, SessionDecodeError};
pub use parser::{decode, decode_value, decode_with_config, Decoder, DecoderConfig};
pub use types::{Document, Key, Value};

#[cfg(feature = "serde")]
pub use json::{decode_as, to_json};
