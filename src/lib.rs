//! TOON codec: a token-dense, indentation-based text format that is
//! round-trip-compatible with the JSON data model.
//!
//! Objects nest by indentation alone; arrays declare their length in a
//! header and render in one of three shapes (tabular, inline, or a `- `
//! list). Decoding is strict by default and reports precise line numbers.
//!
//! ```
//! use serde_json::json;
//! use toon_codec::{decode_value, encode, to_value, ToonOptions};
//!
//! let options = ToonOptions::default();
//! let text = encode(&json!({"tags": ["dev", "api"]}), &options)?;
//! assert_eq!(text, "tags[2]: dev, api");
//!
//! let value = decode_value(&text, &options)?;
//! assert_eq!(value, to_value(&json!({"tags": ["dev", "api"]}))?);
//! # Ok::<(), toon_codec::Error>(())
//! ```

pub mod constants;
mod decode;
mod encode;
mod error;
mod normalize;
mod options;
mod utils;
mod value;

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{Error, Result};
pub use normalize::to_value;
pub use options::{Delimiter, Indent, ToonOptions};
pub use utils::string::{escape_string, is_valid_unquoted_key, needs_quoting};
pub use value::{Number, Object, Value};

/// Encode any serializable value.
///
/// # Examples
/// ```
/// use serde::Serialize;
/// use toon_codec::{encode, ToonOptions};
///
/// #[derive(Serialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let user = User { name: "Ada".to_string(), age: 37 };
/// let text = encode(&user, &ToonOptions::default())?;
/// assert_eq!(text, "name: Ada\nage: 37");
/// # Ok::<(), toon_codec::Error>(())
/// ```
pub fn encode<T: Serialize>(value: &T, options: &ToonOptions) -> Result<String> {
    let value = normalize::to_value(value)?;
    encode::encode_value(&value, options)
}

/// Encode with default options (2-space indent, comma delimiter).
pub fn encode_default<T: Serialize>(value: &T) -> Result<String> {
    encode(value, &ToonOptions::default())
}

/// Encode an already-normalized [`Value`] tree.
///
/// Total over the canonical model; the only failure path is a non-finite
/// number constructed directly, which normalization would have rejected.
pub fn encode_value(value: &Value, options: &ToonOptions) -> Result<String> {
    encode::encode_value(value, options)
}

/// Encode straight into a writer.
pub fn encode_to_writer<T: Serialize, W: Write>(
    mut writer: W,
    value: &T,
    options: &ToonOptions,
) -> Result<()> {
    let value = normalize::to_value(value)?;
    let bytes = encode::encode_value_to_vec(&value, options)?;
    writer
        .write_all(&bytes)
        .map_err(|err| Error::io(err.to_string()))
}

/// Decode into any deserializable type.
///
/// # Examples
/// ```
/// use serde::Deserialize;
/// use toon_codec::{decode, ToonOptions};
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let user: User = decode("name: Ada\nage: 37", &ToonOptions::default())?;
/// assert_eq!(user.age, 37);
/// # Ok::<(), toon_codec::Error>(())
/// ```
pub fn decode<T: DeserializeOwned>(input: &str, options: &ToonOptions) -> Result<T> {
    decode::from_str(input, options)
}

/// Decode with default options (strict, 2-space indent, comma delimiter).
pub fn decode_default<T: DeserializeOwned>(input: &str) -> Result<T> {
    decode(input, &ToonOptions::default())
}

/// Decode into the canonical [`Value`] tree.
///
/// Fails with [`Error::Scan`], [`Error::Structure`] or [`Error::Quoting`]
/// on malformed input; in strict mode these are precise and eager.
pub fn decode_value(input: &str, options: &ToonOptions) -> Result<Value> {
    decode::decode_value(input, options)
}

/// Decode from a reader.
pub fn decode_from_reader<T: DeserializeOwned, R: Read>(
    mut reader: R,
    options: &ToonOptions,
) -> Result<T> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::io(err.to_string()))?;
    decode(&buf, options)
}

/// Check a document for well-formedness without keeping the tree.
pub fn validate(input: &str, options: &ToonOptions) -> Result<()> {
    decode::decode_value(input, options).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_encode_to_writer() {
        let mut out = Vec::new();
        encode_to_writer(&mut out, &serde_json::json!({"a": 1}), &ToonOptions::default())
            .unwrap();
        assert_eq!(out, b"a: 1");
    }

    #[rstest::rstest]
    fn test_decode_from_reader() {
        let input = "name: Ada".as_bytes();
        let value: serde_json::Value =
            decode_from_reader(input, &ToonOptions::default()).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Ada"}));
    }

    #[rstest::rstest]
    fn test_validate() {
        assert!(validate("a: 1", &ToonOptions::default()).is_ok());
        assert!(validate("a[2]: 1", &ToonOptions::default()).is_err());
    }
}
