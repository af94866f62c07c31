use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::{Number, Value};

/// Normalize any serializable host value into the canonical model.
///
/// Total for the built-in scalar/array/object shapes; anything the data
/// model cannot carry (maps with non-string keys, values serde cannot
/// represent) fails with [`Error::UnsupportedValue`] rather than being
/// silently dropped.
///
/// # Examples
/// ```
/// use serde::Serialize;
/// use toon_codec::to_value;
///
/// #[derive(Serialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let user = User { name: "Ada".to_string(), age: 37 };
/// let value = to_value(&user)?;
/// assert_eq!(value.get("age").and_then(|v| v.as_u64()), Some(37));
/// # Ok::<(), toon_codec::Error>(())
/// ```
pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    let json = serde_json::to_value(value).map_err(|err| Error::unsupported("$", err.to_string()))?;
    Ok(Value::from(json))
}

/// Pre-emission walk rejecting values with no defined text form.
///
/// The only offender a directly constructed tree can contain is a
/// non-finite number; the error carries a dot/bracket path to it.
pub(crate) fn check_encodable(value: &Value) -> Result<()> {
    let mut path = String::from("$");
    check_value(value, &mut path)
}

fn check_value(value: &Value, path: &mut String) -> Result<()> {
    match value {
        Value::Number(Number::Float(f)) if !f.is_finite() => {
            let kind = if f.is_nan() {
                "NaN"
            } else {
                "infinite number"
            };
            Err(Error::unsupported(
                path.clone(),
                format!("{kind} has no text form"),
            ))
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = path.len();
                let mut buf = itoa::Buffer::new();
                path.push('[');
                path.push_str(buf.format(index));
                path.push(']');
                check_value(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        Value::Object(entries) => {
            for (key, item) in entries {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                check_value(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::String(value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::String(value.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::String(value.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::String(value.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::value::Object;

    #[rstest::rstest]
    fn test_to_value_shapes() {
        let value = to_value(&json!({"a": [1, "x", null], "b": true})).unwrap();
        assert_eq!(value.get("b").and_then(Value::as_bool), Some(true));

        let value = to_value(&Option::<u32>::None).unwrap();
        assert!(value.is_null());
    }

    #[rstest::rstest]
    fn test_check_encodable_reports_path() {
        let mut inner = Object::new();
        inner.insert("price".to_string(), Value::Number(Number::Float(f64::NAN)));
        let tree = Value::Object(Object::from_iter([(
            "items".to_string(),
            Value::Array(vec![Value::Null, Value::Object(inner)]),
        )]));

        let err = check_encodable(&tree).unwrap_err();
        match err {
            Error::UnsupportedValue { path, message } => {
                assert_eq!(path, "$.items[1].price");
                assert!(message.contains("NaN"));
            }
            other => panic!("expected UnsupportedValue, got {other:?}"),
        }
    }

    #[rstest::rstest]
    fn test_check_encodable_accepts_finite_tree() {
        let tree = Value::from(19.99);
        assert!(check_encodable(&tree).is_ok());
    }

    #[rstest::rstest]
    fn test_datetime_mappings() {
        let utc = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            Value::from(utc),
            Value::String("2024-01-15T10:30:00Z".to_string())
        );

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(Value::from(date), Value::String("2024-01-15".to_string()));
    }
}
