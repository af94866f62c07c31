mod writer;

use crate::constants::MAX_DEPTH;
use crate::error::{Error, Result};
use crate::normalize;
use crate::options::ToonOptions;
use crate::utils::validation::validate_depth;
use crate::value::{Object, Value};
use writer::Writer;

pub(crate) fn encode_value(value: &Value, options: &ToonOptions) -> Result<String> {
    let mut writer = begin(value, options)?;
    write_root(&mut writer, value)?;
    Ok(writer.finish())
}

pub(crate) fn encode_value_to_vec(value: &Value, options: &ToonOptions) -> Result<Vec<u8>> {
    let mut writer = begin(value, options)?;
    write_root(&mut writer, value)?;
    Ok(writer.finish_bytes())
}

fn begin(value: &Value, options: &ToonOptions) -> Result<Writer> {
    if options.indent.get_spaces() == 0 {
        return Err(Error::serialize("indent width must be positive"));
    }
    normalize::check_encodable(value)?;
    Ok(Writer::new(options.clone()))
}

fn write_root(w: &mut Writer, value: &Value) -> Result<()> {
    match value {
        Value::Object(obj) => write_object(w, obj, 0),
        Value::Array(arr) => write_array(w, None, arr, 0),
        _ => write_scalar(w, value),
    }
}

fn write_object(w: &mut Writer, obj: &Object, depth: usize) -> Result<()> {
    validate_depth(depth, MAX_DEPTH)?;

    for (i, (key, value)) in obj.iter().enumerate() {
        if i > 0 {
            w.write_newline()?;
        }

        match value {
            Value::Array(arr) => write_array(w, Some(key), arr, depth)?,
            Value::Object(nested) => {
                w.write_indent(depth)?;
                w.write_key(key)?;
                w.write_char(':')?;
                if !nested.is_empty() {
                    w.write_newline()?;
                    write_object(w, nested, depth + 1)?;
                }
            }
            _ => {
                w.write_indent(depth)?;
                w.write_key(key)?;
                w.write_str(": ")?;
                write_scalar(w, value)?;
            }
        }
    }

    Ok(())
}

enum ArrayKind<'a> {
    Tabular(Vec<&'a str>),
    Inline,
    List,
}

/// Single-pass discriminant for the three array representations, applied
/// in priority order: tabular beats inline beats the list fallback.
fn classify_array(arr: &[Value]) -> ArrayKind<'_> {
    let first = match arr.first() {
        Some(value) => value,
        None => return ArrayKind::Inline,
    };

    if let Value::Object(first_obj) = first {
        if first_obj.is_empty() || !first_obj.values().all(Value::is_scalar) {
            return ArrayKind::List;
        }

        let keys: Vec<&str> = first_obj.keys().map(String::as_str).collect();

        for value in &arr[1..] {
            let obj = match value.as_object() {
                Some(obj) => obj,
                None => return ArrayKind::List,
            };
            // the key set must match in order, not just by membership
            if obj.len() != keys.len()
                || !obj.keys().map(String::as_str).eq(keys.iter().copied())
            {
                return ArrayKind::List;
            }
            if !obj.values().all(Value::is_scalar) {
                return ArrayKind::List;
            }
        }

        return ArrayKind::Tabular(keys);
    }

    if arr.iter().all(Value::is_scalar) {
        ArrayKind::Inline
    } else {
        ArrayKind::List
    }
}

fn write_array(w: &mut Writer, key: Option<&str>, arr: &[Value], depth: usize) -> Result<()> {
    write_array_at(w, key, arr, depth, depth + 1)
}

/// `header_depth` indents the header line (ignored for keyless headers
/// continuing an existing line); `children_depth` places rows or list
/// items, which sit one level deeper than the header except after a list
/// marker, where sibling fields claim the intermediate level.
fn write_array_at(
    w: &mut Writer,
    key: Option<&str>,
    arr: &[Value],
    header_depth: usize,
    children_depth: usize,
) -> Result<()> {
    validate_depth(children_depth, MAX_DEPTH)?;

    match classify_array(arr) {
        ArrayKind::Tabular(fields) => {
            write_tabular_array(w, key, arr, &fields, header_depth, children_depth)
        }
        ArrayKind::Inline => write_inline_array(w, key, arr, header_depth),
        ArrayKind::List => write_list_array(w, key, arr, header_depth, children_depth),
    }
}

fn write_inline_array(
    w: &mut Writer,
    key: Option<&str>,
    arr: &[Value],
    header_depth: usize,
) -> Result<()> {
    w.write_array_header(key, arr.len(), None, header_depth)?;

    for (i, item) in arr.iter().enumerate() {
        if i > 0 {
            w.write_delimiter()?;
        }
        w.write_char(' ')?;
        write_scalar(w, item)?;
    }

    Ok(())
}

fn write_tabular_array(
    w: &mut Writer,
    key: Option<&str>,
    arr: &[Value],
    fields: &[&str],
    header_depth: usize,
    rows_depth: usize,
) -> Result<()> {
    w.write_array_header(key, arr.len(), Some(fields), header_depth)?;

    for item in arr {
        w.write_newline()?;
        w.write_indent(rows_depth)?;
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => continue,
        };
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                w.write_delimiter()?;
            }
            match obj.get(*field) {
                Some(value) => write_scalar(w, value)?,
                None => w.write_str("null")?,
            }
        }
    }

    Ok(())
}

fn write_list_array(
    w: &mut Writer,
    key: Option<&str>,
    arr: &[Value],
    header_depth: usize,
    items_depth: usize,
) -> Result<()> {
    w.write_array_header(key, arr.len(), None, header_depth)?;

    for item in arr {
        w.write_newline()?;
        w.write_indent(items_depth)?;
        w.write_char('-')?;

        match item {
            Value::Object(obj) if obj.is_empty() => {}
            Value::Object(obj) => {
                w.write_char(' ')?;
                write_list_item_object(w, obj, items_depth)?;
            }
            Value::Array(inner) => {
                w.write_char(' ')?;
                write_array_at(w, None, inner, items_depth, items_depth + 1)?;
            }
            _ => {
                w.write_char(' ')?;
                write_scalar(w, item)?;
            }
        }
    }

    Ok(())
}

/// An object list item puts its first key on the marker line; remaining
/// keys sit one level deeper, aligned under it, and any nested children of
/// a field land one level deeper still.
fn write_list_item_object(w: &mut Writer, obj: &Object, item_depth: usize) -> Result<()> {
    let mut iter = obj.iter();
    let (first_key, first_value) = match iter.next() {
        Some(entry) => entry,
        None => return Ok(()),
    };

    match first_value {
        Value::Array(arr) => {
            write_array_at(w, Some(first_key), arr, 0, item_depth + 2)?;
        }
        Value::Object(nested) => {
            w.write_key(first_key)?;
            w.write_char(':')?;
            if !nested.is_empty() {
                w.write_newline()?;
                write_object(w, nested, item_depth + 2)?;
            }
        }
        _ => {
            w.write_key(first_key)?;
            w.write_str(": ")?;
            write_scalar(w, first_value)?;
        }
    }

    for (key, value) in iter {
        w.write_newline()?;
        match value {
            Value::Array(arr) => {
                write_array_at(w, Some(key), arr, item_depth + 1, item_depth + 2)?;
            }
            Value::Object(nested) => {
                w.write_indent(item_depth + 1)?;
                w.write_key(key)?;
                w.write_char(':')?;
                if !nested.is_empty() {
                    w.write_newline()?;
                    write_object(w, nested, item_depth + 2)?;
                }
            }
            _ => {
                w.write_indent(item_depth + 1)?;
                w.write_key(key)?;
                w.write_str(": ")?;
                write_scalar(w, value)?;
            }
        }
    }

    Ok(())
}

fn write_scalar(w: &mut Writer, value: &Value) -> Result<()> {
    match value {
        Value::Null => w.write_str("null"),
        Value::Bool(b) => w.write_str(if *b { "true" } else { "false" }),
        Value::Number(n) => w.write_number(n),
        Value::String(s) => {
            if w.needs_quoting(s) {
                w.write_quoted_string(s)
            } else {
                w.write_str(s)
            }
        }
        other => Err(Error::serialize(format!(
            "expected scalar value, found {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::options::Delimiter;

    fn encode_json(value: serde_json::Value, options: &ToonOptions) -> String {
        encode_value(&Value::from(value), options).unwrap()
    }

    fn encode_json_default(value: serde_json::Value) -> String {
        encode_json(value, &ToonOptions::default())
    }

    #[rstest::rstest]
    fn test_encode_scalars() {
        assert_eq!(encode_json_default(json!(null)), "null");
        assert_eq!(encode_json_default(json!(true)), "true");
        assert_eq!(encode_json_default(json!(false)), "false");
        assert_eq!(encode_json_default(json!(42)), "42");
        assert_eq!(encode_json_default(json!(-5)), "-5");
        assert_eq!(encode_json_default(json!("hello")), "hello");
        assert_eq!(encode_json_default(json!("hello world")), "hello world");
    }

    #[rstest::rstest]
    fn test_encode_simple_object() {
        let result = encode_json_default(json!({"name": "Alice", "age": 30}));
        assert_eq!(result, "name: Alice\nage: 30");
    }

    #[rstest::rstest]
    fn test_encode_inline_array() {
        let result = encode_json_default(json!({"tags": ["dev", "api", "v2"]}));
        assert_eq!(result, "tags[3]: dev, api, v2");
    }

    #[rstest::rstest]
    fn test_encode_empty_array() {
        assert_eq!(encode_json_default(json!({"items": []})), "items[0]:");
    }

    #[rstest::rstest]
    fn test_encode_tabular_array() {
        let result = encode_json_default(json!({
            "users": [
                {"id": 1, "name": "Alice"},
                {"id": 2, "name": "Bob"}
            ]
        }));
        assert_eq!(result, "users[2]:{id,name}\n  1,Alice\n  2,Bob");
    }

    #[rstest::rstest]
    fn test_encode_tabular_with_marker_and_pipe() {
        let options = ToonOptions::new()
            .with_delimiter(Delimiter::Pipe)
            .with_length_marker(true);
        let result = encode_json(
            json!({"users": [{"name": "Alice", "age": 30}, {"name": "Bob", "age": 25}]}),
            &options,
        );
        assert_eq!(result, "users[#2]:{name|age}\n  Alice|30\n  Bob|25");
    }

    #[rstest::rstest]
    fn test_key_order_breaks_tabular() {
        // same key set, different order: falls back to the list form
        let result = encode_json_default(json!({
            "rows": [
                {"a": 1, "b": 2},
                {"b": 3, "a": 4}
            ]
        }));
        assert_eq!(result, "rows[2]:\n  - a: 1\n    b: 2\n  - b: 3\n    a: 4");
    }

    #[rstest::rstest]
    fn test_encode_list_of_mixed_shapes() {
        let result = encode_json_default(json!({
            "items": [
                {"sku": "A1", "price": 19.99},
                {"name": "Widget B"}
            ]
        }));
        assert_eq!(
            result,
            "items[2]:\n  - sku: A1\n    price: 19.99\n  - name: Widget B"
        );
    }

    #[rstest::rstest]
    fn test_encode_nested_object() {
        let result = encode_json_default(json!({"user": {"name": "Alice", "age": 30}}));
        assert_eq!(result, "user:\n  name: Alice\n  age: 30");
    }

    #[rstest::rstest]
    fn test_encode_empty_object_value() {
        assert_eq!(encode_json_default(json!({"meta": {}})), "meta:");
    }

    #[rstest::rstest]
    fn test_encode_root_array() {
        assert_eq!(encode_json_default(json!([1, 2, 3])), "[3]: 1, 2, 3");
        assert_eq!(encode_json_default(json!([])), "[0]:");
        assert_eq!(
            encode_json_default(json!([{"a": 1}, {"a": 2}])),
            "[2]:{a}\n  1\n  2"
        );
    }

    #[rstest::rstest]
    fn test_encode_list_item_with_nested_tabular() {
        let result = encode_json_default(json!({
            "items": [
                {
                    "users": [
                        {"id": 1, "name": "Ada"},
                        {"id": 2, "name": "Bob"}
                    ],
                    "status": "active"
                }
            ]
        }));
        assert_eq!(
            result,
            "items[1]:\n  - users[2]:{id,name}\n      1,Ada\n      2,Bob\n    status: active"
        );
    }

    #[rstest::rstest]
    fn test_encode_list_item_with_inline_first_field() {
        let result = encode_json_default(json!({
            "items": [{"tags": ["a", "b", "c"], "name": "test"}]
        }));
        assert_eq!(result, "items[1]:\n  - tags[3]: a, b, c\n    name: test");
    }

    #[rstest::rstest]
    fn test_encode_nested_arrays_as_list_items() {
        let result = encode_json_default(json!({"m": [[1, 2], [3]]}));
        assert_eq!(result, "m[2]:\n  - [2]: 1, 2\n  - [1]: 3");
    }

    #[rstest::rstest]
    fn test_encode_empty_object_list_item() {
        let result = encode_json_default(json!({"items": [{}, 1]}));
        assert_eq!(result, "items[2]:\n  -\n  - 1");
    }

    #[rstest::rstest]
    fn test_encode_rejects_non_finite() {
        let value = Value::from(f64::NAN);
        let err = encode_value(&value, &ToonOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue { .. }));
    }

    #[rstest::rstest]
    fn test_encode_rejects_zero_indent() {
        let err = encode_value(&Value::Null, &ToonOptions::new().with_spaces(0)).unwrap_err();
        assert!(err.to_string().contains("indent width"));
    }

    #[rstest::rstest]
    fn test_max_depth_guard() {
        let mut nested = Value::Null;
        for _ in 0..(MAX_DEPTH + 2) {
            let mut obj = Object::new();
            obj.insert("a".to_string(), nested);
            nested = Value::Object(obj);
        }
        assert!(encode_value(&nested, &ToonOptions::default()).is_err());
    }
}
