mod parser;
mod scanner;
mod validation;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::options::{Delimiter, ToonOptions};
use crate::value::{Object, Value};
use parser::{ArrayHeader, Key};
use scanner::Line;

pub(crate) fn from_str<T: DeserializeOwned>(input: &str, options: &ToonOptions) -> Result<T> {
    let value = decode_value(input, options)?;
    let json: serde_json::Value = value.into();
    serde_json::from_value(json).map_err(|err| Error::deserialize(err.to_string()))
}

pub(crate) fn decode_value(input: &str, options: &ToonOptions) -> Result<Value> {
    let lines = scanner::scan(input, options)?;
    let decoder = Decoder {
        delimiter: options.delimiter,
        strict: options.strict,
    };
    decoder.decode_document(&lines)
}

struct Decoder {
    delimiter: Delimiter,
    strict: bool,
}

impl Decoder {
    fn decode_document(&self, lines: &[Line]) -> Result<Value> {
        let first_idx = match lines.iter().position(|l| !l.blank) {
            Some(idx) => idx,
            None => return Ok(Value::Object(Object::new())),
        };
        let first = &lines[first_idx];
        if self.strict && first.depth != 0 {
            return Err(Error::structure(
                first.number,
                "unexpected indentation at document root",
            ));
        }

        // a keyless header at the root is the single top-level array
        if first.content.starts_with('[') {
            if let Some(header) =
                parser::parse_array_header(first.content, self.delimiter, first.number)?
            {
                if header.key.is_none() {
                    let (value, next) =
                        self.read_array(&header, lines, first_idx + 1, 1, first.number)?;
                    self.ensure_no_trailing(lines, next)?;
                    return Ok(value);
                }
            }
        }

        let rest_blank = lines[first_idx + 1..].iter().all(|l| l.blank);
        if rest_blank
            && parser::split_key_value(first.content, first.number)?.is_none()
            && parser::parse_array_header(first.content, self.delimiter, first.number)?.is_none()
        {
            return parser::parse_scalar_token(first.content, first.number);
        }

        let (object, next) = self.read_object_block(lines, first_idx, 0)?;
        self.ensure_no_trailing(lines, next)?;
        Ok(Value::Object(object))
    }

    fn read_object_block(
        &self,
        lines: &[Line],
        mut idx: usize,
        depth: usize,
    ) -> Result<(Object, usize)> {
        let mut object = Object::new();

        while idx < lines.len() {
            let line = &lines[idx];
            if line.blank {
                if depth > 0 && self.block_continues(lines, idx, depth) {
                    validation::check_blank_line(self.strict, line.number)?;
                }
                idx += 1;
                continue;
            }
            if line.depth < depth {
                break;
            }
            validation::check_depth(depth, line.depth, self.strict, line.number)?;

            let (key, value, next) = self.read_entry(lines, idx, depth)?;
            object.insert(key.text, value);
            idx = next;
        }

        Ok((object, idx))
    }

    fn read_entry(&self, lines: &[Line], idx: usize, depth: usize) -> Result<(Key, Value, usize)> {
        let line = &lines[idx];
        let content = line.content;

        if let Some(header) = parser::parse_array_header(content, self.delimiter, line.number)? {
            let key = header
                .key
                .clone()
                .ok_or_else(|| Error::structure(line.number, "array header is missing a key"))?;
            let (value, next) = self.read_array(&header, lines, idx + 1, depth + 1, line.number)?;
            return Ok((key, value, next));
        }

        if let Some((raw_key, raw_value)) = parser::split_key_value(content, line.number)? {
            let key = parser::parse_key_token(raw_key, self.strict, line.number)?;
            if raw_value.trim().is_empty() {
                let (nested, next) = self.read_object_block(lines, idx + 1, depth + 1)?;
                return Ok((key, Value::Object(nested), next));
            }
            let value = parser::parse_scalar_token(raw_value, line.number)?;
            return Ok((key, value, idx + 1));
        }

        if self.strict {
            return Err(Error::structure(
                line.number,
                format!("expected 'key: value', found '{}'", line.raw.trim()),
            ));
        }
        let key = parser::parse_key_token(content, false, line.number)?;
        Ok((key, Value::Null, idx + 1))
    }

    fn read_array(
        &self,
        header: &ArrayHeader,
        lines: &[Line],
        idx: usize,
        children_depth: usize,
        header_line: usize,
    ) -> Result<(Value, usize)> {
        if let Some(inline) = header.inline {
            let tokens = parser::split_delimited(inline, self.delimiter, header_line)?;
            validation::check_count(
                header.len,
                tokens.len(),
                self.strict,
                header_line,
                "array header",
            )?;
            let limit = tokens.len().min(header.len);
            let mut items = Vec::with_capacity(limit);
            for token in tokens.iter().take(limit) {
                items.push(parser::parse_scalar_token(token, header_line)?);
            }
            return Ok((Value::Array(items), idx));
        }

        if let Some(fields) = &header.fields {
            return self.read_tabular_rows(lines, idx, children_depth, fields, header.len, header_line);
        }

        if header.len == 0 {
            return Ok((Value::Array(Vec::new()), idx));
        }

        self.read_list_items(lines, idx, children_depth, header.len, header_line)
    }

    fn read_tabular_rows(
        &self,
        lines: &[Line],
        mut idx: usize,
        rows_depth: usize,
        fields: &[Key],
        declared: usize,
        header_line: usize,
    ) -> Result<(Value, usize)> {
        let mut rows = Vec::with_capacity(declared);

        while idx < lines.len() {
            let line = &lines[idx];
            if line.blank {
                if !self.block_continues(lines, idx, rows_depth) {
                    break;
                }
                validation::check_blank_line(self.strict, line.number)?;
                idx += 1;
                continue;
            }
            if line.depth < rows_depth {
                break;
            }
            validation::check_depth(rows_depth, line.depth, self.strict, line.number)?;

            let tokens = parser::split_delimited(line.content, self.delimiter, line.number)?;
            validation::check_row_width(fields.len(), tokens.len(), self.strict, line.number)?;

            let mut row = Object::with_capacity(fields.len());
            for (field, token) in fields.iter().zip(tokens.iter()) {
                row.insert(
                    field.text.clone(),
                    parser::parse_scalar_token(token, line.number)?,
                );
            }
            rows.push(Value::Object(row));
            idx += 1;
        }

        validation::check_count(declared, rows.len(), self.strict, header_line, "array header")?;
        rows.truncate(declared);
        Ok((Value::Array(rows), idx))
    }

    fn read_list_items(
        &self,
        lines: &[Line],
        mut idx: usize,
        item_depth: usize,
        declared: usize,
        header_line: usize,
    ) -> Result<(Value, usize)> {
        let mut items = Vec::with_capacity(declared);

        while idx < lines.len() {
            let line = &lines[idx];
            if line.blank {
                if !self.block_continues(lines, idx, item_depth) {
                    break;
                }
                validation::check_blank_line(self.strict, line.number)?;
                idx += 1;
                continue;
            }
            if line.depth < item_depth {
                break;
            }
            validation::check_depth(item_depth, line.depth, self.strict, line.number)?;

            if line.content == "-" {
                items.push(Value::Object(Object::new()));
                idx += 1;
                continue;
            }
            let item_content = match line.content.strip_prefix("- ") {
                Some(rest) => rest.trim_start(),
                None => {
                    if self.strict {
                        return Err(Error::structure(
                            line.number,
                            format!("expected a list item, found '{}'", line.raw.trim()),
                        ));
                    }
                    break;
                }
            };

            let (item, next) =
                self.read_list_item(item_content, lines, idx + 1, item_depth, line.number)?;
            items.push(item);
            idx = next;
        }

        validation::check_count(declared, items.len(), self.strict, header_line, "array header")?;
        items.truncate(declared);
        Ok((Value::Array(items), idx))
    }

    /// One `- ` block: a scalar, a nested array, or an object whose first
    /// field shares the marker line. An object's own children sit two
    /// levels below the marker; its remaining fields sit one level below.
    fn read_list_item(
        &self,
        content: &str,
        lines: &[Line],
        idx: usize,
        item_depth: usize,
        line_number: usize,
    ) -> Result<(Value, usize)> {
        if let Some(header) = parser::parse_array_header(content, self.delimiter, line_number)? {
            match header.key.clone() {
                None => return self.read_array(&header, lines, idx, item_depth + 1, line_number),
                Some(key) => {
                    let (value, next) =
                        self.read_array(&header, lines, idx, item_depth + 2, line_number)?;
                    let mut object = Object::new();
                    object.insert(key.text, value);
                    let (rest, next) = self.read_object_block(lines, next, item_depth + 1)?;
                    object.extend(rest);
                    return Ok((Value::Object(object), next));
                }
            }
        }

        if let Some((raw_key, raw_value)) = parser::split_key_value(content, line_number)? {
            let key = parser::parse_key_token(raw_key, self.strict, line_number)?;
            let mut object = Object::new();
            let next = if raw_value.trim().is_empty() {
                let (nested, next) = self.read_object_block(lines, idx, item_depth + 2)?;
                object.insert(key.text, Value::Object(nested));
                next
            } else {
                object.insert(
                    key.text,
                    parser::parse_scalar_token(raw_value, line_number)?,
                );
                idx
            };
            let (rest, next) = self.read_object_block(lines, next, item_depth + 1)?;
            object.extend(rest);
            return Ok((Value::Object(object), next));
        }

        let value = parser::parse_scalar_token(content, line_number)?;
        Ok((value, idx))
    }

    fn block_continues(&self, lines: &[Line], idx: usize, depth: usize) -> bool {
        lines[idx + 1..]
            .iter()
            .find(|l| !l.blank)
            .is_some_and(|l| l.depth >= depth)
    }

    fn ensure_no_trailing(&self, lines: &[Line], idx: usize) -> Result<()> {
        if let Some(extra) = lines[idx..].iter().find(|l| !l.blank) {
            if self.strict {
                return Err(Error::structure(extra.number, "unexpected trailing content"));
            }
        }
        Ok(())
    }
}
