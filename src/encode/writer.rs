use crate::constants::LENGTH_MARKER;
use crate::error::Result;
use crate::options::ToonOptions;
use crate::utils::number::write_number_into;
use crate::utils::string::{escape_string_into, is_valid_unquoted_key, needs_quoting};
use crate::value::Number;

pub(crate) struct Writer {
    buffer: Vec<u8>,
    pub(crate) options: ToonOptions,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: ToonOptions) -> Self {
        let indent_unit = " ".repeat(options.indent.get_spaces());
        Self {
            buffer: Vec::new(),
            options,
            indent_unit,
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(self) -> String {
        // Only UTF-8 fragments are ever appended.
        String::from_utf8(self.buffer).unwrap_or_default()
    }

    pub fn finish_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.buffer.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub fn write_char(&mut self, ch: char) -> Result<()> {
        if ch.is_ascii() {
            self.buffer.push(ch as u8);
            return Ok(());
        }

        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.buffer.extend_from_slice(encoded.as_bytes());
        Ok(())
    }

    pub fn write_newline(&mut self) -> Result<()> {
        self.buffer.push(b'\n');
        Ok(())
    }

    pub fn write_indent(&mut self, depth: usize) -> Result<()> {
        if depth == 0 || self.indent_unit.is_empty() {
            return Ok(());
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer
            .extend_from_slice(self.indent_cache[depth].as_bytes());
        Ok(())
    }

    pub fn write_delimiter(&mut self) -> Result<()> {
        self.buffer.push(self.options.delimiter.as_char() as u8);
        Ok(())
    }

    pub fn write_key(&mut self, key: &str) -> Result<()> {
        if is_valid_unquoted_key(key) {
            self.write_str(key)
        } else {
            self.write_quoted_string(key)
        }
    }

    /// Emit `key[N]:` or `key[#N]:{f1,f2}`; the key (and its indentation)
    /// is omitted when the header continues an existing line.
    pub fn write_array_header(
        &mut self,
        key: Option<&str>,
        len: usize,
        fields: Option<&[&str]>,
        depth: usize,
    ) -> Result<()> {
        if let Some(k) = key {
            if depth > 0 {
                self.write_indent(depth)?;
            }
            self.write_key(k)?;
        }

        self.write_char('[')?;
        if self.options.length_marker {
            self.write_char(LENGTH_MARKER)?;
        }
        self.write_usize(len)?;
        self.write_char(']')?;
        self.write_char(':')?;

        if let Some(field_list) = fields {
            self.write_char('{')?;
            for (i, field) in field_list.iter().enumerate() {
                if i > 0 {
                    self.write_delimiter()?;
                }
                self.write_key(field)?;
            }
            self.write_char('}')?;
        }

        Ok(())
    }

    pub fn needs_quoting(&self, s: &str) -> bool {
        needs_quoting(s, self.options.delimiter.as_char())
    }

    pub fn write_quoted_string(&mut self, s: &str) -> Result<()> {
        self.buffer.push(b'"');
        escape_string_into(&mut self.buffer, s);
        self.buffer.push(b'"');
        Ok(())
    }

    pub fn write_number(&mut self, n: &Number) -> Result<()> {
        write_number_into(n, &mut self.buffer);
        Ok(())
    }

    pub fn write_usize(&mut self, value: usize) -> Result<()> {
        let mut buf = itoa::Buffer::new();
        self.buffer.extend_from_slice(buf.format(value).as_bytes());
        Ok(())
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => {
                    let mut s = String::with_capacity(prev.len() + self.indent_unit.len());
                    s.push_str(prev);
                    s.push_str(&self.indent_unit);
                    s
                }
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Delimiter;

    #[rstest::rstest]
    fn test_writer_basic() {
        let mut writer = Writer::new(ToonOptions::default());
        writer.write_str("hello").unwrap();
        writer.write_char(' ').unwrap();
        writer.write_str("world").unwrap();
        assert_eq!(writer.finish(), "hello world");
    }

    #[rstest::rstest]
    fn test_write_indent() {
        let mut writer = Writer::new(ToonOptions::default());
        writer.write_indent(0).unwrap();
        writer.write_str("a").unwrap();
        writer.write_newline().unwrap();
        writer.write_indent(1).unwrap();
        writer.write_str("b").unwrap();
        writer.write_newline().unwrap();
        writer.write_indent(2).unwrap();
        writer.write_str("c").unwrap();
        assert_eq!(writer.finish(), "a\n  b\n    c");
    }

    #[rstest::rstest]
    fn test_write_array_header() {
        let mut writer = Writer::new(ToonOptions::default());
        writer.write_array_header(Some("items"), 3, None, 0).unwrap();
        assert_eq!(writer.finish(), "items[3]:");

        let mut writer = Writer::new(ToonOptions::default());
        writer
            .write_array_header(Some("users"), 2, Some(&["id", "name"]), 0)
            .unwrap();
        assert_eq!(writer.finish(), "users[2]:{id,name}");
    }

    #[rstest::rstest]
    fn test_write_array_header_with_marker_and_pipe() {
        let options = ToonOptions::new()
            .with_delimiter(Delimiter::Pipe)
            .with_length_marker(true);
        let mut writer = Writer::new(options);
        writer
            .write_array_header(Some("users"), 2, Some(&["name", "age"]), 0)
            .unwrap();
        assert_eq!(writer.finish(), "users[#2]:{name|age}");
    }

    #[rstest::rstest]
    fn test_write_key_with_special_chars() {
        let mut writer = Writer::new(ToonOptions::default());
        writer.write_key("normal_key").unwrap();
        assert_eq!(writer.finish(), "normal_key");

        let mut writer = Writer::new(ToonOptions::default());
        writer.write_key("key:with:colons").unwrap();
        assert_eq!(writer.finish(), "\"key:with:colons\"");
    }

    #[rstest::rstest]
    fn test_write_quoted_string() {
        let mut writer = Writer::new(ToonOptions::default());
        writer.write_quoted_string("say \"hi\"").unwrap();
        assert_eq!(writer.finish(), r#""say \"hi\"""#);
    }
}
