//! Dictionary codec
//!
//! Encoding and decoding functions for the dictionary text format.
//!
//! ## Wire Format
//!
//! ```text
//! value      := '{' dict_body '}' | '(' list_body ')' | word
//! dict_body  := (key '=' value ';')*
//! list_body  := (value (',' value)*)?
//! word       := quoted | bracket_block | bare_token
//! ```
//!
//! - `quoted` is `"..."` with `\ddd` decimal escapes plus `\"` and `\\`
//! - `bracket_block` is `[...]`, copied verbatim
//! - `bare_token` is a run of `[-A-Za-z0-9_.@!#%:\x80-\xff]`
//!
//! ## Translation Mode
//! With translation off (the default) the `\"` and `\\` escapes are kept
//! as-is in decoded scalars and passed through as-is when encoding, so
//! scalars hold the escaped wire form. With translation on, decoded
//! scalars hold the plain text and the encoder escapes it again.

use std::fmt::Write as _;

use crate::error::{CgpError, Result};
use super::WireValue;

/// Default limit on `{`/`(` nesting while decoding
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Bytes of input quoted in format error messages
const ERROR_SNIPPET_LEN: usize = 10;

/// Converts wire values to text and back
///
/// The session only ever talks to its serializer through this trait.
pub trait Serializer: Send {
    /// Encode a value; `None` encodes to the empty string
    fn serialize(&self, value: Option<&WireValue>) -> String;

    /// Decode text into a value
    fn deserialize(&self, text: &str) -> Result<WireValue>;
}

/// Codec for the dictionary text format
#[derive(Debug, Clone, Copy)]
pub struct DictionaryCodec {
    translate_strings: bool,
    max_depth: usize,
}

impl Default for DictionaryCodec {
    fn default() -> Self {
        Self {
            translate_strings: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DictionaryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn string translation on or off
    pub fn with_translation(mut self, translate_strings: bool) -> Self {
        self.translate_strings = translate_strings;
        self
    }

    /// Set the nesting limit used while decoding
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn translate_strings(&self) -> bool {
        self.translate_strings
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode a value to dictionary text
    pub fn encode(&self, value: &WireValue) -> String {
        let mut out = String::new();
        self.write_value(value, &mut out);
        out
    }

    fn write_value(&self, value: &WireValue, out: &mut String) {
        match value {
            WireValue::Scalar(s) => self.write_scalar(s, out),
            WireValue::List(items) => self.write_list(items.iter(), out),
            WireValue::Dict(entries) => {
                // A dictionary whose first key is numeric goes out as a list
                let numeric = entries.first().map_or(true, |(k, _)| is_numeric_key(k));
                if numeric {
                    self.write_list(entries.iter().map(|(_, v)| v), out);
                    return;
                }

                out.push('{');
                for (key, value) in entries {
                    self.write_scalar(key, out);
                    out.push('=');
                    self.write_value(value, out);
                    out.push(';');
                }
                out.push('}');
            }
        }
    }

    fn write_list<'a>(&self, items: impl Iterator<Item = &'a WireValue>, out: &mut String) {
        out.push('(');
        for (i, item) in items.enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_value(item, out);
        }
        out.push(')');
    }

    fn write_scalar(&self, s: &str, out: &mut String) {
        if !needs_quoting(s) {
            out.push_str(s);
            return;
        }

        out.push('"');
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if self.translate_strings => match chars.peek() {
                    Some(&n) if matches!(n, 'e' | 'n' | 'r') || n.is_ascii_digit() => out.push('\\'),
                    _ => out.push_str("\\\\"),
                },
                '\\' => match chars.peek() {
                    // Already escaped in raw mode, copy the pair untouched
                    Some(&n) if n == '"' || n == '\\' => {
                        out.push('\\');
                        out.push(n);
                        chars.next();
                    }
                    // A trailing backslash would swallow the closing quote
                    None => out.push_str("\\092"),
                    Some(_) => out.push('\\'),
                },
                '"' if self.translate_strings => out.push_str("\\\""),
                // Raw-mode decoding keeps `\"` as two characters
                '"' => out.push_str("\\034"),
                c if c.is_ascii_control() => {
                    let _ = write!(out, "\\{:03}", c as u32);
                }
                c => out.push(c),
            }
        }
        out.push('"');
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decode dictionary text into a value
    ///
    /// Text after the first complete value is ignored.
    pub fn decode(&self, text: &str) -> Result<WireValue> {
        let mut parser = Parser {
            data: text.as_bytes(),
            pos: 0,
            depth: 0,
            translate_strings: self.translate_strings,
            max_depth: self.max_depth,
        };
        parser.read_value()
    }
}

impl Serializer for DictionaryCodec {
    fn serialize(&self, value: Option<&WireValue>) -> String {
        value.map(|v| self.encode(v)).unwrap_or_default()
    }

    fn deserialize(&self, text: &str) -> Result<WireValue> {
        self.decode(text)
    }
}

/// Encode with the default codec (translation off)
pub fn encode(value: &WireValue) -> String {
    DictionaryCodec::default().encode(value)
}

/// Decode with the default codec (translation off)
pub fn decode(text: &str) -> Result<WireValue> {
    DictionaryCodec::default().decode(text)
}

/// Empty strings and anything outside `[A-Za-z0-9_]` must be quoted
fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

fn is_numeric_key(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_digit())
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

fn is_bare(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || b >= 0x80
        || matches!(b, b'-' | b'_' | b'.' | b'@' | b'!' | b'#' | b'%' | b':')
}

// =============================================================================
// Parser
// =============================================================================

/// Recursive-descent parser with a single forward cursor
struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    translate_strings: bool,
    max_depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn error(&self, what: &str) -> CgpError {
        let end = (self.pos + ERROR_SNIPPET_LEN).min(self.data.len());
        let snippet = String::from_utf8_lossy(&self.data[self.pos..end]);
        CgpError::format(format!("CGPro output format error {}: '{}'", what, snippet))
    }

    fn read_value(&mut self) -> Result<WireValue> {
        self.skip_spaces();
        match self.peek() {
            Some(b'{') => {
                self.pos += 1;
                self.enter()?;
                let dict = self.read_dictionary()?;
                self.depth -= 1;
                Ok(dict)
            }
            Some(b'(') => {
                self.pos += 1;
                self.enter()?;
                let list = self.read_list()?;
                self.depth -= 1;
                Ok(list)
            }
            _ => Ok(WireValue::Scalar(self.read_word()?)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CgpError::format(format!(
                "nesting deeper than {} levels at offset {}",
                self.max_depth, self.pos
            )));
        }
        Ok(())
    }

    fn read_word(&mut self) -> Result<String> {
        self.skip_spaces();
        let bytes = match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                self.read_quoted()?
            }
            Some(b'[') => self.read_block()?,
            _ => self.read_bare(),
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_quoted(&mut self) -> Result<Vec<u8>> {
        let start = self.pos - 1;
        let mut out = Vec::new();

        while let Some(ch) = self.peek() {
            match ch {
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    let rest = &self.data[self.pos + 1..];
                    if rest.len() >= 3 && rest[..3].iter().all(u8::is_ascii_digit) {
                        let code = rest[..3]
                            .iter()
                            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
                        out.push((code % 256) as u8);
                        self.pos += 4;
                    } else if let Some(&(escaped @ (b'"' | b'\\'))) = rest.first() {
                        if !self.translate_strings {
                            out.push(b'\\');
                        }
                        out.push(escaped);
                        self.pos += 2;
                    } else {
                        out.push(b'\\');
                        self.pos += 1;
                    }
                }
                _ => {
                    out.push(ch);
                    self.pos += 1;
                }
            }
        }

        Err(CgpError::format(format!(
            "unterminated quoted string starting at offset {}",
            start
        )))
    }

    fn read_block(&mut self) -> Result<Vec<u8>> {
        let start = self.pos;
        match self.data[start..].iter().position(|&b| b == b']') {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(self.data[start..self.pos].to_vec())
            }
            None => Err(CgpError::format(format!(
                "unterminated block starting at offset {}",
                start
            ))),
        }
    }

    fn read_bare(&mut self) -> Vec<u8> {
        let start = self.pos;
        while self.peek().is_some_and(is_bare) {
            self.pos += 1;
        }
        self.data[start..self.pos].to_vec()
    }

    fn read_list(&mut self) -> Result<WireValue> {
        let mut items = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                None => return Err(self.error("unterminated array")),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(WireValue::List(items));
                }
                Some(_) => {}
            }

            items.push(self.read_value()?);
            self.skip_spaces();

            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                _ => return Err(self.error("in array")),
            }
        }
    }

    fn read_dictionary(&mut self) -> Result<WireValue> {
        let mut entries = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                None => return Err(self.error("unterminated dictionary")),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(WireValue::Dict(entries));
                }
                Some(_) => {}
            }

            let key = self.read_word()?;
            self.skip_spaces();

            // Every key must be followed by "="
            if self.peek() != Some(b'=') {
                return Err(self.error("at '='"));
            }
            self.pos += 1;

            let value = self.read_value()?;
            self.skip_spaces();

            // Every value must be terminated by ";"
            if self.peek() != Some(b';') {
                return Err(self.error("while reading value"));
            }
            self.pos += 1;

            entries.push((key, value));
        }
    }
}
