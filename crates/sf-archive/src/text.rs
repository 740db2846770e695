//! Human-readable text archives.
//!
//! ```text
//! checkpoint {
//!     iteration = 42
//!     label = "run \"a\""
//!     values = [0.5, 1.0, 1e-7]
//!     columns {
//!         {
//!             name = "mass"
//!         }
//!     }
//! }
//! ```
//!
//! Floats are written in Rust's shortest round-trip form, so a value read
//! back is bit-identical to the value written. Lines starting with `#` are
//! comments.

use std::io::Write;

use crate::path::{GroupPath, check_name};
use crate::{ArchiveError, ArchiveReader, ArchiveResult, ArchiveWriter};

const INDENT: usize = 4;

pub struct TextWriter<W: Write> {
    out: W,
    path: GroupPath,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            path: GroupPath::new(),
        }
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&mut self) -> ArchiveResult<()> {
        let width = self.path.depth() * INDENT;
        write!(self.out, "{:width$}", "", width = width)?;
        Ok(())
    }

    fn field(&mut self, name: &str, rendered: &str) -> ArchiveResult<()> {
        check_name(name)?;
        self.indent()?;
        writeln!(self.out, "{name} = {rendered}")?;
        Ok(())
    }
}

fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn join<T>(values: &[T], render: impl Fn(&T) -> String) -> String {
    let parts: Vec<String> = values.iter().map(render).collect();
    format!("[{}]", parts.join(", "))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl<W: Write> ArchiveWriter for TextWriter<W> {
    fn write_int(&mut self, name: &str, value: i64) -> ArchiveResult<()> {
        self.field(name, &value.to_string())
    }

    fn write_float(&mut self, name: &str, value: f64) -> ArchiveResult<()> {
        self.field(name, &format_float(value))
    }

    fn write_string(&mut self, name: &str, value: &str) -> ArchiveResult<()> {
        self.field(name, &escape(value))
    }

    fn write_float_array(&mut self, name: &str, values: &[f64]) -> ArchiveResult<()> {
        self.field(name, &join(values, |v| format_float(*v)))
    }

    fn write_int_array(&mut self, name: &str, values: &[i64]) -> ArchiveResult<()> {
        self.field(name, &join(values, |v| v.to_string()))
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        check_name(name)?;
        self.indent()?;
        writeln!(self.out, "{name} {{")?;
        self.path.push(name);
        Ok(())
    }

    fn begin_item(&mut self) -> ArchiveResult<()> {
        self.indent()?;
        writeln!(self.out, "{{")?;
        self.path.push_item();
        Ok(())
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        if self.path.pop().is_none() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        self.indent()?;
        writeln!(self.out, "}}")?;
        Ok(())
    }

    fn finish(&mut self) -> ArchiveResult<()> {
        if !self.path.is_root() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Sequential reader for documents produced by [`TextWriter`].
pub struct TextReader {
    chars: Vec<char>,
    pos: usize,
    path: GroupPath,
}

impl TextReader {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            path: GroupPath::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_blank_and_comments(&mut self) {
        loop {
            self.skip_blank();
            if self.peek() == Some('#') {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_error(&self, message: impl Into<String>) -> ArchiveError {
        ArchiveError::Parse {
            group: self.path.label(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> ArchiveResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.parse_error(format!("expected '{expected}' but found '{c}'"))),
            None => Err(self.parse_error(format!(
                "expected '{expected}' but reached end of input"
            ))),
        }
    }

    fn identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    /// Consume `name =` and leave the cursor at the value.
    fn field_header(&mut self, name: &str) -> ArchiveResult<()> {
        self.skip_blank_and_comments();
        let found = self.identifier();
        if found.is_empty() {
            return Err(ArchiveError::MissingField {
                field: name.to_string(),
                group: self.path.label(),
            });
        }
        if found != name {
            return Err(ArchiveError::UnexpectedField {
                expected: name.to_string(),
                found,
                group: self.path.label(),
            });
        }
        self.skip_blank();
        self.expect('=')?;
        self.skip_blank();
        Ok(())
    }

    fn token(&mut self) -> String {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | ']' | '}' | '#') {
                break;
            }
            token.push(c);
            self.pos += 1;
        }
        token
    }

    fn parse_token<T: std::str::FromStr>(
        &mut self,
        name: &str,
        expected: &'static str,
    ) -> ArchiveResult<T> {
        let token = self.token();
        token.parse().map_err(|_| ArchiveError::TypeMismatch {
            field: name.to_string(),
            group: self.path.label(),
            expected,
        })
    }

    fn array<T: std::str::FromStr>(
        &mut self,
        name: &str,
        expected: &'static str,
    ) -> ArchiveResult<Vec<T>> {
        self.field_header(name)?;
        self.expect('[')?;
        let mut values = Vec::new();
        self.skip_blank();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(values);
        }
        loop {
            self.skip_blank();
            values.push(self.parse_token(name, expected)?);
            self.skip_blank();
            match self.bump() {
                Some(',') => continue,
                Some(']') => break,
                Some(c) => {
                    return Err(self.parse_error(format!(
                        "expected ',' or ']' in array '{name}' but found '{c}'"
                    )));
                }
                None => return Err(self.parse_error(format!("unterminated array '{name}'"))),
            }
        }
        Ok(values)
    }
}

impl ArchiveReader for TextReader {
    fn read_int(&mut self, name: &str) -> ArchiveResult<i64> {
        self.field_header(name)?;
        self.parse_token(name, "an integer")
    }

    fn read_float(&mut self, name: &str) -> ArchiveResult<f64> {
        self.field_header(name)?;
        self.parse_token(name, "a number")
    }

    fn read_string(&mut self, name: &str) -> ArchiveResult<String> {
        self.field_header(name)?;
        if self.peek() != Some('"') {
            return Err(ArchiveError::TypeMismatch {
                field: name.to_string(),
                group: self.path.label(),
                expected: "a quoted string",
            });
        }
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(c) => value.push(c),
                    None => {
                        return Err(self.parse_error(format!("unterminated string '{name}'")));
                    }
                },
                Some(c) => value.push(c),
                None => {
                    return Err(self.parse_error(format!("unterminated string '{name}'")));
                }
            }
        }
        Ok(value)
    }

    fn read_float_array(&mut self, name: &str) -> ArchiveResult<Vec<f64>> {
        self.array(name, "an array of numbers")
    }

    fn read_int_array(&mut self, name: &str) -> ArchiveResult<Vec<i64>> {
        self.array(name, "an array of integers")
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        self.skip_blank_and_comments();
        let found = self.identifier();
        if found != name {
            return Err(ArchiveError::UnexpectedField {
                expected: name.to_string(),
                found,
                group: self.path.label(),
            });
        }
        self.skip_blank();
        self.expect('{')?;
        self.path.push(name);
        Ok(())
    }

    fn next_item(&mut self) -> ArchiveResult<bool> {
        self.skip_blank_and_comments();
        if self.peek() == Some('{') {
            self.pos += 1;
            self.path.push_item();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        self.skip_blank_and_comments();
        self.expect('}')?;
        if self.path.pop().is_none() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        Ok(())
    }

    fn group_path(&self) -> String {
        self.path.label()
    }
}
