//! Compact binary archives.
//!
//! Layout (all integers little-endian):
//! - 4-byte magic `SFB1`
//! - a stream of records, each starting with a one-byte tag
//!
//! | Tag | Record                                              |
//! |-----|-----------------------------------------------------|
//! | 1   | name, i64                                           |
//! | 2   | name, f64 (IEEE-754 bits)                           |
//! | 3   | name, u32 byte length, UTF-8 bytes                  |
//! | 4   | name, u64 count, count x f64                        |
//! | 5   | name, u64 count, count x i64                        |
//! | 6   | name (group start)                                  |
//! | 7   | anonymous item start                                |
//! | 8   | group end                                           |
//!
//! Names are a u16 byte length followed by UTF-8 bytes.

use std::io::Write;

use crate::path::{GroupPath, check_name};
use crate::{ArchiveError, ArchiveReader, ArchiveResult, ArchiveWriter};

pub const MAGIC: &[u8; 4] = b"SFB1";

const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_FLOAT_ARRAY: u8 = 4;
const TAG_INT_ARRAY: u8 = 5;
const TAG_GROUP: u8 = 6;
const TAG_ITEM: u8 = 7;
const TAG_END: u8 = 8;

fn tag_label(tag: u8) -> &'static str {
    match tag {
        TAG_INT => "an integer",
        TAG_FLOAT => "a number",
        TAG_STRING => "a string",
        TAG_FLOAT_ARRAY => "an array of numbers",
        TAG_INT_ARRAY => "an array of integers",
        TAG_GROUP => "a group",
        TAG_ITEM => "an item",
        TAG_END => "a group end",
        _ => "a known record",
    }
}

pub struct BinaryWriter<W: Write> {
    out: W,
    path: GroupPath,
    started: bool,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            path: GroupPath::new(),
            started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn header(&mut self) -> ArchiveResult<()> {
        if !self.started {
            self.out.write_all(MAGIC)?;
            self.started = true;
        }
        Ok(())
    }

    fn record(&mut self, tag: u8, name: &str) -> ArchiveResult<()> {
        check_name(name)?;
        self.header()?;
        let len = u16::try_from(name.len()).map_err(|_| ArchiveError::InvalidName {
            name: name.to_string(),
            reason: "names must be shorter than 65536 bytes",
        })?;
        self.out.write_all(&[tag])?;
        self.out.write_all(&len.to_le_bytes())?;
        self.out.write_all(name.as_bytes())?;
        Ok(())
    }
}

impl<W: Write> ArchiveWriter for BinaryWriter<W> {
    fn write_int(&mut self, name: &str, value: i64) -> ArchiveResult<()> {
        self.record(TAG_INT, name)?;
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_float(&mut self, name: &str, value: f64) -> ArchiveResult<()> {
        self.record(TAG_FLOAT, name)?;
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_string(&mut self, name: &str, value: &str) -> ArchiveResult<()> {
        self.record(TAG_STRING, name)?;
        let len = u32::try_from(value.len()).map_err(|_| ArchiveError::Length {
            field: name.to_string(),
            group: self.path.label(),
            expected: u32::MAX as usize,
            found: value.len(),
        })?;
        self.out.write_all(&len.to_le_bytes())?;
        self.out.write_all(value.as_bytes())?;
        Ok(())
    }

    fn write_float_array(&mut self, name: &str, values: &[f64]) -> ArchiveResult<()> {
        self.record(TAG_FLOAT_ARRAY, name)?;
        self.out.write_all(&(values.len() as u64).to_le_bytes())?;
        for v in values {
            self.out.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    }

    fn write_int_array(&mut self, name: &str, values: &[i64]) -> ArchiveResult<()> {
        self.record(TAG_INT_ARRAY, name)?;
        self.out.write_all(&(values.len() as u64).to_le_bytes())?;
        for v in values {
            self.out.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        self.record(TAG_GROUP, name)?;
        self.path.push(name);
        Ok(())
    }

    fn begin_item(&mut self) -> ArchiveResult<()> {
        self.header()?;
        self.out.write_all(&[TAG_ITEM])?;
        self.path.push_item();
        Ok(())
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        if self.path.pop().is_none() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        self.out.write_all(&[TAG_END])?;
        Ok(())
    }

    fn finish(&mut self) -> ArchiveResult<()> {
        if !self.path.is_root() {
            return Err(ArchiveError::Unbalanced {
                group: self.path.label(),
            });
        }
        self.header()?;
        self.out.flush()?;
        Ok(())
    }
}

/// Sequential reader for documents produced by [`BinaryWriter`].
pub struct BinaryReader {
    bytes: Vec<u8>,
    pos: usize,
    path: GroupPath,
}

impl BinaryReader {
    pub fn new(bytes: Vec<u8>) -> ArchiveResult<Self> {
        if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
            return Err(ArchiveError::Parse {
                group: GroupPath::new().label(),
                message: "missing binary archive header".to_string(),
            });
        }
        Ok(Self {
            bytes,
            pos: MAGIC.len(),
            path: GroupPath::new(),
        })
    }

    fn take<const N: usize>(&mut self, what: &str) -> ArchiveResult<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| ArchiveError::Parse {
            group: self.path.label(),
            message: format!("truncated archive while reading {what}"),
        })?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        self.pos = end;
        Ok(buf)
    }

    fn take_slice(&mut self, len: usize, what: &str) -> ArchiveResult<&[u8]> {
        let end = self.pos.checked_add(len).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(ArchiveError::Parse {
                group: self.path.label(),
                message: format!("truncated archive while reading {what}"),
            }),
        }
    }

    fn utf8(&self, raw: Vec<u8>, what: &str) -> ArchiveResult<String> {
        String::from_utf8(raw).map_err(|_| ArchiveError::Parse {
            group: self.path.label(),
            message: format!("{what} is not valid UTF-8"),
        })
    }

    /// Consume a record header and check both tag and name.
    fn expect_record(&mut self, tag: u8, name: &str) -> ArchiveResult<()> {
        let start = self.pos;
        let [found_tag] = self.take::<1>("a record tag").map_err(|_| {
            ArchiveError::MissingField {
                field: name.to_string(),
                group: self.path.label(),
            }
        })?;
        if found_tag == TAG_END || found_tag == TAG_ITEM {
            self.pos = start;
            return Err(ArchiveError::MissingField {
                field: name.to_string(),
                group: self.path.label(),
            });
        }
        let len = u16::from_le_bytes(self.take::<2>("a name length")?) as usize;
        let raw = self.take_slice(len, "a name")?.to_vec();
        let found = self.utf8(raw, "a name")?;
        if found != name {
            return Err(ArchiveError::UnexpectedField {
                expected: name.to_string(),
                found,
                group: self.path.label(),
            });
        }
        if found_tag != tag {
            return Err(ArchiveError::TypeMismatch {
                field: name.to_string(),
                group: self.path.label(),
                expected: tag_label(tag),
            });
        }
        Ok(())
    }

    fn count(&mut self, name: &str) -> ArchiveResult<usize> {
        let n = u64::from_le_bytes(self.take::<8>(name)?);
        usize::try_from(n).map_err(|_| ArchiveError::Parse {
            group: self.path.label(),
            message: format!("array '{name}' is too long for this platform"),
        })
    }
}

impl ArchiveReader for BinaryReader {
    fn read_int(&mut self, name: &str) -> ArchiveResult<i64> {
        self.expect_record(TAG_INT, name)?;
        Ok(i64::from_le_bytes(self.take::<8>(name)?))
    }

    fn read_float(&mut self, name: &str) -> ArchiveResult<f64> {
        self.expect_record(TAG_FLOAT, name)?;
        Ok(f64::from_le_bytes(self.take::<8>(name)?))
    }

    fn read_string(&mut self, name: &str) -> ArchiveResult<String> {
        self.expect_record(TAG_STRING, name)?;
        let len = u32::from_le_bytes(self.take::<4>(name)?) as usize;
        let raw = self.take_slice(len, name)?.to_vec();
        self.utf8(raw, name)
    }

    fn read_float_array(&mut self, name: &str) -> ArchiveResult<Vec<f64>> {
        self.expect_record(TAG_FLOAT_ARRAY, name)?;
        let n = self.count(name)?;
        let mut values = Vec::with_capacity(n.min(1 << 20));
        for _ in 0..n {
            values.push(f64::from_le_bytes(self.take::<8>(name)?));
        }
        Ok(values)
    }

    fn read_int_array(&mut self, name: &str) -> ArchiveResult<Vec<i64>> {
        self.expect_record(TAG_INT_ARRAY, name)?;
        let n = self.count(name)?;
        let mut values = Vec::with_capacity(n.min(1 << 20));
        for _ in 0..n {
            values.push(i64::from_le_bytes(self.take::<8>(name)?));
        }
        Ok(values)
    }

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()> {
        self.expect_record(TAG_GROUP, name)?;
        self.path.push(name);
        Ok(())
    }

    fn next_item(&mut self) -> ArchiveResult<bool> {
        if self.bytes.get(self.pos) == Some(&TAG_ITEM) {
            self.pos += 1;
            self.path.push_item();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn end_group(&mut self) -> ArchiveResult<()> {
        let [tag] = self.take::<1>("a group end")?;
        if tag != TAG_END {
            return Err(ArchiveError::Parse {
                group: self.path.label(),
                message: format!("expected end of group but found {}", tag_label(tag)),
            });
        }
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
