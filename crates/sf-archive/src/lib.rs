//! sf-archive: hierarchical archives for checkpoints and products.
//!
//! An archive is a tree of named groups holding named scalars, strings and
//! numeric arrays. Groups may also hold repeatable anonymous items, used for
//! sequences of compound records. Three interchangeable formats implement
//! the same [`ArchiveWriter`] / [`ArchiveReader`] pair:
//!
//! - [`text`]: indented, human-readable
//! - [`binary`]: compact tagged records
//! - [`json`]: a `serde_json` object tree

pub mod binary;
pub mod error;
pub mod format;
pub mod json;
pub mod path;
pub mod text;

pub use error::{ArchiveError, ArchiveResult};
pub use format::Format;
pub use path::GroupPath;

/// Write side of the archive contract.
pub trait ArchiveWriter {
    fn write_int(&mut self, name: &str, value: i64) -> ArchiveResult<()>;

    fn write_float(&mut self, name: &str, value: f64) -> ArchiveResult<()>;

    fn write_string(&mut self, name: &str, value: &str) -> ArchiveResult<()>;

    fn write_float_array(&mut self, name: &str, values: &[f64]) -> ArchiveResult<()>;

    fn write_int_array(&mut self, name: &str, values: &[i64]) -> ArchiveResult<()>;

    /// Open a named group. Must be balanced by [`ArchiveWriter::end_group`].
    fn begin_group(&mut self, name: &str) -> ArchiveResult<()>;

    /// Open an anonymous item inside the current group.
    fn begin_item(&mut self) -> ArchiveResult<()>;

    fn end_group(&mut self) -> ArchiveResult<()>;

    /// Flush everything to the underlying sink. Fails if groups are still open.
    fn finish(&mut self) -> ArchiveResult<()>;
}

/// Read side of the archive contract.
///
/// Readers report failures with the field name and the `/`-joined group path
/// at which they occurred.
pub trait ArchiveReader {
    fn read_int(&mut self, name: &str) -> ArchiveResult<i64>;

    fn read_float(&mut self, name: &str) -> ArchiveResult<f64>;

    fn read_string(&mut self, name: &str) -> ArchiveResult<String>;

    fn read_float_array(&mut self, name: &str) -> ArchiveResult<Vec<f64>>;

    fn read_int_array(&mut self, name: &str) -> ArchiveResult<Vec<i64>>;

    fn begin_group(&mut self, name: &str) -> ArchiveResult<()>;

    /// Enter the next anonymous item of the current group.
    ///
    /// Returns `false` when the group holds no further items; nothing is
    /// consumed in that case.
    fn next_item(&mut self) -> ArchiveResult<bool>;

    fn end_group(&mut self) -> ArchiveResult<()>;

    /// Current group path, for diagnostics.
    fn group_path(&self) -> String;

    /// Read a float array that must hold exactly `len` values.
    fn read_float_array_exact(&mut self, name: &str, len: usize) -> ArchiveResult<Vec<f64>> {
        let values = self.read_float_array(name)?;
        if values.len() != len {
            return Err(ArchiveError::Length {
                field: name.to_string(),
                group: self.group_path(),
                expected: len,
                found: values.len(),
            });
        }
        Ok(values)
    }

    /// Read an integer field that must be non-negative.
    fn read_count(&mut self, name: &str) -> ArchiveResult<u64> {
        let value = self.read_int(name)?;
        u64::try_from(value).map_err(|_| ArchiveError::TypeMismatch {
            field: name.to_string(),
            group: self.group_path(),
            expected: "a non-negative integer",
        })
    }
}

/// Values that can be stored in and restored from an archive.
pub trait Persist: Sized {
    /// Write the fields of `self` into the current group.
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()>;

    /// Read the fields written by [`Persist::write_to`] from the current group.
    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self>;
}

/// Write `value` as a named group.
pub fn write_group<T: Persist>(
    ar: &mut dyn ArchiveWriter,
    name: &str,
    value: &T,
) -> ArchiveResult<()> {
    ar.begin_group(name)?;
    value.write_to(ar)?;
    ar.end_group()
}

/// Read a named group written by [`write_group`].
pub fn read_group<T: Persist>(ar: &mut dyn ArchiveReader, name: &str) -> ArchiveResult<T> {
    ar.begin_group(name)?;
    let value = T::read_from(ar)?;
    ar.end_group()?;
    Ok(value)
}

/// Write a sequence of compound records as anonymous items of a named group.
pub fn write_items<T: Persist>(
    ar: &mut dyn ArchiveWriter,
    name: &str,
    items: &[T],
) -> ArchiveResult<()> {
    ar.begin_group(name)?;
    for item in items {
        ar.begin_item()?;
        item.write_to(ar)?;
        ar.end_group()?;
    }
    ar.end_group()
}

/// Read a sequence written by [`write_items`].
pub fn read_items<T: Persist>(ar: &mut dyn ArchiveReader, name: &str) -> ArchiveResult<Vec<T>> {
    ar.begin_group(name)?;
    let mut items = Vec::new();
    while ar.next_item()? {
        items.push(T::read_from(ar)?);
        ar.end_group()?;
    }
    ar.end_group()?;
    Ok(items)
}
