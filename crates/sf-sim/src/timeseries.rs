//! Columnar accumulator for scalar reductions sampled during a run.

use sf_archive::{ArchiveReader, ArchiveResult, ArchiveWriter, Persist};

/// One named column of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Ordered set of named columns, one appended value per sample.
///
/// Columns appear in first-seen order. A name that shows up late starts a
/// shorter column; nothing is back-filled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeseries {
    columns: Vec<Column>,
}

impl Timeseries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append each `(name, value)` pair to its column, creating columns as needed.
    pub fn accumulate(&mut self, sample: &[(String, f64)]) {
        for (name, value) in sample {
            match self.columns.iter_mut().find(|c| &c.name == name) {
                Some(column) => column.values.push(*value),
                None => self.columns.push(Column {
                    name: name.clone(),
                    values: vec![*value],
                }),
            }
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Length of the longest column.
    pub fn rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }
}

impl Persist for Column {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_string("name", &self.name)?;
        ar.write_float_array("values", &self.values)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            name: ar.read_string("name")?,
            values: ar.read_float_array("values")?,
        })
    }
}

/// Columns are stored as anonymous items of the current group.
impl Persist for Timeseries {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        for column in &self.columns {
            ar.begin_item()?;
            column.write_to(ar)?;
            ar.end_group()?;
        }
        Ok(())
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        let mut columns = Vec::new();
        while ar.next_item()? {
            columns.push(Column::read_from(ar)?);
            ar.end_group()?;
        }
        Ok(Self { columns })
    }
}
