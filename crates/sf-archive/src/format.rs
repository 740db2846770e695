//! Archive format selection and file-backed factories.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use crate::binary::{BinaryReader, BinaryWriter};
use crate::json::{JsonReader, JsonWriter};
use crate::text::{TextReader, TextWriter};
use crate::{ArchiveError, ArchiveReader, ArchiveResult, ArchiveWriter};

/// On-disk archive format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Binary,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Text, Format::Binary, Format::Json];

    /// File extension used for documents in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Text => "txt",
            Format::Binary => "bin",
            Format::Json => "json",
        }
    }

    /// Guess the format of an existing file from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Create (or truncate) `path` and return a writer for it.
    ///
    /// Callers must call [`ArchiveWriter::finish`] once the document is complete.
    pub fn create_writer(self, path: &Path) -> ArchiveResult<Box<dyn ArchiveWriter>> {
        let out = BufWriter::new(File::create(path)?);
        Ok(match self {
            Format::Text => Box::new(TextWriter::new(out)),
            Format::Binary => Box::new(BinaryWriter::new(out)),
            Format::Json => Box::new(JsonWriter::new(out)),
        })
    }

    /// Read `path` fully and return a reader positioned at its top level.
    pub fn open_reader(self, path: &Path) -> ArchiveResult<Box<dyn ArchiveReader>> {
        Ok(match self {
            Format::Text => Box::new(TextReader::new(&fs::read_to_string(path)?)),
            Format::Binary => Box::new(BinaryReader::new(fs::read(path)?)?),
            Format::Json => Box::new(JsonReader::new(&fs::read_to_string(path)?)?),
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Text => "text",
            Format::Binary => "binary",
            Format::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Format::Text),
            "binary" | "bin" => Ok(Format::Binary),
            "json" => Ok(Format::Json),
            _ => Err(ArchiveError::UnknownFormat {
                name: s.to_string(),
            }),
        }
    }
}
