//! Persisted record types.

use sf_archive::{ArchiveReader, ArchiveResult, ArchiveWriter, Persist, read_group, write_group};
use sf_sim::DriverState;

/// Everything needed to resume a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint<S> {
    /// Fingerprint of the configuration that wrote the checkpoint.
    pub config_hash: String,
    pub driver: DriverState,
    pub state: S,
}

impl<S: Persist> Persist for Checkpoint<S> {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        CheckpointRef {
            config_hash: &self.config_hash,
            driver: &self.driver,
            state: &self.state,
        }
        .write_to(ar)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            config_hash: ar.read_string("config_hash")?,
            driver: read_group(ar, "driver_state")?,
            state: read_group(ar, "state")?,
        })
    }
}

/// Borrowed form written by the output sink, avoiding a state clone.
pub(crate) struct CheckpointRef<'a, S> {
    pub config_hash: &'a str,
    pub driver: &'a DriverState,
    pub state: &'a S,
}

impl<S: Persist> CheckpointRef<'_, S> {
    pub fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_string("config_hash", self.config_hash)?;
        write_group(ar, "driver_state", self.driver)?;
        write_group(ar, "state", self.state)
    }
}
