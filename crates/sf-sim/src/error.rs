//! Error types for driver operations.

use sf_archive::ArchiveError;
use thiserror::Error;

use crate::schedule::Channel;
use crate::physics::TimeKind;

/// Errors encountered while configuring or running the driver.
#[derive(Error, Debug)]
pub enum SimError {
    /// Rejected configuration; `param` names the offending setting.
    #[error("Invalid configuration: {param}: {reason}")]
    Config { param: String, reason: String },

    #[error("Time kind {kind} is not supported by this physics module")]
    TimeKindOutOfRange { kind: TimeKind },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: String },

    #[error("{channel} output failed: {message}")]
    Output { channel: Channel, message: String },

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn config(param: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::Config {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

impl From<sf_core::SfError> for SimError {
    fn from(e: sf_core::SfError) -> Self {
        SimError::NonPhysical {
            what: e.to_string(),
        }
    }
}
