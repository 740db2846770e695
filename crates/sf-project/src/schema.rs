//! Project file schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sf_sim::{DriverConfig, RunConfig};

pub const LATEST_VERSION: u32 = 1;

/// A run description as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project<P> {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub driver: DriverConfig,
    pub physics: P,
    #[serde(default)]
    pub output: OutputDef,
}

/// Where and how run outputs are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputDef {
    pub directory: PathBuf,
    /// Archive format name: `text`, `binary` or `json`.
    pub format: String,
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            format: "text".to_string(),
        }
    }
}

impl<P> Project<P> {
    pub fn new(name: impl Into<String>, physics: P) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            driver: DriverConfig::default(),
            physics,
            output: OutputDef::default(),
        }
    }
}

impl<P: Clone> Project<P> {
    /// Driver and physics settings, as consumed by the run loop.
    pub fn run_config(&self) -> RunConfig<P> {
        RunConfig {
            driver: self.driver.clone(),
            physics: self.physics.clone(),
        }
    }
}
