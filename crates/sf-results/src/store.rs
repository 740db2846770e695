//! Output directory layout and the file-backed output sink.
//!
//! ```text
//! <root>/chkpt.0000.<ext>     checkpoint 0, 1, ...
//! <root>/prods.0000.<ext>     product 0, 1, ...
//! <root>/timeseries.<ext>     overwritten on every flush
//! ```

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sf_archive::{ArchiveResult, ArchiveWriter, Format, Persist, read_group, write_group};
use sf_sim::{DriverState, OutputSink, Physics, RunConfig, SimResult, Timeseries};
use tracing::{debug, info, warn};

use crate::hash::config_fingerprint;
use crate::types::{Checkpoint, CheckpointRef};
use crate::{ResultsError, ResultsResult};

const CHECKPOINT_PREFIX: &str = "chkpt";
const PRODUCT_PREFIX: &str = "prods";
const TIMESERIES_STEM: &str = "timeseries";

/// A directory of run outputs in one archive format.
#[derive(Clone, Debug)]
pub struct OutputDir {
    root_dir: PathBuf,
    format: Format,
}

impl OutputDir {
    pub fn new(root_dir: PathBuf, format: Format) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir, format })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn checkpoint_path(&self, number: u64) -> PathBuf {
        self.numbered(CHECKPOINT_PREFIX, number)
    }

    pub fn product_path(&self, number: u64) -> PathBuf {
        self.numbered(PRODUCT_PREFIX, number)
    }

    pub fn timeseries_path(&self) -> PathBuf {
        self.root_dir
            .join(format!("{TIMESERIES_STEM}.{}", self.format.extension()))
    }

    fn numbered(&self, prefix: &str, number: u64) -> PathBuf {
        self.root_dir
            .join(format!("{prefix}.{number:04}.{}", self.format.extension()))
    }

    /// Checkpoints in this directory's format, ordered by number.
    pub fn list_checkpoints(&self) -> ResultsResult<Vec<(u64, PathBuf)>> {
        let mut found = Vec::new();
        let suffix = format!(".{}", self.format.extension());
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(number) = name
                .strip_prefix(CHECKPOINT_PREFIX)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .and_then(|digits| digits.parse::<u64>().ok())
            {
                found.push((number, path));
            }
        }
        found.sort_by_key(|(number, _)| *number);
        Ok(found)
    }

    pub fn latest_checkpoint(&self) -> ResultsResult<Option<PathBuf>> {
        Ok(self.list_checkpoints()?.pop().map(|(_, path)| path))
    }
}

/// Create `path`, fill it through `body`, and finish the document.
fn write_document(
    path: &Path,
    format: Format,
    body: impl FnOnce(&mut dyn ArchiveWriter) -> ArchiveResult<()>,
) -> ArchiveResult<()> {
    let mut writer = format.create_writer(path)?;
    body(writer.as_mut())?;
    writer.finish()
}

fn format_of(path: &Path) -> ResultsResult<Format> {
    Format::from_path(path).ok_or_else(|| ResultsError::UnknownFormat {
        path: path.display().to_string(),
    })
}

/// Read a checkpoint; the format follows from the file extension.
pub fn load_checkpoint<S: Persist>(path: &Path) -> ResultsResult<Checkpoint<S>> {
    if !path.exists() {
        return Err(ResultsError::CheckpointNotFound {
            path: path.display().to_string(),
        });
    }
    let mut reader = format_of(path)?.open_reader(path)?;
    Ok(read_group(reader.as_mut(), "checkpoint")?)
}

pub fn load_product<T: Persist>(path: &Path) -> ResultsResult<T> {
    let mut reader = format_of(path)?.open_reader(path)?;
    Ok(read_group(reader.as_mut(), "products")?)
}

pub fn load_timeseries(path: &Path) -> ResultsResult<Timeseries> {
    let mut reader = format_of(path)?.open_reader(path)?;
    Ok(read_group(reader.as_mut(), "timeseries")?)
}

/// Continue a run from the checkpoint at `path`.
///
/// A checkpoint written under a different configuration is still resumed,
/// with a warning.
pub fn resume<P>(
    config: &RunConfig<P>,
    path: &Path,
    sink: &mut dyn OutputSink<P>,
) -> ResultsResult<(P::State, DriverState)>
where
    P: Physics + Serialize,
    P::State: Persist,
{
    let checkpoint: Checkpoint<P::State> = load_checkpoint(path)?;
    if checkpoint.config_hash != config_fingerprint(config)? {
        warn!(
            path = %path.display(),
            "checkpoint was written under a different configuration"
        );
    }
    info!(
        path = %path.display(),
        iteration = checkpoint.driver.iteration,
        "resuming from checkpoint"
    );
    let mut driver = checkpoint.driver;
    let state = sf_sim::run(config, &mut driver, Some(checkpoint.state), sink)?;
    Ok((state, driver))
}

/// Writes checkpoints, products and the timeseries into an [`OutputDir`].
///
/// Message lines go to stdout unless the sink is made quiet.
pub struct FileSink<P> {
    dir: OutputDir,
    config_hash: String,
    echo_messages: bool,
    _physics: PhantomData<fn() -> P>,
}

impl<P: Physics> FileSink<P> {
    pub fn new(dir: OutputDir, config_hash: String) -> Self {
        Self {
            dir,
            config_hash,
            echo_messages: true,
            _physics: PhantomData,
        }
    }

    /// Sink for `config`, stamping checkpoints with its fingerprint.
    pub fn for_config(dir: OutputDir, config: &RunConfig<P>) -> ResultsResult<Self>
    where
        P: Serialize,
    {
        Ok(Self::new(dir, config_fingerprint(config)?))
    }

    pub fn quiet(mut self) -> Self {
        self.echo_messages = false;
        self
    }

    pub fn dir(&self) -> &OutputDir {
        &self.dir
    }
}

impl<P> OutputSink<P> for FileSink<P>
where
    P: Physics,
    P::State: Persist,
    P::Product: Persist,
{
    fn message(&mut self, line: &str) -> SimResult<()> {
        if self.echo_messages {
            println!("{line}");
        }
        Ok(())
    }

    fn checkpoint(
        &mut self,
        number: u64,
        state: &P::State,
        driver: &DriverState,
    ) -> SimResult<()> {
        let path = self.dir.checkpoint_path(number);
        let record = CheckpointRef {
            config_hash: &self.config_hash,
            driver,
            state,
        };
        write_document(&path, self.dir.format, |ar| {
            ar.begin_group("checkpoint")?;
            record.write_to(ar)?;
            ar.end_group()
        })?;
        debug!(path = %path.display(), "wrote checkpoint");
        Ok(())
    }

    fn product(&mut self, number: u64, _: &P::State, product: &P::Product) -> SimResult<()> {
        let path = self.dir.product_path(number);
        write_document(&path, self.dir.format, |ar| {
            write_group(ar, "products", product)
        })?;
        debug!(path = %path.display(), "wrote products");
        Ok(())
    }

    fn timeseries(&mut self, data: &Timeseries) -> SimResult<()> {
        let path = self.dir.timeseries_path();
        write_document(&path, self.dir.format, |ar| {
            write_group(ar, "timeseries", data)
        })?;
        Ok(())
    }
}
