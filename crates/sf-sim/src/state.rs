//! Persistent and session-local driver bookkeeping.

use sf_archive::{ArchiveReader, ArchiveResult, ArchiveWriter, Persist, read_group, write_group};
use sf_core::Stopwatch;

use crate::config::DriverConfig;
use crate::schedule::Channel;
use crate::timeseries::Timeseries;

/// Firing counter and next scheduled time of one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelClock {
    pub count: u64,
    pub next_time: f64,
}

impl ChannelClock {
    /// Record a firing: bump the count and move the schedule one interval on.
    /// Returns the new count.
    pub fn fire(&mut self, interval: f64) -> u64 {
        self.count += 1;
        self.next_time += interval;
        self.count
    }
}

impl Persist for ChannelClock {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_int("count", self.count as i64)?;
        ar.write_float("next_time", self.next_time)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            count: ar.read_count("count")?,
            next_time: ar.read_float("next_time")?,
        })
    }
}

/// Everything the driver needs to resume a run, besides the physics state.
///
/// Checkpointed together with the physics state; a restored `DriverState`
/// continues the run exactly where it left off.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverState {
    /// Completed steps. Zero means the run has not started.
    pub iteration: u64,
    clocks: [ChannelClock; 4],
    pub timeseries: Timeseries,
}

impl DriverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self) -> bool {
        self.iteration == 0
    }

    pub fn clock(&self, channel: Channel) -> &ChannelClock {
        &self.clocks[channel.index()]
    }

    pub fn clock_mut(&mut self, channel: Channel) -> &mut ChannelClock {
        &mut self.clocks[channel.index()]
    }

    /// Schedule every channel's first firing one interval after the start.
    pub fn arm(&mut self, config: &DriverConfig) {
        for channel in Channel::ALL {
            self.clock_mut(channel).next_time = config.schedule(channel).interval;
        }
    }
}

impl Persist for DriverState {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_int("iteration", self.iteration as i64)?;
        for channel in Channel::ALL {
            write_group(ar, channel.name(), self.clock(channel))?;
        }
        write_group(ar, "samples", &self.timeseries)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        let mut driver = DriverState {
            iteration: ar.read_count("iteration")?,
            ..Default::default()
        };
        for channel in Channel::ALL {
            *driver.clock_mut(channel) = read_group(ar, channel.name())?;
        }
        driver.timeseries = read_group(ar, "samples")?;
        Ok(driver)
    }
}

/// Per-process bookkeeping for throughput reporting. Never persisted.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub stopwatch: Stopwatch,
    /// Iteration at the last message line.
    pub last_message_iteration: u64,
}

impl SessionState {
    pub fn start(iteration: u64) -> Self {
        Self {
            stopwatch: Stopwatch::start(),
            last_message_iteration: iteration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_archive::json::{JsonReader, JsonWriter};
    use sf_archive::text::{TextReader, TextWriter};

    fn populated() -> DriverState {
        let mut driver = DriverState::new();
        driver.iteration = 42;
        driver.arm(&DriverConfig::default());
        driver.clock_mut(Channel::Checkpoint).fire(1.0);
        driver.clock_mut(Channel::Product).fire(0.1);
        driver
            .timeseries
            .accumulate(&[("time".to_string(), 0.0), ("mass".to_string(), 1.5)]);
        driver
    }

    #[test]
    fn arm_sets_first_firing_one_interval_out() {
        let config = DriverConfig::default();
        let mut driver = DriverState::new();
        driver.arm(&config);
        for channel in Channel::ALL {
            assert_eq!(
                driver.clock(channel).next_time,
                config.schedule(channel).interval
            );
            assert_eq!(driver.clock(channel).count, 0);
        }
    }

    #[test]
    fn fire_advances_by_one_interval() {
        let mut clock = ChannelClock {
            count: 0,
            next_time: 0.5,
        };
        assert_eq!(clock.fire(0.5), 1);
        assert_eq!(clock.next_time, 1.0);
    }

    #[test]
    fn survives_text_archive() {
        let driver = populated();
        let mut writer = TextWriter::new(Vec::new());
        write_group(&mut writer, "driver_state", &driver).unwrap();
        writer.finish().unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        let mut reader = TextReader::new(&text);
        let restored: DriverState = read_group(&mut reader, "driver_state").unwrap();
        assert_eq!(restored, driver);
    }

    #[test]
    fn survives_json_archive() {
        let driver = populated();
        let mut writer = JsonWriter::new(Vec::new());
        write_group(&mut writer, "driver_state", &driver).unwrap();
        writer.finish().unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        let mut reader = JsonReader::new(&text).unwrap();
        let restored: DriverState = read_group(&mut reader, "driver_state").unwrap();
        assert_eq!(restored, driver);
    }
}
