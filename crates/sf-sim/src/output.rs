//! Output sinks: where the channel callbacks send their results.

use crate::error::SimResult;
use crate::physics::Physics;
use crate::state::DriverState;
use crate::timeseries::Timeseries;

/// Destination for everything the scheduled channels produce.
///
/// `number` is the channel's own emission counter, not the iteration.
pub trait OutputSink<P: Physics> {
    /// One iteration message line.
    fn message(&mut self, line: &str) -> SimResult<()>;

    /// A restartable snapshot: physics state plus driver state.
    fn checkpoint(&mut self, number: u64, state: &P::State, driver: &DriverState)
    -> SimResult<()>;

    fn product(&mut self, number: u64, state: &P::State, product: &P::Product) -> SimResult<()>;

    /// The whole accumulated timeseries, replacing any earlier copy.
    fn timeseries(&mut self, data: &Timeseries) -> SimResult<()>;
}

/// Prints message lines on stdout and discards everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl<P: Physics> OutputSink<P> for ConsoleSink {
    fn message(&mut self, line: &str) -> SimResult<()> {
        println!("{line}");
        Ok(())
    }

    fn checkpoint(&mut self, _: u64, _: &P::State, _: &DriverState) -> SimResult<()> {
        Ok(())
    }

    fn product(&mut self, _: u64, _: &P::State, _: &P::Product) -> SimResult<()> {
        Ok(())
    }

    fn timeseries(&mut self, _: &Timeseries) -> SimResult<()> {
        Ok(())
    }
}

/// Keeps every output in memory.
pub struct MemorySink<P: Physics> {
    pub messages: Vec<String>,
    pub checkpoints: Vec<(u64, P::State, DriverState)>,
    pub products: Vec<(u64, P::State)>,
    pub timeseries: Option<Timeseries>,
    /// Row count of the timeseries at each flush.
    pub timeseries_flushes: Vec<usize>,
}

impl<P: Physics> Default for MemorySink<P> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            checkpoints: Vec::new(),
            products: Vec::new(),
            timeseries: None,
            timeseries_flushes: Vec::new(),
        }
    }
}

impl<P: Physics> MemorySink<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing has been emitted on any channel.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.checkpoints.is_empty()
            && self.products.is_empty()
            && self.timeseries_flushes.is_empty()
    }
}

impl<P: Physics> OutputSink<P> for MemorySink<P> {
    fn message(&mut self, line: &str) -> SimResult<()> {
        self.messages.push(line.to_string());
        Ok(())
    }

    fn checkpoint(
        &mut self,
        number: u64,
        state: &P::State,
        driver: &DriverState,
    ) -> SimResult<()> {
        self.checkpoints.push((number, state.clone(), driver.clone()));
        Ok(())
    }

    fn product(&mut self, number: u64, state: &P::State, _: &P::Product) -> SimResult<()> {
        self.products.push((number, state.clone()));
        Ok(())
    }

    fn timeseries(&mut self, data: &Timeseries) -> SimResult<()> {
        self.timeseries = Some(data.clone());
        self.timeseries_flushes.push(data.rows());
        Ok(())
    }
}
