//! sf-sim: time-stepping driver for hyperbolic solvers.
//!
//! Provides:
//! - Physics trait for pluggable solvers
//! - SSP Runge-Kutta integrators of order 1 to 3
//! - Scheduled output channels (message, checkpoint, product, timeseries)
//!   with nearest and exact firing policies
//! - Restartable driver state and the run loop

pub mod config;
pub mod error;
pub mod integrator;
pub mod message;
pub mod output;
pub mod physics;
pub mod schedule;
pub mod sim;
pub mod state;
pub mod timeseries;

pub use config::{DriverConfig, RunConfig};
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorType, SspRk2, SspRk3};
pub use output::{ConsoleSink, MemorySink, OutputSink};
pub use physics::{Physics, Sample, TimeKind};
pub use schedule::{Channel, OutputContext, Policy, ScheduleSpec, ScheduledOutput};
pub use sim::{run, run_fresh};
pub use state::{ChannelClock, DriverState, SessionState};
pub use timeseries::{Column, Timeseries};
