//! Scheduled output channels.
//!
//! The four channels share one shape: an immutable [`ScheduleSpec`], a
//! mutable [`ChannelClock`](crate::state::ChannelClock) kept in the driver
//! state, and a callback. [`ScheduledOutput`] is that shape; the run loop
//! holds four of them in a fixed evaluation order.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::output::OutputSink;
use crate::physics::{Physics, TimeKind};
use crate::state::{DriverState, SessionState};

/// Output channel identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Message,
    Checkpoint,
    Product,
    Timeseries,
}

impl Channel {
    /// Storage order of the channel clocks.
    pub const ALL: [Channel; 4] = [
        Channel::Message,
        Channel::Checkpoint,
        Channel::Product,
        Channel::Timeseries,
    ];

    /// Per-iteration evaluation order. Checkpoints come last so a checkpoint
    /// holds the complete end-of-iteration driver state.
    pub const EVALUATION_ORDER: [Channel; 4] = [
        Channel::Message,
        Channel::Product,
        Channel::Timeseries,
        Channel::Checkpoint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Message => "message",
            Channel::Checkpoint => "checkpoint",
            Channel::Product => "product",
            Channel::Timeseries => "timeseries",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Message => 0,
            Channel::Checkpoint => 1,
            Channel::Product => 2,
            Channel::Timeseries => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When a channel fires relative to its scheduled time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Fire on the first post-step state at or past the scheduled time.
    #[default]
    Nearest,
    /// Fire on a state interpolated to exactly the scheduled time.
    Exact,
}

/// Immutable cadence of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub interval: f64,
    #[serde(default)]
    pub time_kind: TimeKind,
    #[serde(default)]
    pub policy: Policy,
}

impl ScheduleSpec {
    pub fn nearest(interval: f64) -> Self {
        Self {
            interval,
            time_kind: 0,
            policy: Policy::Nearest,
        }
    }

    pub fn exact(interval: f64) -> Self {
        Self {
            interval,
            time_kind: 0,
            policy: Policy::Exact,
        }
    }

    pub fn with_time_kind(mut self, time_kind: TimeKind) -> Self {
        self.time_kind = time_kind;
        self
    }

    /// Check the cadence of `channel`. Error parameters are named `<channel>.<field>`.
    pub fn validate(&self, channel: Channel) -> SimResult<()> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(SimError::config(
                format!("{channel}.interval"),
                format!("must be positive and finite (got {})", self.interval),
            ));
        }
        if self.policy == Policy::Exact && self.time_kind != 0 {
            return Err(SimError::config(
                format!("{channel}.time_kind"),
                format!(
                    "exact policy requires time_kind 0 (got {})",
                    self.time_kind
                ),
            ));
        }
        Ok(())
    }
}

/// Everything a channel callback may touch while it runs.
pub struct OutputContext<'a, P: Physics> {
    pub physics: &'a P,
    pub driver: &'a mut DriverState,
    pub session: &'a mut SessionState,
    pub sink: &'a mut dyn OutputSink<P>,
}

/// Side effect performed when a channel fires.
pub type OutputAction<'a, P> =
    Box<dyn FnMut(&mut OutputContext<'_, P>, &<P as Physics>::State) -> SimResult<()> + 'a>;

/// One output channel: cadence plus callback.
///
/// The channel's counter and next scheduled time live in the driver state so
/// they are checkpointed with it.
pub struct ScheduledOutput<'a, P: Physics> {
    channel: Channel,
    spec: ScheduleSpec,
    action: OutputAction<'a, P>,
}

impl<'a, P: Physics> ScheduledOutput<'a, P> {
    pub fn new(channel: Channel, spec: ScheduleSpec, action: OutputAction<'a, P>) -> Self {
        Self {
            channel,
            spec,
            action,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn spec(&self) -> &ScheduleSpec {
        &self.spec
    }

    /// Fire if the scheduled time falls inside the step `(t0, t1]`.
    ///
    /// The callback receives `state` advanced by exactly `next_time - t0`;
    /// the interpolated state is dropped afterwards. Returns whether the
    /// channel fired.
    pub fn fire_exact<I: Integrator>(
        &mut self,
        ctx: &mut OutputContext<'_, P>,
        integrator: &I,
        t0: f64,
        t1: f64,
        state: &P::State,
    ) -> SimResult<bool> {
        if self.spec.policy != Policy::Exact {
            return Ok(false);
        }
        let target = ctx.driver.clock(self.channel).next_time;
        if !(t0 < target && target <= t1) {
            return Ok(false);
        }
        let interpolated = integrator.step(ctx.physics, state, target - t0);
        let count = ctx.driver.clock_mut(self.channel).fire(self.spec.interval);
        debug!(channel = %self.channel, count, time = target, "exact output");
        (self.action)(ctx, &interpolated)?;
        Ok(true)
    }

    /// Fire if the post-step `state` has reached the scheduled time.
    ///
    /// At most one firing per call, however far the step overshot.
    pub fn fire_nearest(
        &mut self,
        ctx: &mut OutputContext<'_, P>,
        state: &P::State,
    ) -> SimResult<bool> {
        if self.spec.policy != Policy::Nearest {
            return Ok(false);
        }
        let time = ctx.physics.time_coordinate(state, self.spec.time_kind)?;
        if time < ctx.driver.clock(self.channel).next_time {
            return Ok(false);
        }
        let count = ctx.driver.clock_mut(self.channel).fire(self.spec.interval);
        debug!(channel = %self.channel, count, time, "nearest output");
        (self.action)(ctx, state)?;
        Ok(true)
    }

    /// Run the callback without consulting or advancing the clock.
    pub fn fire_unconditionally(
        &mut self,
        ctx: &mut OutputContext<'_, P>,
        state: &P::State,
    ) -> SimResult<()> {
        debug!(channel = %self.channel, "initial output");
        (self.action)(ctx, state)
    }
}
