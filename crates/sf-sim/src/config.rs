//! Driver configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimError, SimResult};
use crate::integrator::IntegratorType;
use crate::schedule::{Channel, Policy, ScheduleSpec};

/// Stepping and output settings shared by every physics module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Runge-Kutta order: 1, 2 or 3.
    pub rk_order: u32,
    /// Safety factor applied to the physics stability estimate.
    pub cfl: f64,
    pub t_final: f64,
    /// Iteration cap. `None` or `Some(0)` means unlimited.
    pub max_iter: Option<u64>,
    pub message: ScheduleSpec,
    pub checkpoint: ScheduleSpec,
    pub product: ScheduleSpec,
    pub timeseries: ScheduleSpec,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rk_order: 2,
            cfl: 0.4,
            t_final: 1.0,
            max_iter: None,
            message: ScheduleSpec::nearest(0.1),
            checkpoint: ScheduleSpec::nearest(1.0),
            product: ScheduleSpec::exact(0.1),
            timeseries: ScheduleSpec::exact(0.01),
        }
    }
}

impl DriverConfig {
    pub fn schedule(&self, channel: Channel) -> ScheduleSpec {
        match channel {
            Channel::Message => self.message,
            Channel::Checkpoint => self.checkpoint,
            Channel::Product => self.product,
            Channel::Timeseries => self.timeseries,
        }
    }

    pub fn integrator(&self) -> SimResult<IntegratorType> {
        IntegratorType::from_order(self.rk_order)
    }

    /// Effective iteration cap, if any.
    pub fn iteration_cap(&self) -> Option<u64> {
        self.max_iter.filter(|&cap| cap > 0)
    }

    /// Reject settings the run loop cannot honour.
    ///
    /// An exact checkpoint channel is accepted with a warning: it saves an
    /// interpolated state mid-iteration, so resuming from it does not
    /// reproduce the uninterrupted run.
    pub fn validate(&self) -> SimResult<()> {
        self.integrator()?;
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(SimError::config(
                "cfl",
                format!("must be positive and finite (got {})", self.cfl),
            ));
        }
        if !self.t_final.is_finite() {
            return Err(SimError::config(
                "t_final",
                format!("must be finite (got {})", self.t_final),
            ));
        }
        for channel in Channel::ALL {
            self.schedule(channel).validate(channel)?;
        }
        if self.checkpoint.policy == Policy::Exact {
            warn!(
                interval = self.checkpoint.interval,
                "exact checkpoints hold interpolated states; restarts from them diverge"
            );
        }
        Ok(())
    }
}

/// Driver settings plus the physics module's own configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig<P> {
    #[serde(default)]
    pub driver: DriverConfig,
    pub physics: P,
}

impl<P> RunConfig<P> {
    pub fn new(physics: P) -> Self {
        Self {
            driver: DriverConfig::default(),
            physics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Policy;

    #[test]
    fn defaults_are_valid() {
        let config = DriverConfig::default();
        config.validate().unwrap();
        assert_eq!(config.integrator().unwrap(), IntegratorType::SspRk2);
        assert_eq!(config.checkpoint.policy, Policy::Nearest);
        assert_eq!(config.timeseries.policy, Policy::Exact);
    }

    #[test]
    fn zero_cap_means_unlimited() {
        let mut config = DriverConfig::default();
        assert_eq!(config.iteration_cap(), None);
        config.max_iter = Some(0);
        assert_eq!(config.iteration_cap(), None);
        config.max_iter = Some(5);
        assert_eq!(config.iteration_cap(), Some(5));
    }

    #[test]
    fn rejects_bad_order_and_cfl() {
        let config = DriverConfig {
            rk_order: 4,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("rk_order"));

        let config = DriverConfig {
            cfl: 0.0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("cfl"));
    }

    #[test]
    fn rejects_exact_on_auxiliary_clock() {
        let config = DriverConfig {
            timeseries: ScheduleSpec::exact(0.1).with_time_kind(2),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::Config { ref param, .. } if param == "timeseries.time_kind"
        ));
    }

    #[test]
    fn exact_checkpoints_are_accepted() {
        let config = DriverConfig {
            checkpoint: ScheduleSpec::exact(0.25),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DriverConfig =
            serde_json::from_str(r#"{"rk_order": 3, "checkpoint": {"interval": 0.25}}"#).unwrap();
        assert_eq!(config.rk_order, 3);
        assert_eq!(config.checkpoint, ScheduleSpec::nearest(0.25));
        assert_eq!(config.cfl, 0.4);
        assert_eq!(config.product, ScheduleSpec::exact(0.1));
    }
}
