//! Test physics shared by the run-loop tests.

#![allow(dead_code)]

use sf_sim::{DriverConfig, Physics, RunConfig, Sample, ScheduleSpec, SimError, SimResult, TimeKind};

/// dx/dt = -rate * x with a fixed step size and optional auxiliary clocks.
///
/// Auxiliary kind `k` reads `(k + 1) * t`.
#[derive(Clone, Debug, PartialEq)]
pub struct Relaxation {
    pub dt: f64,
    pub rate: f64,
    pub aux_kinds: TimeKind,
    pub zones: usize,
}

impl Default for Relaxation {
    fn default() -> Self {
        Self {
            dt: 0.03,
            rate: 1.0,
            aux_kinds: 0,
            zones: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationState {
    pub t: f64,
    pub x: f64,
}

impl Physics for Relaxation {
    type State = RelaxationState;
    type Product = f64;

    fn initial_state(&self) -> RelaxationState {
        RelaxationState { t: 0.0, x: 1.0 }
    }

    fn advance(&self, s: &RelaxationState, dt: f64) -> RelaxationState {
        RelaxationState {
            t: s.t + dt,
            x: s.x - dt * self.rate * s.x,
        }
    }

    fn stability_estimate(&self, _: &RelaxationState) -> f64 {
        self.dt
    }

    fn blend(&self, a: &RelaxationState, b: &RelaxationState, alpha: f64) -> RelaxationState {
        RelaxationState {
            t: (1.0 - alpha) * a.t + alpha * b.t,
            x: (1.0 - alpha) * a.x + alpha * b.x,
        }
    }

    fn derived_quantities(&self, s: &RelaxationState) -> f64 {
        s.x * s.x
    }

    fn time_coordinate(&self, s: &RelaxationState, kind: TimeKind) -> SimResult<f64> {
        if kind <= self.aux_kinds {
            Ok(f64::from(kind + 1) * s.t)
        } else {
            Err(SimError::TimeKindOutOfRange { kind })
        }
    }

    fn zone_count(&self, _: &RelaxationState) -> usize {
        self.zones
    }

    fn sample(&self, s: &RelaxationState) -> Sample {
        vec![("time".to_string(), s.t), ("x".to_string(), s.x)]
    }
}

/// Unit CFL so every step is exactly `physics.dt`.
pub fn config(physics: Relaxation) -> RunConfig<Relaxation> {
    RunConfig {
        driver: DriverConfig {
            cfl: 1.0,
            t_final: 1.0,
            message: ScheduleSpec::nearest(0.25),
            checkpoint: ScheduleSpec::nearest(0.25),
            product: ScheduleSpec::exact(0.1),
            timeseries: ScheduleSpec::exact(0.05),
            ..Default::default()
        },
        physics,
    }
}
