//! 1D linear advection, du/dt + v du/dx = 0, on a periodic domain.
//!
//! Finite-volume discretization with `num_zones` equal cells and
//! first-order upwind fluxes. The initial condition is one period of a
//! sine wave, so the exact solution is a pure translation.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use sf_archive::{ArchiveReader, ArchiveResult, ArchiveWriter, Persist};
use sf_core::ensure_positive;
use sf_sim::{Physics, Sample, SimError, SimResult, TimeKind};

use crate::flux::upwind_flux;

/// Physics configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advection1d {
    pub num_zones: usize,
    pub domain_length: f64,
    #[serde(alias = "advection_velocity")]
    pub velocity: f64,
}

impl Default for Advection1d {
    fn default() -> Self {
        Self {
            num_zones: 200,
            domain_length: 1.0,
            velocity: 1.0,
        }
    }
}

impl Advection1d {
    pub fn dx(&self) -> f64 {
        self.domain_length / self.num_zones as f64
    }

    /// Cell-centre coordinates.
    pub fn cell_centers(&self) -> impl Iterator<Item = f64> + '_ {
        let dx = self.dx();
        (0..self.num_zones).map(move |i| (i as f64 + 0.5) * dx)
    }
}

/// Cell averages plus simulation time.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvectionState {
    pub conserved: Vec<f64>,
    pub time: f64,
}

/// Diagnostics derived from a state.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvectionProduct {
    pub primitive: Vec<f64>,
    pub total_mass: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl Physics for Advection1d {
    type State = AdvectionState;
    type Product = AdvectionProduct;

    fn initial_state(&self) -> AdvectionState {
        let conserved = self
            .cell_centers()
            .map(|x| (2.0 * PI * x / self.domain_length).sin())
            .collect();
        AdvectionState {
            conserved,
            time: 0.0,
        }
    }

    fn advance(&self, state: &AdvectionState, dt: f64) -> AdvectionState {
        let u = &state.conserved;
        let n = u.len();
        let ratio = dt / self.dx();
        let conserved = (0..n)
            .map(|i| {
                let west = u[(i + n - 1) % n];
                let east = u[(i + 1) % n];
                let flux_left = upwind_flux(west, u[i], self.velocity);
                let flux_right = upwind_flux(u[i], east, self.velocity);
                u[i] - ratio * (flux_right - flux_left)
            })
            .collect();
        AdvectionState {
            conserved,
            time: state.time + dt,
        }
    }

    fn stability_estimate(&self, _: &AdvectionState) -> f64 {
        self.dx() / self.velocity.abs()
    }

    fn blend(&self, a: &AdvectionState, b: &AdvectionState, alpha: f64) -> AdvectionState {
        AdvectionState {
            conserved: a
                .conserved
                .iter()
                .zip(&b.conserved)
                .map(|(ua, ub)| (1.0 - alpha) * ua + alpha * ub)
                .collect(),
            time: (1.0 - alpha) * a.time + alpha * b.time,
        }
    }

    fn derived_quantities(&self, state: &AdvectionState) -> AdvectionProduct {
        let dx = self.dx();
        let u = &state.conserved;
        AdvectionProduct {
            primitive: u.clone(),
            total_mass: u.iter().map(|v| v * dx).sum(),
            min_value: u.iter().copied().fold(f64::INFINITY, f64::min),
            max_value: u.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    fn time_coordinate(&self, state: &AdvectionState, kind: TimeKind) -> SimResult<f64> {
        match kind {
            0 => Ok(state.time),
            kind => Err(SimError::TimeKindOutOfRange { kind }),
        }
    }

    fn zone_count(&self, state: &AdvectionState) -> usize {
        state.conserved.len()
    }

    fn sample(&self, state: &AdvectionState) -> Sample {
        let product = self.derived_quantities(state);
        vec![
            ("time".to_string(), state.time),
            ("total_mass".to_string(), product.total_mass),
            ("min_value".to_string(), product.min_value),
            ("max_value".to_string(), product.max_value),
        ]
    }

    fn validate(&self) -> SimResult<()> {
        if self.num_zones == 0 {
            return Err(SimError::config("physics.num_zones", "must be at least 1"));
        }
        ensure_positive(self.domain_length, "domain_length")
            .map_err(|e| SimError::config("physics.domain_length", e.to_string()))?;
        if !self.velocity.is_finite() || self.velocity == 0.0 {
            return Err(SimError::config(
                "physics.velocity",
                format!("must be finite and non-zero (got {})", self.velocity),
            ));
        }
        Ok(())
    }

    fn validate_state(&self, state: &AdvectionState) -> SimResult<()> {
        if state.conserved.len() != self.num_zones {
            return Err(SimError::config(
                "physics.num_zones",
                format!(
                    "restored state has {} zones but {} are configured",
                    state.conserved.len(),
                    self.num_zones
                ),
            ));
        }
        Ok(())
    }
}

impl Persist for AdvectionState {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_float_array("conserved", &self.conserved)?;
        ar.write_float("time", self.time)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            conserved: ar.read_float_array("conserved")?,
            time: ar.read_float("time")?,
        })
    }
}

impl Persist for AdvectionProduct {
    fn write_to(&self, ar: &mut dyn ArchiveWriter) -> ArchiveResult<()> {
        ar.write_float_array("primitive", &self.primitive)?;
        ar.write_float("total_mass", self.total_mass)?;
        ar.write_float("min_value", self.min_value)?;
        ar.write_float("max_value", self.max_value)
    }

    fn read_from(ar: &mut dyn ArchiveReader) -> ArchiveResult<Self> {
        Ok(Self {
            primitive: ar.read_float_array("primitive")?,
            total_mass: ar.read_float("total_mass")?,
            min_value: ar.read_float("min_value")?,
            max_value: ar.read_float("max_value")?,
        })
    }
}
