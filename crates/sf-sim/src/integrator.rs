//! Strong-stability-preserving Runge-Kutta integrators.
//!
//! Each scheme is a convex combination of forward-Euler steps supplied by
//! the physics module, so only [`Physics::advance`] and [`Physics::blend`]
//! are needed.

use crate::error::{SimError, SimResult};
use crate::physics::Physics;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance `state` by `dt`.
    fn step<P: Physics>(&self, physics: &P, state: &P::State, dt: f64) -> P::State;
}

/// Forward Euler (1st order, one advance per step).
#[derive(Clone, Copy, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<P: Physics>(&self, physics: &P, state: &P::State, dt: f64) -> P::State {
        physics.advance(state, dt)
    }
}

/// Two-stage SSP-RK2 (Heun form).
#[derive(Clone, Copy, Debug)]
pub struct SspRk2;

impl Integrator for SspRk2 {
    fn step<P: Physics>(&self, physics: &P, state: &P::State, dt: f64) -> P::State {
        let s1 = physics.advance(state, dt);
        let s2 = physics.advance(&s1, dt);
        physics.blend(state, &s2, 0.5)
    }
}

/// Three-stage SSP-RK3 (Shu-Osher).
#[derive(Clone, Copy, Debug)]
pub struct SspRk3;

impl Integrator for SspRk3 {
    fn step<P: Physics>(&self, physics: &P, state: &P::State, dt: f64) -> P::State {
        let s1 = physics.advance(state, dt);
        let s2 = physics.advance(&s1, dt);
        let s3 = physics.advance(&physics.blend(state, &s2, 0.25), dt);
        physics.blend(state, &s3, 2.0 / 3.0)
    }
}

/// Integrator selection by order of accuracy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    ForwardEuler,
    #[default]
    SspRk2,
    SspRk3,
}

impl IntegratorType {
    /// Select the scheme of the given order (1, 2 or 3).
    pub fn from_order(order: u32) -> SimResult<Self> {
        match order {
            1 => Ok(IntegratorType::ForwardEuler),
            2 => Ok(IntegratorType::SspRk2),
            3 => Ok(IntegratorType::SspRk3),
            other => Err(SimError::config(
                "rk_order",
                format!("must be 1, 2 or 3 (got {other})"),
            )),
        }
    }

    pub fn order(self) -> u32 {
        match self {
            IntegratorType::ForwardEuler => 1,
            IntegratorType::SspRk2 => 2,
            IntegratorType::SspRk3 => 3,
        }
    }
}

impl Integrator for IntegratorType {
    fn step<P: Physics>(&self, physics: &P, state: &P::State, dt: f64) -> P::State {
        match self {
            IntegratorType::ForwardEuler => ForwardEuler.step(physics, state, dt),
            IntegratorType::SspRk2 => SspRk2.step(physics, state, dt),
            IntegratorType::SspRk3 => SspRk3.step(physics, state, dt),
        }
    }
}
