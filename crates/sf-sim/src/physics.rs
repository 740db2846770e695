//! Physics trait for pluggable hyperbolic solvers.

use crate::error::SimResult;

/// Index of a time coordinate exposed by a physics module.
///
/// Kind 0 is the primary simulation time and is always supported. Kinds
/// 1, 2, ... are optional auxiliary clocks, probed in order until the first
/// unsupported one.
pub type TimeKind = u32;

/// One named scalar reduction of the solution, recorded in the timeseries.
pub type Sample = Vec<(String, f64)>;

/// Trait for physics modules driven by the stepping loop.
///
/// A physics module supplies:
/// - State type (Clone, for checkpoints and restarts)
/// - A forward-Euler style `advance`, from which the Runge-Kutta schemes are built
/// - A stability estimate so the driver can choose `dt = cfl * estimate`
/// - Linear blending of states for the multi-stage schemes
/// - Derived products, time coordinates and timeseries samples
///
/// All methods take `&self`; the configuration is immutable for the life of
/// a run.
pub trait Physics {
    /// Complete solution state. Must be self-contained enough to restart from.
    type State: Clone;

    /// Diagnostic quantities computed from a state for product output.
    type Product;

    /// State at the start of a fresh run.
    fn initial_state(&self) -> Self::State;

    /// Single forward-Euler step of size `dt`. Must advance time coordinate 0 by `dt`.
    fn advance(&self, state: &Self::State, dt: f64) -> Self::State;

    /// Largest stable step for `state`, before the CFL factor is applied.
    fn stability_estimate(&self, state: &Self::State) -> f64;

    /// `(1 - alpha) * a + alpha * b`, applied to every evolved field including time.
    fn blend(&self, a: &Self::State, b: &Self::State, alpha: f64) -> Self::State;

    fn derived_quantities(&self, state: &Self::State) -> Self::Product;

    /// Time coordinate `kind` of `state`.
    ///
    /// Returns [`crate::SimError::TimeKindOutOfRange`] for unsupported kinds.
    fn time_coordinate(&self, state: &Self::State, kind: TimeKind) -> SimResult<f64>;

    /// Number of zones, for throughput reporting.
    fn zone_count(&self, state: &Self::State) -> usize;

    /// Named scalar reductions appended to the timeseries.
    fn sample(&self, state: &Self::State) -> Sample;

    /// Reject configurations the module cannot run. Called before any output.
    fn validate(&self) -> SimResult<()> {
        Ok(())
    }

    /// Reject a restored state that does not fit this configuration.
    /// Called before any output when a run resumes from a checkpoint.
    fn validate_state(&self, _state: &Self::State) -> SimResult<()> {
        Ok(())
    }
}
