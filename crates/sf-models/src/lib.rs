//! sf-models: reference physics modules for the stepflow driver.
//!
//! Provides:
//! - 1D linear advection on a periodic domain with first-order upwinding
//!
//! Every model implements [`sf_sim::Physics`], and its state and product
//! implement [`sf_archive::Persist`] so they can be checkpointed.

pub mod advection;
pub mod flux;

pub use advection::{Advection1d, AdvectionProduct, AdvectionState};
