//! sf-core: stable foundation for stepflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - timing (wall-clock stopwatch for throughput reporting)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SfError, SfResult};
pub use numeric::*;
pub use timing::Stopwatch;
