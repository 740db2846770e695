//! Iteration message line and throughput metric.

use std::fmt::Write as _;

use crate::error::{SimError, SimResult};
use crate::physics::{Physics, TimeKind};

/// Auxiliary time kinds are probed from 1 up to this bound.
pub const MAX_AUX_TIME_KINDS: TimeKind = 10;

/// Throughput in millions of zone updates per second.
///
/// Zero when no wall time has elapsed.
pub fn throughput_mzps(iterations: u64, zones: usize, wall_seconds: f64) -> f64 {
    if wall_seconds > 0.0 {
        iterations as f64 * zones as f64 / (wall_seconds * 1e6)
    } else {
        0.0
    }
}

/// Values of the auxiliary time coordinates 1, 2, ... up to the first
/// unsupported kind.
pub fn auxiliary_times<P: Physics>(physics: &P, state: &P::State) -> SimResult<Vec<f64>> {
    let mut times = Vec::new();
    for kind in 1..=MAX_AUX_TIME_KINDS {
        match physics.time_coordinate(state, kind) {
            Ok(t) => times.push(t),
            Err(SimError::TimeKindOutOfRange { .. }) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(times)
}

/// `[IIIIII] t=T.TTTTT (1:V.VVVV 2:V.VVVV) Mzps=M.MMM`
pub fn format_message(iteration: u64, time: f64, auxiliary: &[f64], mzps: f64) -> String {
    let mut line = format!("[{iteration:06}] t={time:.5} (");
    for (i, t) in auxiliary.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{}:{t:.4}", i + 1);
    }
    let _ = write!(line, ") Mzps={mzps:.3}");
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_auxiliary_clocks() {
        assert_eq!(
            format_message(12, 0.123456, &[], 1.5),
            "[000012] t=0.12346 () Mzps=1.500"
        );
    }

    #[test]
    fn formats_auxiliary_clocks_in_kind_order() {
        assert_eq!(
            format_message(1234567, 2.0, &[0.5, 10.25], 0.0),
            "[1234567] t=2.00000 (1:0.5000 2:10.2500) Mzps=0.000"
        );
    }

    #[test]
    fn throughput_scales_to_millions() {
        assert_eq!(throughput_mzps(10, 100_000, 1.0), 1.0);
        assert_eq!(throughput_mzps(10, 100_000, 0.0), 0.0);
    }
}
