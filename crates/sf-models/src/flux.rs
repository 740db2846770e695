//! Upwind numerical flux for scalar advection.
//!
//! For du/dt + a * du/dx = 0 the upwind flux at an interface takes the state
//! on the side the wave comes from:
//! F^* = a * u_left  if a > 0
//! F^* = a * u_right otherwise

/// Upwind flux through an interface with `left` and `right` neighbour values.
pub fn upwind_flux(left: f64, right: f64, velocity: f64) -> f64 {
    if velocity > 0.0 {
        velocity * left
    } else {
        velocity * right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_upstream_value() {
        assert_eq!(upwind_flux(2.0, 5.0, 1.5), 3.0);
        assert_eq!(upwind_flux(2.0, 5.0, -1.5), -7.5);
    }

    #[test]
    fn zero_velocity_has_no_flux() {
        assert_eq!(upwind_flux(2.0, 5.0, 0.0), 0.0);
    }
}
