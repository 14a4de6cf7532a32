//! Miller cylindrical projection on a sphere.
//! <https://en.wikipedia.org/wiki/Miller_cylindrical_projection>
//!
//! Latitudes close to the poles are out of the domain. Nothing guards them, and the
//! output is not meaningful there.

use std::f64::consts::FRAC_PI_4;

use crate::position::{Position, Projected, lat_lon};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Miller {
    radius: f64,
}

impl Default for Miller {
    fn default() -> Self {
        Self {
            radius: 6_378_137.,
        }
    }
}

impl Miller {
    pub fn forward(&self, position: Position) -> Projected {
        let x = self.radius * position.x().to_radians();
        let y = 1.25 * self.radius * (FRAC_PI_4 + 0.4 * position.y().to_radians()).tan().ln();
        Projected::new(x, y)
    }

    pub fn inverse(&self, projected: Projected) -> Position {
        let lon = (projected.x() / self.radius).to_degrees();
        let lat = ((projected.y() / self.radius / 1.25).exp().atan() - FRAC_PI_4) / 0.4;
        lat_lon(lat.to_degrees(), lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equator_and_prime_meridian_are_the_origin() {
        let projected = Miller::default().forward(lat_lon(0., 0.));
        assert_abs_diff_eq!(projected.x(), 0.);
        assert_abs_diff_eq!(projected.y(), 0., epsilon = 1e-9);
    }

    #[test]
    fn there_and_back() {
        let miller = Miller::default();
        for position in [
            lat_lon(48.85, 2.35),
            lat_lon(-21., 55.5),
            lat_lon(70., -170.),
        ] {
            let back = miller.inverse(miller.forward(position));
            assert_abs_diff_eq!(position.x(), back.x(), epsilon = 1e-9);
            assert_abs_diff_eq!(position.y(), back.y(), epsilon = 1e-9);
        }
    }
}
