//! Approximate conversion between WGS84 and the Swiss CH1903 grid, published by swisstopo.
//! The coefficients are an empirical fit and are kept exactly as published. The result is
//! accurate to about one meter within Switzerland.
//! <https://www.swisstopo.admin.ch/en/knowledge-facts/surveying-geodesy/reference-frames.html>

use crate::position::{Position, Projected, lat_lon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swiss;

/// Decimal degrees to sexagesimal seconds, truncating degrees and minutes.
fn sexagesimal_seconds(angle: f64) -> f64 {
    let degrees = angle.trunc();
    let minutes = ((angle - degrees) * 60.).trunc();
    let seconds = ((angle - degrees) * 60. - minutes) * 60.;
    seconds + minutes * 60. + degrees * 3600.
}

impl Swiss {
    pub fn forward(&self, position: Position) -> Projected {
        let lat = (sexagesimal_seconds(position.y()) - 169_028.66) / 10_000.;
        let lng = (sexagesimal_seconds(position.x()) - 26_782.5) / 10_000.;

        let lat2 = lat.powi(2);
        let lat3 = lat.powi(3);
        let lng2 = lng.powi(2);
        let lng3 = lng.powi(3);

        Projected::new(
            600_072.37 + 211_455.93 * lng
                - 10_938.51 * lng * lat
                - 0.36 * lng * lat2
                - 44.54 * lng3,
            200_147.07 + 308_807.95 * lat + 3_745.25 * lng2 + 76.63 * lat2
                - 194.56 * lng2 * lat
                + 119.79 * lat3,
        )
    }

    pub fn inverse(&self, projected: Projected) -> Position {
        let x = (projected.x() - 600_000.) / 1_000_000.;
        let y = (projected.y() - 200_000.) / 1_000_000.;

        let y2 = y.powi(2);
        let y3 = y.powi(3);
        let x2 = x.powi(2);
        let x3 = x.powi(3);

        lat_lon(
            100. / 36.
                * (16.9023892 + 3.238272 * y
                    - 0.270978 * x2
                    - 0.002528 * y2
                    - 0.0447 * x2 * y
                    - 0.0140 * y3),
            100. / 36. * (2.6779094 + 4.728982 * x + 0.791484 * x * y + 0.1306 * x * y2 - 0.0436 * x3),
        )
    }
}
