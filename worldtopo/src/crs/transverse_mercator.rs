//! Transverse Mercator on an ellipsoid, using the series expansions from J. P. Snyder,
//! "Map Projections: A Working Manual", pp. 60-64.
//! <https://pubs.usgs.gov/pp/1395/report.pdf>

use super::{InvalidCrs, positive};
use crate::position::{Position, Projected, lat_lon};

/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major: f64,
    /// Inverse of the flattening, `a / (a - b)`.
    pub inverse_flattening: f64,
}

pub const WGS84: Ellipsoid = Ellipsoid {
    semi_major: 6_378_137.,
    inverse_flattening: 298.257220143,
};

/// Scale factor along the central meridian of every UTM zone.
const UTM_SCALE_FACTOR: f64 = 0.9996;

const UTM_FALSE_EASTING: f64 = 500_000.;

#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    a: f64,
    k0: f64,
    lambda0: f64,
    false_easting: f64,
    false_northing: f64,
    /// e²
    es: f64,
    /// e⁴
    e4: f64,
    /// e⁶
    e6: f64,
    /// Second eccentricity squared, e'² = e² / (1 - e²).
    eps: f64,
    /// Meridian distance at the latitude of origin.
    m0: f64,
}

impl TransverseMercator {
    /// `origin` is the natural origin (central meridian, latitude of origin), which gets
    /// the `false_origin` coordinates on the plane.
    pub fn new(
        ellipsoid: Ellipsoid,
        scale_factor: f64,
        origin: Position,
        false_origin: Projected,
    ) -> Result<Self, InvalidCrs> {
        let a = positive("semi-major axis", ellipsoid.semi_major)?;
        let inverse_flattening = positive("inverse flattening", ellipsoid.inverse_flattening)?;
        let k0 = positive("scale factor", scale_factor)?;

        let f = inverse_flattening.recip();
        let es = 2. * f - f * f;
        let e4 = es * es;
        let e6 = e4 * es;

        let mut projection = Self {
            a,
            k0,
            lambda0: origin.x().to_radians(),
            false_easting: false_origin.x(),
            false_northing: false_origin.y(),
            es,
            e4,
            e6,
            eps: es / (1. - es),
            m0: 0.,
        };
        projection.m0 = projection.meridian_distance(origin.y().to_radians());
        Ok(projection)
    }

    /// Universal Transverse Mercator zone on WGS84, northern hemisphere.
    pub fn utm(zone: u8) -> Result<Self, InvalidCrs> {
        if !(1..=60).contains(&zone) {
            return Err(InvalidCrs::UtmZone(zone));
        }

        Self::new(
            WGS84,
            UTM_SCALE_FACTOR,
            lat_lon(0., central_meridian(zone)),
            Projected::new(UTM_FALSE_EASTING, 0.),
        )
    }

    /// Distance along the meridian from the equator to `phi`.
    fn meridian_distance(&self, phi: f64) -> f64 {
        let (es, e4, e6) = (self.es, self.e4, self.e6);
        self.a
            * ((1. - es / 4. - 3. * e4 / 64. - 5. * e6 / 256.) * phi
                - (3. * es / 8. + 3. * e4 / 32. + 45. * e6 / 1024.) * (2. * phi).sin()
                + (15. * e4 / 256. + 45. * e6 / 1024.) * (4. * phi).sin()
                - (35. * e6 / 3072.) * (6. * phi).sin())
    }

    pub fn forward(&self, position: Position) -> Projected {
        let phi = position.y().to_radians();
        let lambda = position.x().to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let nu = self.a / (1. - self.es * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.eps * cos_phi * cos_phi;
        let a = (lambda - self.lambda0) * cos_phi;
        let m = self.meridian_distance(phi);

        let easting = self.false_easting
            + self.k0
                * nu
                * (a + (1. - t + c) * a.powi(3) / 6.
                    + (5. - 18. * t + t * t + 72. * c - 58. * self.eps) * a.powi(5) / 120.);

        let northing = self.false_northing
            + self.k0
                * (m - self.m0
                    + nu * tan_phi
                        * (a * a / 2.
                            + (5. - t + 9. * c + 4. * c * c) * a.powi(4) / 24.
                            + (61. - 58. * t + t * t + 600. * c - 330. * self.eps) * a.powi(6)
                                / 720.));

        Projected::new(easting, northing)
    }

    pub fn inverse(&self, projected: Projected) -> Position {
        let sqrt_one_minus_es = (1. - self.es).sqrt();
        let e1 = (1. - sqrt_one_minus_es) / (1. + sqrt_one_minus_es);

        // Footpoint latitude.
        let m1 = self.m0 + (projected.y() - self.false_northing) / self.k0;
        let mu1 = m1 / (self.a * (1. - self.es / 4. - 3. * self.e4 / 64. - 5. * self.e6 / 256.));
        let phi1 = mu1
            + (3. * e1 / 2. - 27. * e1.powi(3) / 32.) * (2. * mu1).sin()
            + (21. * e1 * e1 / 16. - 55. * e1.powi(4) / 32.) * (4. * mu1).sin()
            + (151. * e1.powi(3) / 96.) * (6. * mu1).sin()
            + (1097. * e1.powi(4) / 512.) * (8. * mu1).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.eps * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let w = 1. - self.es * sin_phi1 * sin_phi1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1. - self.es) / w.powf(1.5);
        let d = (projected.x() - self.false_easting) / (n1 * self.k0);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.
                    - (5. + 3. * t1 + 10. * c1 - 4. * c1 * c1 - 9. * self.eps) * d.powi(4) / 24.
                    + (61. + 90. * t1 + 28. * c1 + 45. * t1 * t1 - 252. * self.eps - 3. * c1 * c1)
                        * d.powi(6)
                        / 720.);

        let lambda = self.lambda0
            + (d - (1. + 2. * t1 + c1) * d.powi(3) / 6.
                + (5. - 2. * c1 + 28. * t1 - 3. * c1 * c1 + 8. * self.eps + 24. * t1 * t1)
                    * d.powi(5)
                    / 120.)
                / cos_phi1;

        lat_lon(phi.to_degrees(), lambda.to_degrees())
    }
}

/// Longitude of the central meridian of a UTM zone, in degrees.
pub fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6. - 183.
}
