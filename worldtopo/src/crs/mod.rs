//! Coordinate reference systems used by the national mapping agencies.
//!
//! Every [`Crs`] maps a geographical [`Position`] onto a plane expressed in its own linear
//! units, and back. The set of projections is closed: only those required by the supported
//! providers are implemented.

mod equirectangular;
mod miller;
mod swiss;
mod transverse_mercator;

pub use equirectangular::Equirectangular;
pub use miller::Miller;
pub use swiss::Swiss;
pub use transverse_mercator::{Ellipsoid, TransverseMercator, WGS84};

use crate::position::{Position, Projected};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidCrs {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("UTM zone {0} is out of range")]
    UtmZone(u8),
}

/// Fail unless `value` is a positive, finite number.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, InvalidCrs> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidCrs::NonPositive { name, value })
    }
}

/// Concrete projection math.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    TransverseMercator(TransverseMercator),
    Miller(Miller),
    Swiss(Swiss),
    Equirectangular(Equirectangular),
}

impl Projection {
    pub fn forward(&self, position: Position) -> Projected {
        match self {
            Self::TransverseMercator(p) => p.forward(position),
            Self::Miller(p) => p.forward(position),
            Self::Swiss(p) => p.forward(position),
            Self::Equirectangular(p) => p.forward(position),
        }
    }

    pub fn inverse(&self, projected: Projected) -> Position {
        match self {
            Self::TransverseMercator(p) => p.inverse(projected),
            Self::Miller(p) => p.inverse(projected),
            Self::Swiss(p) => p.inverse(projected),
            Self::Equirectangular(p) => p.inverse(projected),
        }
    }
}

/// Named projection together with the origin of its tile grid.
///
/// Instances are immutable. When a layer moves to another zone, it gets a different `Crs`
/// instead of modifying the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    name: String,
    origin: Projected,
    projection: Projection,
}

impl Crs {
    pub fn new(name: impl Into<String>, origin: Projected, projection: Projection) -> Self {
        Self {
            name: name.into(),
            origin,
            projection,
        }
    }

    /// UTM zone on the WGS84 ellipsoid, as used by the Spanish iberpix tile servers.
    pub fn utm(zone: u8) -> Result<Self, InvalidCrs> {
        Ok(Self::new(
            "UTM",
            Projected::new(0., 0.),
            Projection::TransverseMercator(TransverseMercator::utm(zone)?),
        ))
    }

    /// World-wide Miller projection of the French Géoportail.
    pub fn miller() -> Self {
        Self::new(
            "IGNF:MILLER",
            Projected::new(0., 0.),
            Projection::Miller(Miller::default()),
        )
    }

    /// Géoportail equirectangular projection of a French territory.
    pub fn geoportal(territory: &str, kx: f64, ky: f64) -> Result<Self, InvalidCrs> {
        Ok(Self::new(
            format!("IGNF:GEOPORTAL{territory}"),
            Projected::new(0., 0.),
            Projection::Equirectangular(Equirectangular::new(kx, ky)?),
        ))
    }

    /// Swiss national grid (CH1903, EPSG:21781), origin at the top-left of swisstopo's tile matrix.
    pub fn swiss() -> Self {
        Self::new(
            "21781",
            Projected::new(420_000., 350_000.),
            Projection::Swiss(Swiss),
        )
    }

    /// Name used by the tile servers to refer to this projection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-left corner of the tile grid, in projected units.
    pub fn origin(&self) -> Projected {
        self.origin
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Project a geographical position onto the plane.
    pub fn forward(&self, position: Position) -> Projected {
        self.projection.forward(position)
    }

    /// Turn projected coordinates back into a geographical position.
    pub fn inverse(&self, projected: Projected) -> Position {
        self.projection.inverse(projected)
    }
}

/// Project `position` using `crs`.
pub fn forward(crs: &Crs, position: Position) -> Projected {
    crs.forward(position)
}

/// Inverse of [`forward`].
pub fn inverse(crs: &Crs, projected: Projected) -> Position {
    crs.inverse(projected)
}
