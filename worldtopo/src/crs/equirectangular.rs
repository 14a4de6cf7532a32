//! Linear projection of the French Géoportail. Each territory has its own `Kx`, which
//! compensates for the shrinking of meridians at the territory's latitude.

use super::{InvalidCrs, positive};
use crate::position::{Position, Projected, lat_lon};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equirectangular {
    kx: f64,
    ky: f64,
}

impl Equirectangular {
    pub fn new(kx: f64, ky: f64) -> Result<Self, InvalidCrs> {
        Ok(Self {
            kx: positive("Kx", kx)?,
            ky: positive("Ky", ky)?,
        })
    }

    pub fn forward(&self, position: Position) -> Projected {
        Projected::new(position.x() * self.kx, position.y() * self.ky)
    }

    pub fn inverse(&self, projected: Projected) -> Position {
        lat_lon(projected.y() / self.ky, projected.x() / self.kx)
    }
}
