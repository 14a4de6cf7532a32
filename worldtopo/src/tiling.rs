//! Tile grids laid over a projected plane.
//!
//! A grid is anchored at the [`Crs::origin`] and its tiles span `scale0` projected units at
//! zoom 0, halving with every zoom level. Columns grow eastward and rows grow southward, while
//! projected `y` grows northward.

use std::sync::Arc;

use crate::{
    Position,
    crs::{Crs, InvalidCrs, positive},
    position::Projected,
    zones::Zone,
};

/// Size of a single tile in pixels, on every supported provider.
pub const TILE_SIZE: u32 = 256;

/// Identifies the tile in the grid of a [`Crs`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TileId {
    /// Column, counted eastward from the grid origin.
    pub x: i64,

    /// Row, counted southward from the grid origin. Negative for tiles north of the origin.
    pub y: i64,

    pub zoom: u8,
}

/// Fractional tile coordinates, the position within the tile being the fractional part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePoint {
    pub x: f64,
    pub y: f64,
}

impl TilePoint {
    pub fn tile_id(&self, zoom: u8) -> TileId {
        TileId {
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            zoom,
        }
    }
}

/// Projected units spanned by a single tile at `zoom`.
pub fn tile_span(scale0: f64, zoom: u8) -> f64 {
    scale0 / 2f64.powi(i32::from(zoom))
}

/// Fractional tile coordinates of `position`.
pub fn project(crs: &Crs, scale0: f64, position: Position, zoom: u8) -> TilePoint {
    let span = tile_span(scale0, zoom);
    let projected = crs.forward(position);
    let origin = crs.origin();

    TilePoint {
        x: (projected.x() - origin.x()) / span,
        y: (origin.y() - projected.y()) / span,
    }
}

/// Inverse of [`project`].
pub fn unproject(crs: &Crs, scale0: f64, point: TilePoint, zoom: u8) -> Position {
    let span = tile_span(scale0, zoom);
    let origin = crs.origin();

    crs.inverse(Projected::new(
        origin.x() + point.x * span,
        origin.y() - point.y * span,
    ))
}

/// Calculate the tile containing `position`.
pub fn to_tile(crs: &Crs, scale0: f64, position: Position, zoom: u8) -> TileId {
    project(crs, scale0, position, zoom).tile_id(zoom)
}

/// Geographical position of the center of `tile_id`.
pub fn to_geo(crs: &Crs, scale0: f64, tile_id: TileId) -> Position {
    let center = TilePoint {
        x: tile_id.x as f64 + 0.5,
        y: tile_id.y as f64 + 0.5,
    };
    unproject(crs, scale0, center, tile_id.zoom)
}

/// The CRS currently in use by a layer, together with the zone it was picked for and
/// the size of its tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    zone: Zone,
    crs: Arc<Crs>,
    scale0: f64,
}

impl Grid {
    pub fn new(zone: Zone, crs: Arc<Crs>, scale0: f64) -> Result<Self, InvalidCrs> {
        Ok(Self {
            zone,
            crs,
            scale0: positive("scale0", scale0)?,
        })
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Projected units spanned by one tile at zoom 0.
    pub fn scale0(&self) -> f64 {
        self.scale0
    }

    /// Projected units spanned by one tile at `zoom`.
    pub fn tile_span(&self, zoom: u8) -> f64 {
        tile_span(self.scale0, zoom)
    }

    /// Projected units spanned by one pixel at `zoom`.
    pub fn resolution(&self, zoom: u8) -> f64 {
        self.tile_span(zoom) / f64::from(TILE_SIZE)
    }

    pub fn project(&self, position: Position, zoom: u8) -> TilePoint {
        project(&self.crs, self.scale0, position, zoom)
    }

    pub fn unproject(&self, point: TilePoint, zoom: u8) -> Position {
        unproject(&self.crs, self.scale0, point, zoom)
    }

    pub fn tile_id(&self, position: Position, zoom: u8) -> TileId {
        to_tile(&self.crs, self.scale0, position, zoom)
    }

    pub fn tile_center(&self, tile_id: TileId) -> Position {
        to_geo(&self.crs, self.scale0, tile_id)
    }
}
