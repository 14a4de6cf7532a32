use std::sync::Arc;

use super::{Adjustment, Cause, Zone, ZoneResolver};
use crate::{
    MapEvent, Position,
    crs::{Crs, InvalidCrs},
    position::Viewport,
    tiling::{Grid, TILE_SIZE},
};

/// Resolution served by swisstopo at a host zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwissZoom {
    pub zoom: u8,
    /// Meters per pixel.
    pub resolution: f64,
    /// Level of swisstopo's WMTS tile matrix.
    pub level: u8,
}

const fn level(zoom: u8, resolution: f64, level: u8) -> SwissZoom {
    SwissZoom {
        zoom,
        resolution,
        level,
    }
}

pub const SWISS_ZOOMS: [SwissZoom; 14] = [
    level(5, 4000., 0),
    level(6, 2500., 6),
    level(7, 1250., 11),
    level(8, 650., 14),
    level(9, 250., 16),
    level(10, 200., 17),
    level(11, 100., 17),
    level(12, 50., 18),
    level(13, 20., 19),
    level(14, 10., 20),
    level(15, 5., 21),
    level(16, 2.5, 22),
    level(17, 1.5, 24),
    level(18, 0.5, 26),
];

/// Zoom level sharing its WMTS level with its neighbour, which the map jumps over when
/// zooming through it.
pub const SKIPPED_ZOOM: u8 = 10;

pub fn swiss_zoom(zoom: u8) -> Option<&'static SwissZoom> {
    SWISS_ZOOMS.iter().find(|z| z.zoom == zoom)
}

/// swisstopo resolutions do not halve between zoom levels, so the grid is rebuilt on every
/// zoom change. The map is then re-centered on the position it was showing when it last
/// stopped moving, as the same pixel now means another place.
pub struct SwissResolver {
    crs: Arc<Crs>,
    grid: Grid,
    previous_zoom: Option<u8>,
    anchor: Option<Position>,
}

impl SwissResolver {
    pub fn new() -> Result<Self, InvalidCrs> {
        let crs = Arc::new(Crs::swiss());
        let grid = Self::grid_for(&crs, &SWISS_ZOOMS[0])?;
        Ok(Self {
            crs,
            grid,
            previous_zoom: None,
            anchor: None,
        })
    }

    fn grid_for(crs: &Arc<Crs>, zoom: &SwissZoom) -> Result<Grid, InvalidCrs> {
        Grid::new(
            Zone::National,
            crs.clone(),
            f64::from(TILE_SIZE) * zoom.resolution * 2f64.powi(i32::from(zoom.zoom)),
        )
    }

    /// Zoom level to go to instead of `zoom`, if any.
    fn skip(&self, zoom: u8) -> Option<u8> {
        let previous = self.previous_zoom?;
        if zoom != SKIPPED_ZOOM || previous == zoom {
            return None;
        }

        Some(if previous < zoom { zoom + 1 } else { zoom - 1 })
    }
}

impl ZoneResolver for SwissResolver {
    fn events(&self) -> &'static [MapEvent] {
        &[MapEvent::Idle, MapEvent::ZoomChanged]
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn update(&mut self, cause: Cause, viewport: &Viewport) -> Adjustment {
        match cause {
            Cause::Event(MapEvent::Idle) => {
                self.anchor = Some(viewport.center);
                return Adjustment::default();
            }
            Cause::Enabled => self.anchor = Some(viewport.center),
            Cause::Event(_) => (),
        }

        let skipped = self.skip(viewport.zoom);
        let zoom = skipped.unwrap_or(viewport.zoom);

        let Some(swiss_zoom) = swiss_zoom(zoom) else {
            log::debug!("swisstopo has no tiles for zoom {zoom}.");
            return Adjustment::default();
        };

        let grid = match Self::grid_for(&self.crs, swiss_zoom) {
            Ok(grid) => grid,
            Err(err) => {
                log::warn!("Could not build swisstopo grid for zoom {zoom}: {err}.");
                return Adjustment::default();
            }
        };

        if let Some(skipped) = skipped {
            log::debug!("Skipping zoom {SKIPPED_ZOOM}, going to {skipped}.");
        }

        self.previous_zoom = Some(zoom);
        let grid_changed = grid != self.grid;
        self.grid = grid;

        Adjustment {
            grid_changed,
            zoom: skipped,
            recenter: Some(self.anchor.unwrap_or(viewport.center)),
        }
    }
}
