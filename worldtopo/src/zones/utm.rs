use std::num::NonZeroUsize;

use super::{Adjustment, Cause, CrsCache, Zone, ZoneResolver, scale0, zoom_offset};
use crate::{
    MapEvent,
    crs::{Crs, InvalidCrs},
    position::Viewport,
    tiling::Grid,
};

/// Iberpix serves 2048 m per pixel tiles at its coarsest level.
const RESOLUTION: f64 = 2048.;

/// Below this zoom level the whole country is served in zone 30.
const DETAIL_ZOOM: u8 = 11;

const OVERVIEW_ZONE: u8 = 30;

/// UTM zone used by iberpix for the viewport.
pub fn utm_zone(viewport: &Viewport) -> u8 {
    let lng = viewport.center.x();
    if viewport.zoom < DETAIL_ZOOM {
        OVERVIEW_ZONE
    } else if lng < -6. {
        29
    } else if lng < 0. {
        30
    } else {
        31
    }
}

/// Switches between UTM zones 29, 30 and 31 as the map center crosses their meridians.
pub struct UtmResolver {
    cache: CrsCache,
    scale0: f64,
    grid: Grid,
}

impl UtmResolver {
    pub fn new() -> Result<Self, InvalidCrs> {
        let mut cache = CrsCache::new(NonZeroUsize::MIN.saturating_add(2));
        let scale0 = scale0(RESOLUTION, zoom_offset(RESOLUTION));
        let grid = Self::grid_for(&mut cache, scale0, OVERVIEW_ZONE)?;
        Ok(Self {
            cache,
            scale0,
            grid,
        })
    }

    fn grid_for(cache: &mut CrsCache, scale0: f64, zone: u8) -> Result<Grid, InvalidCrs> {
        let crs = cache.get_or_try_insert(Zone::Utm(zone), || Crs::utm(zone))?;
        Grid::new(Zone::Utm(zone), crs, scale0)
    }
}

impl ZoneResolver for UtmResolver {
    fn events(&self) -> &'static [MapEvent] {
        &[MapEvent::ZoomChanged, MapEvent::CenterChanged]
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn update(&mut self, _cause: Cause, viewport: &Viewport) -> Adjustment {
        let zone = utm_zone(viewport);
        if self.grid.zone() == Zone::Utm(zone) {
            return Adjustment::default();
        }

        match Self::grid_for(&mut self.cache, self.scale0, zone) {
            Ok(grid) => {
                log::debug!("Switching to UTM zone {zone}.");
                self.grid = grid;
                Adjustment {
                    grid_changed: true,
                    zoom: None,
                    recenter: Some(viewport.center),
                }
            }
            Err(err) => {
                log::warn!("Could not build UTM zone {zone}: {err}.");
                Adjustment::default()
            }
        }
    }
}
