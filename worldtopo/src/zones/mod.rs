//! Picking the concrete CRS a layer uses for the current viewport.
//!
//! National agencies split their coverage into zones (UTM zones in Spain, overseas
//! territories in France), each with its own projection. Resolvers run on every viewport
//! change and swap the layer's [`Grid`] when the zone changes.

mod swiss;
mod territory;
mod utm;

pub use swiss::{SKIPPED_ZOOM, SWISS_ZOOMS, SwissResolver, SwissZoom, swiss_zoom};
pub use territory::{
    DEFAULT_TERRITORY, GEOPORTAL_KY, TERRITORIES, Territory, TerritoryResolver, territory,
};
pub use utm::{UtmResolver, utm_zone};

use std::{f64::consts::PI, fmt, num::NonZeroUsize, sync::Arc};

use lru::LruCache;

use crate::{
    MapEvent, Position,
    crs::{Crs, InvalidCrs},
    position::Viewport,
    tiling::{Grid, TILE_SIZE},
};

/// Zone a layer's CRS was picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// UTM zone number.
    Utm(u8),
    /// Whole world, used at low zoom levels.
    World,
    /// Code of a French territory, e.g. `FXX` for the mainland.
    Territory(&'static str),
    /// Single, country-wide CRS.
    National,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utm(zone) => write!(f, "{zone}"),
            Self::World => write!(f, "world"),
            Self::Territory(code) => write!(f, "{code}"),
            Self::National => write!(f, "national"),
        }
    }
}

/// What made the layer re-resolve its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    Enabled,
    Event(MapEvent),
}

/// Changes a resolver wants applied to the host, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustment {
    /// Whether the layer now uses a different grid.
    pub grid_changed: bool,

    /// Zoom level the host must adopt.
    pub zoom: Option<u8>,

    /// Position to center the host on, so that it is laid out again using the new grid.
    pub recenter: Option<Position>,
}

pub trait ZoneResolver {
    /// Host events which require re-resolving the zone while the layer is enabled.
    fn events(&self) -> &'static [MapEvent];

    /// Grid currently in use.
    fn grid(&self) -> &Grid;

    /// Resolve the zone for `viewport`, replacing the grid when it changes.
    fn update(&mut self, cause: Cause, viewport: &Viewport) -> Adjustment;
}

/// Zoom level at which a tile of `resolution` units per pixel covers about as much ground
/// as a Web Mercator tile.
pub(crate) fn zoom_offset(resolution: f64) -> i32 {
    (2. * PI * 6_378_137. / (resolution * f64::from(TILE_SIZE)))
        .log2()
        .round() as i32
}

/// Tile span at zoom 0 of a grid with `resolution` units per pixel at zoom `zoom_offset`.
pub(crate) fn scale0(resolution: f64, zoom_offset: i32) -> f64 {
    f64::from(TILE_SIZE) * resolution * 2f64.powi(zoom_offset)
}

/// Memoized CRS instances, as building some of them involves a fair amount of trigonometry.
pub(crate) struct CrsCache {
    cache: LruCache<Zone, Arc<Crs>>,
}

impl CrsCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn get_or_try_insert(
        &mut self,
        zone: Zone,
        build: impl FnOnce() -> Result<Crs, InvalidCrs>,
    ) -> Result<Arc<Crs>, InvalidCrs> {
        self.cache
            .try_get_or_insert(zone, || build().map(Arc::new))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_offsets() {
        assert_eq!(6, zoom_offset(2048.));
        assert_eq!(2, zoom_offset(39135.75));
    }

    #[test]
    fn zones_display_like_tile_servers_expect() {
        assert_eq!("29", Zone::Utm(29).to_string());
        assert_eq!("REU", Zone::Territory("REU").to_string());
        assert_eq!("world", Zone::World.to_string());
    }

    #[test]
    fn crs_is_built_once_per_zone() {
        let mut cache = CrsCache::new(NonZeroUsize::MIN.saturating_add(2));
        let mut builds = 0;

        for _ in 0..3 {
            cache
                .get_or_try_insert(Zone::Utm(30), || {
                    builds += 1;
                    Crs::utm(30)
                })
                .unwrap();
        }

        assert_eq!(1, builds);
    }

    #[test]
    fn failed_builds_are_not_cached() {
        let mut cache = CrsCache::new(NonZeroUsize::MIN);
        assert!(cache.get_or_try_insert(Zone::Utm(0), || Crs::utm(0)).is_err());
        assert!(cache.get_or_try_insert(Zone::Utm(0), || Crs::utm(1)).is_ok());
    }
}
