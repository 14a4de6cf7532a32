use std::num::NonZeroUsize;

use super::{Adjustment, Cause, CrsCache, Zone, ZoneResolver, scale0, zoom_offset};
use crate::{
    Bounds, MapEvent,
    crs::{Crs, InvalidCrs},
    position::{Viewport, VisibleBounds, bounds},
    tiling::Grid,
};

/// Meters per degree of latitude, shared by every Géoportail territory.
pub const GEOPORTAL_KY: f64 = 111_319.490_793_27;

/// Géoportail resolution at its coarsest territorial level.
const GEOPORTAL_RESOLUTION: f64 = 2048.;

/// Resolution of the world-wide Miller layer at its coarsest level.
const MILLER_RESOLUTION: f64 = 39_135.75;

/// French territory with its own Géoportail projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Territory {
    pub code: &'static str,
    /// South, west, north, east.
    pub extent: [f64; 4],
    /// Meters per degree of longitude at the territory's reference parallel.
    pub kx: f64,
}

impl Territory {
    pub fn bounds(&self) -> Bounds {
        let [south, west, north, east] = self.extent;
        bounds(south, west, north, east)
    }

    pub fn crs(&self) -> Result<Crs, InvalidCrs> {
        Crs::geoportal(self.code, self.kx, GEOPORTAL_KY)
    }
}

/// Searched in this order when the map leaves the current territory.
pub const TERRITORIES: [Territory; 11] = [
    Territory {
        code: "ANF",
        extent: [11.7, -64., 18.18, -59.],
        kx: 107_526.371_126_57,
    },
    Territory {
        code: "ASP",
        extent: [-40., 76., -36., 79.],
        kx: 87_720.955_831_12,
    },
    Territory {
        code: "CRZ",
        extent: [-48., 47., -44., 55.],
        kx: 77_329.016_074_78,
    },
    Territory {
        code: "FXX",
        extent: [27.33, -31.17, 80.83, 69.03],
        kx: 76_627.280_851_45,
    },
    Territory {
        code: "GUF",
        extent: [-4.3, -62.1, 11.5, -46.],
        kx: 111_048.322_108_60,
    },
    Territory {
        code: "MYT",
        extent: [-17.5, 40., 3., 56.],
        kx: 108_886.892_834_35,
    },
    Territory {
        code: "NCL",
        extent: [-24.3, 160., -17.1, 170.],
        kx: 103_213.634_562_12,
    },
    Territory {
        code: "PYF",
        extent: [-28.2, -160., 11., -108.],
        kx: 107_526.371_126_57,
    },
    Territory {
        code: "REU",
        extent: [-26.2, 37.5, -17.75, 60.],
        kx: 103_925.697_692_24,
    },
    Territory {
        code: "SPM",
        extent: [43.5, -60., 52., -50.],
        kx: 75_919.710_164_00,
    },
    Territory {
        code: "WLF",
        extent: [-14.6, -178.5, -12.8, -175.8],
        kx: 108_012.826_167_93,
    },
];

/// Metropolitan France.
pub const DEFAULT_TERRITORY: &Territory = &TERRITORIES[3];

/// Look up a territory by its code.
pub fn territory(code: &str) -> Option<&'static Territory> {
    TERRITORIES.iter().find(|t| t.code == code)
}

/// Keep `previous` for as long as it is still visible, so that the projection does not
/// flip back and forth when the viewport straddles two territories.
fn pick_territory(
    previous: Option<&'static Territory>,
    visible: Option<&VisibleBounds>,
) -> &'static Territory {
    let Some(visible) = visible else {
        return previous.unwrap_or(DEFAULT_TERRITORY);
    };

    if let Some(previous) = previous {
        if visible.intersects(&previous.bounds()) {
            return previous;
        }
    }

    TERRITORIES
        .iter()
        .find(|t| visible.intersects(&t.bounds()))
        .or(previous)
        .unwrap_or(DEFAULT_TERRITORY)
}

/// Switches Géoportail between the world-wide Miller projection at low zoom levels and
/// per-territory projections otherwise.
pub struct TerritoryResolver {
    cache: CrsCache,
    world_zoom: u8,
    grid: Grid,
}

impl TerritoryResolver {
    pub fn new() -> Result<Self, InvalidCrs> {
        let mut cache = CrsCache::new(NonZeroUsize::MIN.saturating_add(TERRITORIES.len()));
        let grid = Self::grid_for(&mut cache, Zone::World)?;
        Ok(Self {
            cache,
            world_zoom: zoom_offset(GEOPORTAL_RESOLUTION) as u8,
            grid,
        })
    }

    /// Zoom level from which territorial projections are used.
    pub fn world_zoom(&self) -> u8 {
        self.world_zoom
    }

    fn grid_for(cache: &mut CrsCache, zone: Zone) -> Result<Grid, InvalidCrs> {
        match zone {
            Zone::Territory(code) => {
                let territory = territory(code).unwrap_or(DEFAULT_TERRITORY);
                let crs = cache.get_or_try_insert(zone, || territory.crs())?;
                Grid::new(
                    zone,
                    crs,
                    scale0(GEOPORTAL_RESOLUTION, zoom_offset(GEOPORTAL_RESOLUTION)),
                )
            }
            _ => {
                let crs = cache.get_or_try_insert(Zone::World, || Ok(Crs::miller()))?;
                Grid::new(
                    Zone::World,
                    crs,
                    scale0(MILLER_RESOLUTION, zoom_offset(MILLER_RESOLUTION)),
                )
            }
        }
    }

    fn current_territory(&self) -> Option<&'static Territory> {
        match self.grid.zone() {
            Zone::Territory(code) => territory(code),
            _ => None,
        }
    }
}

impl ZoneResolver for TerritoryResolver {
    fn events(&self) -> &'static [MapEvent] {
        &[MapEvent::ZoomChanged, MapEvent::CenterChanged]
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn update(&mut self, _cause: Cause, viewport: &Viewport) -> Adjustment {
        let zone = if viewport.zoom < self.world_zoom {
            Zone::World
        } else {
            Zone::Territory(pick_territory(self.current_territory(), viewport.bounds.as_ref()).code)
        };

        if zone == self.grid.zone() {
            return Adjustment::default();
        }

        match Self::grid_for(&mut self.cache, zone) {
            Ok(grid) => {
                log::debug!("Switching Géoportail to {}.", grid.crs().name());
                self.grid = grid;
                Adjustment {
                    grid_changed: true,
                    zoom: None,
                    recenter: Some(viewport.center),
                }
            }
            Err(err) => {
                log::warn!("Could not build projection for {zone}: {err}.");
                Adjustment::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lat_lon, visible_bounds as bounds};

    fn viewport(zoom: u8, visible: Option<VisibleBounds>) -> Viewport {
        let center = visible.map_or(lat_lon(46.5, 2.5), |b| {
            lat_lon(
                (b.south_west.y() + b.north_east.y()) / 2.,
                (b.south_west.x() + b.north_east.x()) / 2.,
            )
        });
        Viewport {
            center,
            zoom,
            bounds: visible,
        }
    }

    #[test]
    fn territory_lookup() {
        assert_eq!("FXX", DEFAULT_TERRITORY.code);
        assert_eq!(Some(103_925.697_692_24), territory("REU").map(|t| t.kx));
        assert_eq!(None, territory("XYZ"));
    }

    #[test]
    fn low_zoom_levels_use_miller() {
        let mut resolver = TerritoryResolver::new().unwrap();
        assert_eq!(6, resolver.world_zoom());
        assert_eq!(Zone::World, resolver.grid().zone());
        assert_eq!("IGNF:MILLER", resolver.grid().crs().name());

        let adjustment = resolver.update(Cause::Enabled, &viewport(5, Some(bounds(40., -5., 50., 10.))));
        assert_eq!(Adjustment::default(), adjustment);

        // Miller serves 39135.75 m per pixel at zoom 2.
        assert_eq!(39_135.75, resolver.grid().resolution(2));
    }

    #[test]
    fn first_territory_in_table_order_wins() {
        let mut resolver = TerritoryResolver::new().unwrap();

        // Visible area touches both Mayotte and Réunion, the former comes first.
        let straddling = viewport(8, Some(bounds(-18., 45., -17., 46.)));
        assert!(resolver.update(Cause::Enabled, &straddling).grid_changed);
        assert_eq!(Zone::Territory("MYT"), resolver.grid().zone());
        assert_eq!(2048., resolver.grid().resolution(6));
    }

    #[test]
    fn territory_sticks_while_visible() {
        let mut resolver = TerritoryResolver::new().unwrap();
        let event = Cause::Event(MapEvent::BoundsChanged);

        let reunion = viewport(10, Some(bounds(-21.4, 55.2, -20.9, 55.8)));
        let straddling = viewport(10, Some(bounds(-18., 45., -17., 46.)));
        let mayotte = viewport(10, Some(bounds(-13., 45., -12.6, 45.3)));

        resolver.update(event, &reunion);
        assert_eq!(Zone::Territory("REU"), resolver.grid().zone());

        // Mayotte comes first in the table, but Réunion is still visible.
        for _ in 0..3 {
            assert!(!resolver.update(event, &straddling).grid_changed);
            assert_eq!(Zone::Territory("REU"), resolver.grid().zone());
        }

        assert!(resolver.update(event, &mayotte).grid_changed);
        assert_eq!(Zone::Territory("MYT"), resolver.grid().zone());

        for _ in 0..3 {
            assert!(!resolver.update(event, &straddling).grid_changed);
            assert_eq!(Zone::Territory("MYT"), resolver.grid().zone());
        }
    }

    #[test]
    fn visible_area_across_the_antimeridian() {
        let mut resolver = TerritoryResolver::new().unwrap();
        let event = Cause::Event(MapEvent::CenterChanged);

        // Between Fiji and Samoa, with Wallis-et-Futuna in sight.
        let wallis = Viewport {
            center: lat_lon(-13.3, -176.2),
            zoom: 6,
            bounds: Some(bounds(-20., 170.5, -8., -170.)),
        };
        assert!(resolver.update(Cause::Enabled, &wallis).grid_changed);
        assert_eq!(Zone::Territory("WLF"), resolver.grid().zone());
        assert_eq!("IGNF:GEOPORTALWLF", resolver.grid().crs().name());

        // New Caledonia comes first in the table, but Wallis-et-Futuna is still visible.
        let both = Viewport {
            center: lat_lon(-17., 174.5),
            zoom: 6,
            bounds: Some(bounds(-22., 165., -12., -176.)),
        };
        assert!(!resolver.update(event, &both).grid_changed);
        assert_eq!(Zone::Territory("WLF"), resolver.grid().zone());

        let noumea = Viewport {
            center: lat_lon(-22.5, 171.),
            zoom: 7,
            bounds: Some(bounds(-25., 163., -20., 179.)),
        };
        assert!(resolver.update(event, &noumea).grid_changed);
        assert_eq!(Zone::Territory("NCL"), resolver.grid().zone());
    }

    #[test]
    fn nowhere_near_france() {
        let mut resolver = TerritoryResolver::new().unwrap();
        let event = Cause::Event(MapEvent::BoundsChanged);

        // Middle of the Pacific, with no territory known yet.
        resolver.update(event, &viewport(8, Some(bounds(30., -150., 31., -149.))));
        assert_eq!(Zone::Territory("FXX"), resolver.grid().zone());

        resolver.update(event, &viewport(8, Some(bounds(-21.4, 55.2, -20.9, 55.8))));
        assert_eq!(Zone::Territory("REU"), resolver.grid().zone());

        // Leaving every territory keeps the last one.
        resolver.update(event, &viewport(8, Some(bounds(30., -150., 31., -149.))));
        assert_eq!(Zone::Territory("REU"), resolver.grid().zone());
    }

    #[test]
    fn unknown_bounds() {
        let mut resolver = TerritoryResolver::new().unwrap();

        let adjustment = resolver.update(Cause::Enabled, &viewport(8, None));
        assert_eq!(Zone::Territory("FXX"), resolver.grid().zone());
        assert_eq!(Some(lat_lon(46.5, 2.5)), adjustment.recenter);

        resolver.update(
            Cause::Event(MapEvent::BoundsChanged),
            &viewport(8, Some(bounds(-21.4, 55.2, -20.9, 55.8))),
        );
        assert!(
            !resolver
                .update(Cause::Event(MapEvent::ZoomChanged), &viewport(9, None))
                .grid_changed
        );
        assert_eq!(Zone::Territory("REU"), resolver.grid().zone());
    }
}
