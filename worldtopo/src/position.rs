//! Types and functions for working with positions.

use geo::Intersects as _;

/// Geographical position with latitude and longitude.
pub type Position = geo_types::Point;

/// Position expressed in the linear units of a [`crate::Crs`], usually meters.
pub type Projected = geo_types::Point;

/// Axis-aligned latitude/longitude rectangle. `x` is the longitude, `y` the latitude.
pub type Bounds = geo_types::Rect;

/// Construct `Position` from latitude and longitude.
pub fn lat_lon(lat: f64, lon: f64) -> Position {
    Position::new(lon, lat)
}

/// Construct `Position` from longitude and latitude. Note that it is common standard to write
/// coordinates starting with the latitude instead (e.g. `46.94809, 7.44744` is the Federal
/// Palace in Bern).
pub fn lon_lat(lon: f64, lat: f64) -> Position {
    Position::new(lon, lat)
}

/// Construct [`Bounds`] from its south-west and north-east corners, written latitude first.
pub fn bounds(south: f64, west: f64, north: f64, east: f64) -> Bounds {
    Bounds::new(
        geo_types::coord! { x: west, y: south },
        geo_types::coord! { x: east, y: north },
    )
}

/// Area shown by the host, as its south-west and north-east corners. Unlike [`Bounds`], the
/// west edge lies east of the east edge when the area crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleBounds {
    pub south_west: Position,
    pub north_east: Position,
}

impl VisibleBounds {
    pub fn new(south_west: Position, north_east: Position) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.x() > self.north_east.x()
    }

    /// Same area as plain rectangles, split in two at the antimeridian if it crosses it.
    pub fn parts(&self) -> Vec<Bounds> {
        let (south, west) = (self.south_west.y(), self.south_west.x());
        let (north, east) = (self.north_east.y(), self.north_east.x());

        if self.crosses_antimeridian() {
            vec![bounds(south, west, north, 180.), bounds(south, -180., north, east)]
        } else {
            vec![bounds(south, west, north, east)]
        }
    }

    /// Whether the area shares at least one point with `other`.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.parts().iter().any(|part| overlaps(part, other))
    }
}

/// Construct [`VisibleBounds`] from its corners, written latitude first like [`bounds`].
pub fn visible_bounds(south: f64, west: f64, north: f64, east: f64) -> VisibleBounds {
    VisibleBounds::new(lat_lon(south, west), lat_lon(north, east))
}

/// Whether `position` lies inside `bounds`, edges included.
pub(crate) fn contains(bounds: &Bounds, position: Position) -> bool {
    bounds.intersects(&position.0)
}

/// Whether two rectangles share at least one point.
pub(crate) fn overlaps(a: &Bounds, b: &Bounds) -> bool {
    a.intersects(b)
}

/// Snapshot of the host map state, taken each time a layer needs to recompute its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Geographical position at the center of the map.
    pub center: Position,

    /// Zoom level, where 0 means a single tile for the whole projection.
    pub zoom: u8,

    /// Area currently visible, if the host already knows it.
    pub bounds: Option<VisibleBounds>,
}

impl Viewport {
    /// Read the viewport from the host. Returns `None` when the host does not know its center
    /// yet, in which case the caller should skip the current cycle.
    pub fn from_host(host: &dyn crate::Host) -> Option<Self> {
        Some(Self {
            center: host.center()?,
            zoom: host.zoom(),
            bounds: host.visible_bounds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_stored_longitude_first() {
        let bern = lat_lon(46.94809, 7.44744);
        assert_eq!(bern, lon_lat(7.44744, 46.94809));
        assert_eq!(bern.x(), 7.44744);
        assert_eq!(bern.y(), 46.94809);
    }

    #[test]
    fn containment_includes_edges() {
        let spain = bounds(34., -13.5, 44., 4.);

        assert!(contains(&spain, lat_lon(40., -3.)));
        assert!(contains(&spain, lat_lon(44., 4.)));
        assert!(contains(&spain, lat_lon(34., -13.5)));
        assert!(!contains(&spain, lat_lon(48.85, 2.35)));
    }

    #[test]
    fn overlapping_rectangles() {
        let reunion = bounds(-26.2, 37.5, -17.75, 60.);
        let mayotte = bounds(-17.5, 40., 3., 56.);
        let visible = bounds(-18., 45., -17., 46.);

        assert!(overlaps(&reunion, &visible));
        assert!(overlaps(&mayotte, &visible));
        assert!(!overlaps(&reunion, &mayotte));
    }

    #[test]
    fn visible_area_across_the_antimeridian() {
        let fiji_to_samoa = visible_bounds(-20., 170., -8., -170.);
        assert!(fiji_to_samoa.crosses_antimeridian());
        assert_eq!(
            vec![bounds(-20., 170., -8., 180.), bounds(-20., -180., -8., -170.)],
            fiji_to_samoa.parts()
        );

        let wallis = bounds(-14.6, -178.5, -12.8, -175.8);
        let mayotte = bounds(-17.5, 40., 3., 56.);
        assert!(fiji_to_samoa.intersects(&wallis));
        assert!(!fiji_to_samoa.intersects(&mayotte));

        let reunion = visible_bounds(-21.4, 55.2, -20.9, 55.8);
        assert!(!reunion.crosses_antimeridian());
        assert_eq!(vec![bounds(-21.4, 55.2, -20.9, 55.8)], reunion.parts());
    }
}
