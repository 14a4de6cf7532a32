use super::{Attribution, LayerKind, Mirrors, TileSource};
use crate::{
    Bounds, Layer, TileId, ZoomRange,
    crs::InvalidCrs,
    options::LayerOptions,
    position::bounds,
    tiling::Grid,
    zones::{SwissResolver, swiss_zoom},
};

/// National maps and orthophotos from swisstopo's WMTS, in the Swiss grid.
/// <http://www.swisstopo.ch/>
pub struct SwissTopo {
    kind: LayerKind,
    mirrors: Mirrors,
}

impl SwissTopo {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            mirrors: Mirrors::new(4),
        }
    }

    /// Layer identifier and the date of its tiles.
    fn layer(&self) -> (&'static str, &'static str) {
        match self.kind {
            LayerKind::Map => ("ch.swisstopo.pixelkarte-farbe", "20111206"),
            LayerKind::Photo => ("ch.swisstopo.swissimage", "20110914"),
        }
    }
}

impl TileSource for SwissTopo {
    fn name(&self) -> String {
        format!("SwissTopo {}", self.kind.label())
    }

    fn tile_url(&mut self, grid: &Grid, tile_id: TileId) -> String {
        let (layer, date) = self.layer();
        let level = swiss_zoom(tile_id.zoom).map_or(0, |z| z.level);

        format!(
            "http://wmts{}.geo.admin.ch/1.0.0/{}/default/{}/{}/{}/{}/{}.jpeg",
            self.mirrors.next(),
            layer,
            date,
            grid.crs().name(),
            level,
            tile_id.y,
            tile_id.x
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© SwissTopo",
            url: "http://www.swisstopo.ch/",
            logo: None,
        }
    }

    fn coverage(&self) -> Vec<Bounds> {
        vec![bounds(45.398181, 5.140242, 48.230651, 11.47757)]
    }

    fn zoom_range(&self) -> ZoomRange {
        ZoomRange::fixed(5, 18)
    }
}

/// Swiss layer. The host is asked to skip zoom level 10 when zooming through it.
pub fn swisstopo(kind: LayerKind, options: &LayerOptions) -> Result<Layer, InvalidCrs> {
    Ok(Layer::new(SwissTopo::new(kind), SwissResolver::new()?, options))
}
