use super::{Attribution, LayerKind, Mirrors, TileSource};
use crate::{
    Bounds, Layer, TileId, ZoomRange,
    crs::InvalidCrs,
    options::LayerOptions,
    position::bounds,
    tiling::Grid,
    zones::UtmResolver,
};

const MAP_LAYERS: [&str; 4] = ["mapa_million", "mapa_mtn200", "mapa_mtn50", "mapa_mtn25"];
const PHOTO_LAYERS: [&str; 4] = ["mapa_inicio", "spot5", "pnoa", "pnoa"];

/// Topographic maps and orthophotos of Spain, served in UTM by IGN España's iberpix.
/// <http://www.ign.es>
pub struct Iberpix {
    kind: LayerKind,
    mirrors: Mirrors,
}

impl Iberpix {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            mirrors: Mirrors::new(5),
        }
    }

    /// Each scale band is served from a different map series.
    fn layer(&self, zoom: u8) -> &'static str {
        let layers = match self.kind {
            LayerKind::Map => &MAP_LAYERS,
            LayerKind::Photo => &PHOTO_LAYERS,
        };

        if zoom < 11 {
            layers[0]
        } else if zoom < 13 {
            layers[1]
        } else if zoom < 15 {
            layers[2]
        } else {
            layers[3]
        }
    }
}

impl TileSource for Iberpix {
    fn name(&self) -> String {
        format!("IGNE {}", self.kind.label())
    }

    fn tile_url(&mut self, grid: &Grid, tile_id: TileId) -> String {
        // Rows are counted northward from the equator, starting at 0.
        format!(
            "http://ts{}.iberpix.ign.es/tileserver/n={};z={};r={};i={};j={}.jpg",
            self.mirrors.next(),
            self.layer(tile_id.zoom),
            grid.zone(),
            grid.resolution(tile_id.zoom) * 1000.,
            tile_id.x,
            -(tile_id.y + 1)
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Copyright Ign",
            url: "http://www.ign.es",
            logo: Some("img/logo_igne.gif"),
        }
    }

    fn coverage(&self) -> Vec<Bounds> {
        vec![bounds(34., -13.5, 44., 4.)]
    }

    fn zoom_range(&self) -> ZoomRange {
        ZoomRange::fixed(6, 18)
    }
}

/// Spanish layer, switching UTM zones as the map moves.
pub fn iberpix(kind: LayerKind, options: &LayerOptions) -> Result<Layer, InvalidCrs> {
    Ok(Layer::new(Iberpix::new(kind), UtmResolver::new()?, options))
}
