use super::{Attribution, LayerKind, TileSource};
use crate::{
    Bounds, Layer, TileId, ZoomRange,
    crs::InvalidCrs,
    options::LayerOptions,
    tiling::Grid,
    token::SharedToken,
    zones::{TERRITORIES, TerritoryResolver},
};

/// IGN France's Géoportail, as a tiled WMS. Every URL carries a token, see
/// [`crate::TokenLifecycle`].
/// <http://www.ign.fr>
pub struct Geoportail {
    kind: LayerKind,
    token: SharedToken,
}

impl Geoportail {
    pub fn new(kind: LayerKind, token: SharedToken) -> Self {
        Self { kind, token }
    }

    fn layer(&self) -> &'static str {
        match self.kind {
            LayerKind::Map => "GEOGRAPHICALGRIDSYSTEMS.MAPS",
            LayerKind::Photo => "ORTHOIMAGERY.ORTHOPHOTOS",
        }
    }
}

/// Tile extent in projected units, as `min x, min y, max x, max y`.
fn bbox(grid: &Grid, tile_id: TileId) -> String {
    let span = grid.tile_span(tile_id.zoom);
    let (x, y) = (tile_id.x, tile_id.y);

    // Negating integers keeps `-0` out of the URL.
    format!(
        "{},{},{},{}",
        x as f64 * span,
        (-y - 1) as f64 * span,
        (x + 1) as f64 * span,
        (-y) as f64 * span
    )
}

impl TileSource for Geoportail {
    fn name(&self) -> String {
        "IGN".to_owned()
    }

    fn tile_url(&mut self, grid: &Grid, tile_id: TileId) -> String {
        let token = self.token.borrow_mut().acquire().unwrap_or_default();

        format!(
            "http://wxs.ign.fr/geoportail/wmsc?LAYERS={}&EXCEPTIONS=text/xml&FORMAT=image/jpeg\
            &SERVICE=WMS&VERSION=1.1.1&REQUEST=GetMap&STYLES=&SRS={}&BBOX={}\
            &WIDTH=256&HEIGHT=256&TILED=true&gppkey={}",
            self.layer(),
            grid.crs().name(),
            bbox(grid, tile_id),
            token
        )
    }

    fn attribution(&self) -> Attribution {
        match self.kind {
            LayerKind::Map => Attribution {
                text: "Copyright Ign",
                url: "http://www.ign.fr",
                logo: Some("img/logo_ign.gif"),
            },
            LayerKind::Photo => Attribution {
                text: "Copyright Planet Observer",
                url: "http://www.planetobserver.com",
                logo: Some("img/logo_planetobserver.gif"),
            },
        }
    }

    fn coverage(&self) -> Vec<Bounds> {
        TERRITORIES.iter().map(|t| t.bounds()).collect()
    }

    fn zoom_range(&self) -> ZoomRange {
        ZoomRange::fixed(2, 18)
    }

    fn token(&self) -> Option<SharedToken> {
        Some(self.token.clone())
    }
}

/// French layer, switching between Miller and the territorial projections as the map moves.
/// Layers of both kinds should share the same `token`.
pub fn geoportail(
    kind: LayerKind,
    token: SharedToken,
    options: &LayerOptions,
) -> Result<Layer, InvalidCrs> {
    Ok(Layer::new(
        Geoportail::new(kind, token),
        TerritoryResolver::new()?,
        options,
    ))
}
