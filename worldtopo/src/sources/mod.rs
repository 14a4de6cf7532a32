//! Tile servers of the national mapping agencies. Make sure you follow terms of usage of the
//! particular source.

mod geoportail;
mod iberpix;
mod swisstopo;

pub use geoportail::{Geoportail, geoportail};
pub use iberpix::{Iberpix, iberpix};
pub use swisstopo::{SwissTopo, swisstopo};

use crate::{Bounds, TileId, ZoomRange, tiling::Grid, tiling::TILE_SIZE, token::SharedToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub text: &'static str,
    pub url: &'static str,
    /// Path of the logo image, relative to the host's assets.
    pub logo: Option<&'static str>,
}

/// Kind of imagery served by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum LayerKind {
    /// Topographic map.
    #[default]
    Map,
    /// Orthophotos.
    Photo,
}

impl LayerKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Map => "MAP",
            Self::Photo => "PHOTO",
        }
    }
}

/// Remote tile server of a layer.
pub trait TileSource {
    /// Default name shown in the map type selector.
    fn name(&self) -> String;

    /// URL of `tile_id` in `grid`. Takes `&mut self`, as some sources rotate between mirrors
    /// or count tile requests.
    fn tile_url(&mut self, grid: &Grid, tile_id: TileId) -> String;

    fn attribution(&self) -> Attribution;

    /// Areas the source has tiles for.
    fn coverage(&self) -> Vec<Bounds>;

    fn zoom_range(&self) -> ZoomRange;

    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }

    /// Token the tile URLs depend on, if any.
    fn token(&self) -> Option<SharedToken> {
        None
    }
}

/// Round-robin over numbered mirror host names.
#[derive(Debug, Clone)]
pub(crate) struct Mirrors {
    count: usize,
    next: usize,
}

impl Mirrors {
    pub const fn new(count: usize) -> Self {
        Self { count, next: 0 }
    }

    pub fn next(&mut self) -> usize {
        let mirror = self.next % self.count;
        self.next = self.next.wrapping_add(1);
        mirror
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_go_round() {
        let mut mirrors = Mirrors::new(4);
        let picked: Vec<_> = (0..6).map(|_| mirrors.next()).collect();
        assert_eq!(vec![0, 1, 2, 3, 0, 1], picked);
    }

    #[test]
    fn kind_labels() {
        assert_eq!("MAP", LayerKind::default().label());
        assert_eq!("PHOTO", LayerKind::Photo.label());
    }
}
