#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

pub mod crs;
mod host;
#[cfg(feature = "http")]
pub mod io;
mod layer;
mod manager;
mod options;
mod position;
pub mod sources;
pub mod tiling;
mod token;
pub mod zones;
mod zoom;

pub use crs::{Crs, InvalidCrs, Projection};
pub use host::{AttributionId, Host, LayerRegistration, MapEvent, Subscription};
pub use layer::Layer;
pub use manager::{DEFAULT_BASE_IDS, MapTypeManager, layer_id};
pub use options::{LayerOptions, TokenOptions};
pub use position::{
    Bounds, Position, Projected, Viewport, VisibleBounds, bounds, lat_lon, lon_lat, visible_bounds,
};
pub use sources::{Attribution, LayerKind, TileSource};
pub use tiling::{Grid, TILE_SIZE, TileId};
pub use token::{SharedToken, TokenIssuer, TokenLifecycle};
pub use zoom::{InvalidZoom, ZoomRange};
