//! Capabilities required from the slippy map widget hosting the layers.

use crate::{Position, VisibleBounds, ZoomRange, sources::Attribution};

/// Notifications a layer or the manager can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEvent {
    ZoomChanged,
    CenterChanged,
    BoundsChanged,
    /// Map stopped moving.
    Idle,
    SelectedLayerChanged,
}

/// Handle of a listener registered with [`Host::subscribe`]. The host calls back with it
/// through [`crate::MapTypeManager::notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Handle of an attribution control added with [`Host::add_attribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributionId(pub u64);

/// Everything the host needs to know to offer a layer as a map type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRegistration {
    /// Identifier to pass back to [`crate::MapTypeManager::tile_url`].
    pub id: String,
    pub name: String,
    pub tile_size: u32,
    pub zoom_range: ZoomRange,
}

/// Slippy map widget. All calls happen on the thread driving the widget.
pub trait Host {
    /// Position at the center of the map, `None` if not known yet.
    fn center(&self) -> Option<Position>;
    fn set_center(&mut self, position: Position);

    fn zoom(&self) -> u8;
    fn set_zoom(&mut self, zoom: u8);

    /// Area currently visible, `None` if not known yet.
    fn visible_bounds(&self) -> Option<VisibleBounds>;

    fn subscribe(&mut self, event: MapEvent) -> Subscription;
    fn unsubscribe(&mut self, subscription: Subscription);

    /// Map type currently chosen by the user.
    fn selected_layer(&self) -> Option<String>;
    fn select_layer(&mut self, id: &str);

    /// Map types the user can choose from.
    fn set_selectable_layers(&mut self, ids: &[String]);

    fn register_layer(&mut self, registration: LayerRegistration);

    /// Add a hidden attribution control.
    fn add_attribution(&mut self, attribution: &Attribution) -> AttributionId;
    fn set_attribution_visible(&mut self, id: AttributionId, visible: bool);
}
