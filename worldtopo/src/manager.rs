//! Offers only the layers covering the map center, and keeps only the selected one enabled.

use crate::{Host, Layer, MapEvent, Subscription, TileId};

/// Map types of Google-like hosts, offered when no other base map types are given.
pub const DEFAULT_BASE_IDS: [&str; 3] = ["roadmap", "terrain", "satellite"];

/// Identifier of the managed layer at `index`.
pub fn layer_id(index: usize) -> String {
    format!("WTGMAP.{index}")
}

pub struct MapTypeManager {
    layers: Vec<(String, Layer)>,

    /// Host's own map types, always selectable. First one is the fallback.
    base_ids: Vec<String>,

    /// Selectable map types last pushed to the host.
    pushed: Option<Vec<String>>,

    subscriptions: Vec<(Subscription, MapEvent)>,
}

impl MapTypeManager {
    pub fn new(layers: Vec<Layer>, base_ids: Vec<String>) -> Self {
        Self {
            layers: layers
                .into_iter()
                .enumerate()
                .map(|(index, layer)| (layer_id(index), layer))
                .collect(),
            base_ids,
            pushed: None,
            subscriptions: Vec::new(),
        }
    }

    /// Manager on top of [`DEFAULT_BASE_IDS`].
    pub fn with_default_base(layers: Vec<Layer>) -> Self {
        Self::new(
            layers,
            DEFAULT_BASE_IDS.iter().map(|&id| id.to_owned()).collect(),
        )
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|(i, _)| i == id).map(|(_, l)| l)
    }

    /// Identifiers of the managed layers, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(id, _)| id.as_str())
    }

    /// Identifier of the enabled layer, if any.
    pub fn enabled(&self) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, layer)| layer.is_enabled())
            .map(|(id, _)| id.as_str())
    }

    /// Register the layers with the host and start following it.
    pub fn register(&mut self, host: &mut dyn Host) {
        for (id, layer) in &mut self.layers {
            layer.register(host, id);
        }

        if self.subscriptions.is_empty() {
            self.subscriptions = [MapEvent::BoundsChanged, MapEvent::SelectedLayerChanged]
                .into_iter()
                .map(|event| (host.subscribe(event), event))
                .collect();
        }

        self.activate(host);
        self.enable_selected(host);
    }

    /// Handle an event delivered by the host to `subscription`.
    pub fn notify(&mut self, host: &mut dyn Host, subscription: Subscription) {
        let event = self
            .subscriptions
            .iter()
            .find(|(s, _)| *s == subscription)
            .map(|(_, event)| *event);

        match event {
            Some(MapEvent::BoundsChanged) => self.activate(host),
            Some(MapEvent::SelectedLayerChanged) => self.enable_selected(host),
            Some(event) => log::debug!("Unexpected {event:?}."),
            None => {
                let handled = self
                    .layers
                    .iter_mut()
                    .any(|(_, layer)| layer.notify(host, subscription));

                if !handled {
                    log::debug!("Ignoring event for {subscription:?}.");
                }
            }
        }
    }

    /// URL of a tile of the layer `id`, `None` if it is not managed here.
    pub fn tile_url(&mut self, id: &str, tile_id: TileId) -> Option<String> {
        self.layers
            .iter_mut()
            .find(|(i, _)| i == id)
            .map(|(_, layer)| layer.tile_url(tile_id))
    }

    /// Offer the layers covering the map center.
    fn activate(&mut self, host: &mut dyn Host) {
        let Some(center) = host.center() else {
            log::debug!("Map center is not known yet.");
            return;
        };

        let eligible: Vec<&String> = self
            .layers
            .iter()
            .filter(|(_, layer)| layer.covers(center))
            .map(|(id, _)| id)
            .collect();

        let selectable: Vec<String> = self
            .base_ids
            .iter()
            .chain(eligible.iter().copied())
            .cloned()
            .collect();

        if self.pushed.as_ref() != Some(&selectable) {
            log::debug!("Selectable map types: {selectable:?}.");
            host.set_selectable_layers(&selectable);
            self.pushed = Some(selectable);
        }

        let Some(selected) = host.selected_layer() else {
            return;
        };

        let managed = self.layers.iter().any(|(id, _)| *id == selected);
        if managed && !eligible.contains(&&selected) {
            match self.base_ids.first() {
                Some(fallback) => {
                    log::debug!("{selected} does not cover the map center anymore.");
                    host.select_layer(fallback);
                    self.enable_selected(host);
                }
                None => log::warn!("No map type to fall back to from {selected}."),
            }
        }
    }

    /// Enable the selected layer and disable the others.
    fn enable_selected(&mut self, host: &mut dyn Host) {
        let selected = host.selected_layer();

        // Disabling first keeps at most one layer enabled at any time.
        for (id, layer) in &mut self.layers {
            if selected.as_deref() != Some(id.as_str()) {
                layer.disable(host);
            }
        }

        for (id, layer) in &mut self.layers {
            if selected.as_deref() == Some(id.as_str()) {
                layer.enable(host);
            }
        }
    }
}
