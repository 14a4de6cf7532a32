use crate::{
    Bounds, Host, MapEvent, Position, Subscription, TileId, ZoomRange,
    host::{AttributionId, LayerRegistration},
    options::LayerOptions,
    position::{Viewport, contains},
    sources::TileSource,
    tiling::Grid,
    zones::{Cause, ZoneResolver},
};

enum State {
    Disabled,
    Enabled {
        /// Listeners added by [`Layer::enable`], removed by [`Layer::disable`].
        subscriptions: Vec<(Subscription, MapEvent)>,
    },
}

/// Tile layer of a single provider, displayed with the grid its resolver picks for the
/// current viewport.
pub struct Layer {
    source: Box<dyn TileSource>,
    resolver: Box<dyn ZoneResolver>,
    name: String,
    zoom_range: ZoomRange,
    state: State,
    attribution: Option<AttributionId>,

    /// Keeps the token alive while the map is used, whatever the selected layer.
    token_listener: Option<Subscription>,
}

impl Layer {
    pub fn new<S, R>(source: S, resolver: R, options: &LayerOptions) -> Self
    where
        S: TileSource + 'static,
        R: ZoneResolver + 'static,
    {
        Self {
            name: options.name_or(&source.name()),
            zoom_range: options.zoom_range_or(source.zoom_range()),
            source: Box::new(source),
            resolver: Box::new(resolver),
            state: State::Disabled,
            attribution: None,
            token_listener: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    pub fn coverage(&self) -> Vec<Bounds> {
        self.source.coverage()
    }

    /// Whether the source has tiles for `position`.
    pub fn covers(&self, position: Position) -> bool {
        self.source
            .coverage()
            .iter()
            .any(|bounds| contains(bounds, position))
    }

    /// Grid the tiles are currently laid out in.
    pub fn grid(&self) -> &Grid {
        self.resolver.grid()
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, State::Enabled { .. })
    }

    /// Make the layer known to the host under `id` and add its, initially hidden, attribution.
    /// Does nothing if already registered.
    pub fn register(&mut self, host: &mut dyn Host, id: &str) {
        if self.attribution.is_some() {
            log::debug!("{} is already registered.", self.name);
            return;
        }

        host.register_layer(LayerRegistration {
            id: id.to_owned(),
            name: self.name.clone(),
            tile_size: self.source.tile_size(),
            zoom_range: self.zoom_range,
        });

        self.attribution = Some(host.add_attribution(&self.source.attribution()));

        if self.source.token().is_some() {
            self.token_listener = Some(host.subscribe(MapEvent::Idle));
        }
    }

    /// Start following the viewport. Calling it on an enabled layer only resolves the zone
    /// again.
    pub fn enable(&mut self, host: &mut dyn Host) {
        self.resolve(host, Cause::Enabled);

        if !self.is_enabled() {
            log::debug!("Enabling {}.", self.name);
            let subscriptions = self
                .resolver
                .events()
                .iter()
                .map(|&event| (host.subscribe(event), event))
                .collect();
            self.state = State::Enabled { subscriptions };
        }

        if let Some(attribution) = self.attribution {
            host.set_attribution_visible(attribution, true);
        }
    }

    /// Stop following the viewport. Does nothing if already disabled.
    pub fn disable(&mut self, host: &mut dyn Host) {
        let State::Enabled { subscriptions } = std::mem::replace(&mut self.state, State::Disabled)
        else {
            return;
        };

        log::debug!("Disabling {}.", self.name);
        for (subscription, _) in subscriptions {
            host.unsubscribe(subscription);
        }

        if let Some(attribution) = self.attribution {
            host.set_attribution_visible(attribution, false);
        }
    }

    /// Handle an event delivered to `subscription`. Returns `false` if the subscription does
    /// not belong to this layer, which is the case for events queued before [`Layer::disable`].
    pub fn notify(&mut self, host: &mut dyn Host, subscription: Subscription) -> bool {
        if self.token_listener == Some(subscription) {
            if let Some(token) = self.source.token() {
                token.borrow_mut().acquire();
            }
            return true;
        }

        let event = match &self.state {
            State::Enabled { subscriptions } => subscriptions
                .iter()
                .find(|(s, _)| *s == subscription)
                .map(|(_, event)| *event),
            State::Disabled => None,
        };

        match event {
            Some(event) => {
                self.resolve(host, Cause::Event(event));
                true
            }
            None => false,
        }
    }

    pub fn tile_url(&mut self, tile_id: TileId) -> String {
        let url = self.source.tile_url(self.resolver.grid(), tile_id);
        log::trace!("{tile_id:?} of {} is at {url}.", self.name);
        url
    }

    fn resolve(&mut self, host: &mut dyn Host, cause: Cause) {
        let Some(viewport) = Viewport::from_host(host) else {
            log::debug!("Map center is not known yet, not resolving {}.", self.name);
            return;
        };

        let adjustment = self.resolver.update(cause, &viewport);

        if let Some(zoom) = adjustment.zoom {
            host.set_zoom(zoom);
        }

        if let Some(center) = adjustment.recenter {
            host.set_center(center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::testing::RecordingHost,
        lat_lon,
        options::TokenOptions,
        sources::{LayerKind, geoportail, iberpix, swisstopo},
        token::{
            TokenLifecycle,
            testing::{Call, FakeIssuer},
        },
        zones::Zone,
    };

    fn spain() -> Layer {
        iberpix(LayerKind::Map, &LayerOptions::default()).unwrap()
    }

    #[test]
    fn registration() {
        let mut host = RecordingHost::at(lat_lon(40., -3.), 12);
        let mut layer = spain();
        layer.register(&mut host, "WTGMAP.0");

        assert_eq!(
            vec![LayerRegistration {
                id: "WTGMAP.0".to_owned(),
                name: "IGNE MAP".to_owned(),
                tile_size: 256,
                zoom_range: ZoomRange::new(6, 18).unwrap(),
            }],
            host.registered
        );
        assert_eq!(1, host.attributions.len());
        assert!(host.visible_attributions().is_empty());
        assert!(host.subscriptions.is_empty());
    }

    #[test]
    fn registered_only_once() {
        let token = TokenLifecycle::new(TokenOptions::default(), FakeIssuer::default()).shared();
        let mut host = RecordingHost::at(lat_lon(46.5, 2.5), 8);
        let mut layer = geoportail(LayerKind::Map, token, &LayerOptions::default()).unwrap();

        layer.register(&mut host, "WTGMAP.1");
        layer.register(&mut host, "WTGMAP.1");

        assert_eq!(1, host.registered.len());
        assert_eq!(1, host.attributions.len());
        assert_eq!(1, host.listeners(MapEvent::Idle).len());
    }

    #[test]
    fn options_override_name_and_zoom_range() {
        let options = LayerOptions {
            name: Some("Mapa".to_owned()),
            zoom_range: Some(ZoomRange::new(8, 16).unwrap()),
        };
        let layer = iberpix(LayerKind::Map, &options).unwrap();
        assert_eq!("Mapa", layer.name());
        assert_eq!(16, layer.zoom_range().max());
    }

    #[test]
    fn madrid_then_west_of_6() {
        let _ = env_logger::try_init();
        let mut host = RecordingHost::at(lat_lon(40., -3.), 12);
        let mut layer = spain();
        layer.register(&mut host, "WTGMAP.0");

        layer.enable(&mut host);
        assert_eq!(Zone::Utm(30), layer.grid().zone());
        assert!(host.set_center_calls.is_empty());
        assert_eq!(vec!["http://www.ign.es"], host.visible_attributions());

        let moved = lat_lon(40., -7.);
        host.center = Some(moved);
        for subscription in host.listeners(MapEvent::CenterChanged) {
            assert!(layer.notify(&mut host, subscription));
        }

        assert_eq!(Zone::Utm(29), layer.grid().zone());
        assert_eq!(vec![moved], host.set_center_calls);

        // Same position, laid out in the new zone.
        let tile_id = layer.grid().tile_id(moved, 12);
        let center = layer.grid().tile_center(tile_id);
        assert!((center.x() - moved.x()).abs() < 0.1);
        assert!((center.y() - moved.y()).abs() < 0.1);
        assert!(layer.tile_url(tile_id).contains(";z=29;"));
    }

    #[test]
    fn subscriptions_do_not_leak() {
        let mut host = RecordingHost::at(lat_lon(40., -3.), 12);
        let mut layer = spain();
        layer.register(&mut host, "WTGMAP.0");

        for _ in 0..3 {
            layer.enable(&mut host);
            layer.enable(&mut host);
            assert!(layer.is_enabled());
            assert_eq!(2, host.subscriptions.len());

            layer.disable(&mut host);
            layer.disable(&mut host);
            assert!(!layer.is_enabled());
            assert!(host.subscriptions.is_empty());
            assert!(host.visible_attributions().is_empty());
        }
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut host = RecordingHost::at(lat_lon(40., -3.), 12);
        let mut layer = spain();
        layer.enable(&mut host);
        let stale = host.listeners(MapEvent::CenterChanged)[0];
        layer.disable(&mut host);

        host.center = Some(lat_lon(40., -7.));
        assert!(!layer.notify(&mut host, stale));
        assert_eq!(Zone::Utm(30), layer.grid().zone());
        assert!(host.set_center_calls.is_empty());
    }

    #[test]
    fn unknown_center_skips_the_cycle() {
        let mut host = RecordingHost::default();
        let mut layer = spain();
        layer.enable(&mut host);
        assert!(layer.is_enabled());
        assert!(host.set_center_calls.is_empty());
    }

    #[test]
    fn swiss_zoom_skip_is_applied_to_the_host() {
        let mut host = RecordingHost::at(lat_lon(46.95, 7.44), 9);
        let mut layer = swisstopo(LayerKind::Map, &LayerOptions::default()).unwrap();
        layer.enable(&mut host);

        host.zoom = 10;
        let subscription = host.listeners(MapEvent::ZoomChanged)[0];
        layer.notify(&mut host, subscription);

        assert_eq!(vec![11], host.set_zoom_calls);
        assert_eq!(11, host.zoom);
        assert_eq!(100., layer.grid().resolution(11));
    }

    #[test]
    fn map_activity_keeps_the_token_while_disabled() {
        let issuer = FakeIssuer::default();
        let token = TokenLifecycle::new(TokenOptions::default(), issuer.clone()).shared();
        let mut host = RecordingHost::at(lat_lon(46.5, 2.5), 8);
        let mut layer = geoportail(LayerKind::Map, token.clone(), &LayerOptions::default()).unwrap();
        layer.register(&mut host, "WTGMAP.1");

        let idle = host.listeners(MapEvent::Idle);
        assert_eq!(1, idle.len());
        assert!(!layer.is_enabled());

        assert!(layer.notify(&mut host, idle[0]));
        token.borrow_mut().tick();
        assert!(token.borrow().is_scheduled());
        assert_eq!(vec![Call::Request(None)], issuer.calls());
    }
}
