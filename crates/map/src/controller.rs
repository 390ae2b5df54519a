use bridge::{Bridge, Envelope, HostChannel, InboundCommand, OutboundMessage, TransportStats};
use foundation::LonLat;
use layers::{LayerCache, LayerError, LayerHandle, LayerKey, ProviderRegistry};
use tracing::{debug, warn};

use crate::backend::{MapBackend, MountTarget};
use crate::config::MapConfig;
use crate::error::MapError;
use crate::map_runtime::MapRuntime;
use crate::surface::MapSurface;
use crate::switcher::BaseLayerSwitcher;

/// Wires the runtime, layer cache, switcher and bridge together and turns
/// host commands into operations on them.
#[derive(Debug)]
pub struct MapController<B, C> {
    providers: ProviderRegistry,
    runtime: MapRuntime<B>,
    cache: LayerCache,
    switcher: BaseLayerSwitcher,
    bridge: Bridge<C>,
}

impl<B: MapBackend, C: HostChannel> MapController<B, C> {
    pub fn new(config: &MapConfig, channel: C) -> Result<Self, MapError> {
        let view = config.view_options()?;
        Ok(Self {
            providers: ProviderRegistry::new(config.tianditu_token.clone()),
            runtime: MapRuntime::new(view),
            cache: LayerCache::new(),
            switcher: BaseLayerSwitcher::new(),
            bridge: Bridge::new(channel),
        })
    }

    /// Mount the map, or return the already mounted one.
    ///
    /// The host receives `WEBVIEW_MAP_READY` the first time a surface is
    /// created, and `WEBVIEW_ERROR` if mounting fails.
    pub fn initialize<F>(
        &mut self,
        target: MountTarget,
        backend: F,
    ) -> Result<&mut MapSurface<B>, MapError>
    where
        F: FnOnce() -> B,
    {
        let fresh = !self.runtime.is_initialized();
        let surface = match self.runtime.initialize(target, backend) {
            Ok(surface) => surface,
            Err(err) => {
                self.bridge.post_error(err.to_string());
                return Err(err);
            }
        };
        if fresh {
            let view = surface.view();
            self.bridge.post(OutboundMessage::MapReady {
                center: view.center.into(),
                zoom: view.zoom,
            });
        }
        Ok(surface)
    }

    /// Per-render-frame hook.
    pub fn on_frame(&mut self) {
        if let Some(message) = self.runtime.tick() {
            self.bridge.post(message);
        }
    }

    /// Entry point for raw text events from the host.
    pub fn on_host_message(&mut self, raw: &str) {
        let mut received = None;
        self.bridge.on_message(raw, |envelope| received = Some(envelope));
        if let Some(envelope) = received {
            self.handle_envelope(envelope);
        }
    }

    fn handle_envelope(&mut self, envelope: Envelope) {
        match InboundCommand::from_envelope(&envelope) {
            Ok(Some(command)) => self.dispatch(command),
            Ok(None) => debug!(kind = envelope.kind(), "ignoring unknown host message"),
            Err(err) => self.bridge.post_error(err.to_string()),
        }
    }

    pub fn dispatch(&mut self, command: InboundCommand) {
        match command {
            InboundCommand::SwitchBaseLayers { layers } => {
                self.switch_base_layers(layers.as_slice())
            }
            InboundCommand::Recenter { center, zoom } => {
                let Some(surface) = self.runtime.current_mut() else {
                    debug!("recenter before map init; ignoring");
                    return;
                };
                if let Err(err) = surface.recenter(LonLat::from(center), zoom) {
                    self.bridge.post_error(err.to_string());
                }
            }
            InboundCommand::ResetRotation => match self.runtime.current_mut() {
                Some(surface) => surface.set_rotation(0.0),
                None => debug!("rotation reset before map init; ignoring"),
            },
        }
    }

    /// Fetch or build the layer for `key`.
    pub fn layer(&mut self, key: &str) -> Result<LayerHandle, LayerError> {
        let key = LayerKey::parse(key)?;
        let providers = &self.providers;
        self.cache
            .get_or_create(key, |k| Ok(providers.source_for(k)))
    }

    /// Resolve `keys` and make them the base layers.
    ///
    /// If any key cannot be resolved the host gets `WEBVIEW_ERROR` and the
    /// current layers stay as they are.
    pub fn switch_base_layers<S: AsRef<str>>(&mut self, keys: &[S]) {
        if !self.runtime.is_initialized() {
            debug!("base layer switch before map init; ignoring");
            return;
        }
        if keys.is_empty() {
            debug!("empty base layer switch; ignoring");
            return;
        }

        let mut targets = Vec::with_capacity(keys.len());
        for key in keys {
            match self.layer(key.as_ref()) {
                Ok(handle) => targets.push(handle),
                Err(err) => {
                    warn!(%err, "abandoning base layer switch");
                    self.bridge.post_error(err.to_string());
                    return;
                }
            }
        }

        self.switcher
            .switch_base_layers(self.runtime.current_mut(), &targets);
    }

    pub fn runtime(&self) -> &MapRuntime<B> {
        &self.runtime
    }

    pub fn cache(&self) -> &LayerCache {
        &self.cache
    }

    pub fn active_layers(&self) -> &[LayerHandle] {
        self.switcher.active()
    }

    pub fn stats(&self) -> TransportStats {
        self.bridge.stats()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::MapController;
    use crate::backend::{MapBackend, MountTarget};
    use crate::config::MapConfig;
    use crate::headless::HeadlessBackend;
    use bridge::{BridgeError, HostChannel};
    use foundation::LonLat;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[derive(Default)]
    struct Host {
        sent: RefCell<Vec<Value>>,
    }

    impl Host {
        fn kinds(&self) -> Vec<String> {
            self.sent
                .borrow()
                .iter()
                .map(|v| v["type"].as_str().unwrap_or_default().to_string())
                .collect()
        }

        fn take(&self) -> Vec<Value> {
            std::mem::take(&mut *self.sent.borrow_mut())
        }
    }

    impl HostChannel for Host {
        fn is_available(&self) -> bool {
            true
        }

        fn send(&self, text: &str) -> Result<(), BridgeError> {
            let value = serde_json::from_str(text).map_err(|e| BridgeError::Send(e.to_string()))?;
            self.sent.borrow_mut().push(value);
            Ok(())
        }
    }

    fn controller(host: &Host) -> MapController<HeadlessBackend, &Host> {
        let config = MapConfig {
            tianditu_token: "tk".into(),
            ..MapConfig::default()
        };
        MapController::new(&config, host).unwrap()
    }

    fn layer_keys(c: &MapController<HeadlessBackend, &Host>) -> Vec<String> {
        c.runtime()
            .current()
            .map(|s| s.layers().iter().map(|l| l.key().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn ready_is_posted_once() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        c.initialize(MountTarget::new("other"), HeadlessBackend::new)
            .unwrap();

        assert_eq!(
            host.take(),
            vec![json!({"type": "WEBVIEW_MAP_READY", "center": [116.391, 39.907], "zoom": 12.0})]
        );
    }

    #[test]
    fn mount_failure_is_reported_and_returned() {
        let host = Host::default();
        let mut c = controller(&host);
        let result = c.initialize(MountTarget::new("missing"), || {
            HeadlessBackend::rejecting_mount("element not found")
        });
        assert!(result.is_err());
        assert_eq!(host.kinds(), vec!["WEBVIEW_ERROR"]);
        assert!(!c.runtime().is_initialized());
    }

    #[test]
    fn host_switch_commands_drive_layers() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        host.take();

        c.on_host_message(
            r#"{"type":"SWITCH_BASE_LAYERS","layers":["tdSatellite","tdSatelliteLabel"]}"#,
        );
        assert_eq!(layer_keys(&c), vec!["tdSatellite", "tdSatelliteLabel"]);

        let custom = "https://tiles.example.com/{z}/{x}/{y}.png";
        c.on_host_message(&json!({"type": "SWITCH_BASE_LAYERS", "layers": [custom]}).to_string());
        assert_eq!(layer_keys(&c), vec![custom]);

        c.on_host_message(r#"{"type":"SWITCH_BASE_LAYERS","layers":["tdSatellite"]}"#);
        assert_eq!(c.cache().len(), 3);
        assert!(host.take().is_empty());
    }

    #[test]
    fn unknown_layer_key_aborts_whole_switch() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        c.switch_base_layers(&["tdVector"]);
        host.take();

        c.switch_base_layers(&["tdSatellite", "nonsense"]);

        assert_eq!(layer_keys(&c), vec!["tdVector"]);
        let sent = host.take();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]["message"].as_str().unwrap().contains("nonsense"));
    }

    #[test]
    fn switch_before_init_touches_nothing() {
        let host = Host::default();
        let mut c = controller(&host);
        c.on_host_message(r#"{"type":"SWITCH_BASE_LAYERS","layers":["tdSatellite"]}"#);
        assert!(c.cache().is_empty());
        assert!(c.active_layers().is_empty());
        assert!(host.take().is_empty());
    }

    #[test]
    fn rotation_changes_reach_host_once_each() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        host.take();

        let rotations = [0.0, 0.0, 0.0, 1.2, 1.2, 0.4];
        for r in rotations {
            if let Some(surface) = c.runtime.current_mut() {
                surface.backend_mut().set_rotation(r);
            }
            c.on_frame();
        }

        let sent = host.take();
        let payloads: Vec<f64> = sent
            .iter()
            .map(|v| {
                assert_eq!(v["type"], json!("WEBVIEW_MAP_ROTATE"));
                v["rotation"].as_f64().unwrap()
            })
            .collect();
        assert_eq!(payloads, vec![0.0, 1.2, 0.4]);
    }

    #[test]
    fn reset_rotation_and_recenter() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        if let Some(surface) = c.runtime.current_mut() {
            surface.backend_mut().set_rotation(0.8);
        }

        c.on_host_message(r#"{"type":"RESET_ROTATION"}"#);
        c.on_host_message(r#"{"type":"RECENTER","center":[113.26,23.13],"zoom":30}"#);

        let surface = c.runtime().current().unwrap();
        assert_eq!(surface.rotation(), 0.0);
        assert_eq!(surface.view().center, LonLat::new(113.26, 23.13));
        assert_eq!(surface.view().zoom, 18.0);
    }

    #[test]
    fn bad_inbound_traffic_is_contained() {
        let host = Host::default();
        let mut c = controller(&host);
        c.initialize(MountTarget::new("map"), HeadlessBackend::new)
            .unwrap();
        host.take();

        c.on_host_message("{not json");
        c.on_host_message("{}");
        c.on_host_message(r#"{"type":"OPEN_DRAWER"}"#);
        c.on_host_message(r#"{"type":"RECENTER","center":"here"}"#);

        assert_eq!(host.kinds(), vec!["WEBVIEW_ERROR", "WEBVIEW_ERROR"]);
        let stats = c.stats();
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.untyped, 1);
        assert_eq!(stats.dispatched, 2);
    }
}
