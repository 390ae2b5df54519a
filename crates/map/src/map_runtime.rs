use bridge::OutboundMessage;
use runtime::RotationWatcher;
use tracing::{debug, info, trace};

use crate::backend::{MapBackend, MountTarget, ViewOptions};
use crate::error::MapError;
use crate::surface::MapSurface;

/// Owner of the one map surface a runtime may have.
///
/// The surface is created by the first successful [`MapRuntime::initialize`]
/// and lives as long as the runtime. Later calls hand back the same surface and
/// ignore their arguments.
#[derive(Debug)]
pub struct MapRuntime<B> {
    view: ViewOptions,
    surface: Option<MapSurface<B>>,
    watcher: Option<RotationWatcher>,
}

impl<B: MapBackend> MapRuntime<B> {
    pub fn new(view: ViewOptions) -> Self {
        Self {
            view,
            surface: None,
            watcher: None,
        }
    }

    /// Create the surface on `target`, or return the existing one.
    ///
    /// `backend` is only called when a surface is actually created. If the
    /// renderer fails to mount, nothing is kept and a later call may retry.
    pub fn initialize<F>(
        &mut self,
        target: MountTarget,
        backend: F,
    ) -> Result<&mut MapSurface<B>, MapError>
    where
        F: FnOnce() -> B,
    {
        let surface = match self.surface.take() {
            Some(existing) => {
                if existing.target() != &target {
                    debug!(
                        bound = existing.target().as_str(),
                        requested = target.as_str(),
                        "map already mounted; ignoring new target"
                    );
                }
                existing
            }
            None => {
                let surface = MapSurface::mount(target, self.view.clone(), backend())?;
                info!(target = surface.target().as_str(), "map surface mounted");
                self.watcher = Some(RotationWatcher::new());
                surface
            }
        };
        Ok(self.surface.insert(surface))
    }

    pub fn current(&self) -> Option<&MapSurface<B>> {
        self.surface.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut MapSurface<B>> {
        self.surface.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// Run the per-frame rotation check.
    ///
    /// Returns a `WEBVIEW_MAP_ROTATE` message when the rotation differs from
    /// the previous frame's. Before initialization there is nothing to watch.
    pub fn tick(&mut self) -> Option<OutboundMessage> {
        let (Some(surface), Some(watcher)) = (self.surface.as_ref(), self.watcher.as_mut()) else {
            return None;
        };
        let rotation = watcher.observe(surface.rotation())?;
        trace!(rotation, "rotation changed");
        Some(OutboundMessage::MapRotate { rotation })
    }
}
