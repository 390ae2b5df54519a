//! WebAssembly entry point loaded by the host shell's web view.
//!
//! The page calls [`init_map`] once the map container exists. From then on
//! the runtime ticks on every animation frame and listens for host commands
//! posted to the web view.
//!
//! Controller calls reach into JS (renderer, `postMessage`), and JS may call
//! back in before they return. Host calls that arrive that way are queued and
//! run as soon as the outer call releases the controller.

use std::cell::RefCell;

use console_error_panic_hook::set_once;
use map::{MapConfig, MapController, MountTarget};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, MessageEvent};

mod backend;
mod console;
mod deferred;
mod frame_loop;
mod host;

use backend::JsRendererBackend;
use deferred::{Deferred, DeferredQueue};
use frame_loop::FrameLoop;
use host::WebViewChannel;

type Controller = MapController<JsRendererBackend, WebViewChannel>;

struct Shell {
    controller: Controller,
    frames: Option<FrameLoop>,
    listeners: Vec<HostListener>,
}

/// A `message` listener registered on `window` or `document`.
///
/// The Android shell dispatches host messages on `document`, iOS on `window`.
struct HostListener {
    target: EventTarget,
    callback: Closure<dyn Fn(MessageEvent)>,
}

impl Drop for HostListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
    }
}

thread_local! {
    static SHELL: RefCell<Option<Shell>> = const { RefCell::new(None) };
    static DEFERRED: DeferredQueue = const { DeferredQueue::new() };
}

enum Access<R> {
    Ran(R),
    Busy,
    Uninitialized,
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Run `f` against the controller, if one exists and is not already in use.
fn with_controller<R>(f: impl FnOnce(&mut Controller) -> R) -> Access<R> {
    SHELL.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return Access::Busy;
        };
        match slot.as_mut() {
            Some(shell) => Access::Ran(f(&mut shell.controller)),
            None => Access::Uninitialized,
        }
    })
}

fn defer(work: Deferred) {
    debug!(?work, "map runtime busy; deferring host call");
    DEFERRED.with(|queue| queue.push(work));
}

fn drain_deferred() {
    DEFERRED.with(|queue| {
        queue.drain(|work| {
            SHELL.with(|cell| {
                let Ok(mut slot) = cell.try_borrow_mut() else {
                    return Err(work);
                };
                if let Some(shell) = slot.as_mut() {
                    work.run(&mut shell.controller);
                }
                Ok(())
            })
        })
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mount the map on the element with id `target_id`.
///
/// `config` is a plain object matching `MapConfig` (camelCase keys); missing
/// keys take their defaults. Calling this again returns without changing the
/// existing map.
#[wasm_bindgen]
pub fn init_map(target_id: &str, config: JsValue) -> Result<(), JsValue> {
    let config: MapConfig = if config.is_undefined() || config.is_null() {
        MapConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(to_js)?
    };
    console::init(&config.log_level);

    SHELL.with(|cell| -> Result<(), JsValue> {
        let mut slot = cell.try_borrow_mut().map_err(to_js)?;
        if slot.is_none() {
            let controller = MapController::new(&config, WebViewChannel::new()).map_err(to_js)?;
            *slot = Some(Shell {
                controller,
                frames: None,
                listeners: Vec::new(),
            });
        }
        Ok(())
    })?;

    let mounted = with_controller(|c| {
        c.initialize(MountTarget::new(target_id), JsRendererBackend::new)
            .map(|_| ())
    });
    match mounted {
        Access::Ran(result) => result.map_err(to_js)?,
        Access::Busy => return Err(JsValue::from_str("map runtime busy")),
        Access::Uninitialized => return Ok(()),
    }
    drain_deferred();

    SHELL.with(|cell| {
        let mut slot = cell.try_borrow_mut().map_err(to_js)?;
        let Some(shell) = slot.as_mut() else {
            return Ok(());
        };
        if shell.frames.is_none() {
            shell.frames = Some(FrameLoop::start(|| {
                if let Access::Ran(()) = with_controller(|c| c.on_frame()) {
                    drain_deferred();
                }
            })?);
        }
        if shell.listeners.is_empty() {
            shell.listeners = listen_for_host_messages()?;
        }
        Ok(())
    })
}

fn listen_for_host_messages() -> Result<Vec<HostListener>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let mut targets: Vec<EventTarget> = vec![window.clone().into()];
    if let Some(document) = window.document() {
        targets.push(document.into());
    }

    let mut listeners = Vec::with_capacity(targets.len());
    for target in targets {
        let callback = Closure::<dyn Fn(MessageEvent)>::new(|event: MessageEvent| {
            let Some(raw) = event.data().as_string() else {
                debug!("ignoring non-text message event");
                return;
            };
            handle_host_message(&raw);
        });
        target.add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())?;
        listeners.push(HostListener { target, callback });
    }
    Ok(listeners)
}

/// Feed one raw host message to the runtime.
///
/// Exposed for shells that inject script instead of posting message events.
#[wasm_bindgen]
pub fn handle_host_message(raw: &str) {
    match with_controller(|c| c.on_host_message(raw)) {
        Access::Ran(()) => drain_deferred(),
        Access::Busy => defer(Deferred::HostMessage(raw.to_string())),
        Access::Uninitialized => debug!("host message before map init; dropping"),
    }
}

/// Replace the base layers with `keys` (provider names or tile URLs).
#[wasm_bindgen]
pub fn switch_base_layers(keys: Vec<String>) {
    match with_controller(|c| c.switch_base_layers(keys.as_slice())) {
        Access::Ran(()) => drain_deferred(),
        Access::Busy => defer(Deferred::SwitchBaseLayers(keys)),
        Access::Uninitialized => debug!("base layer switch before map init; dropping"),
    }
}

/// Current view rotation in radians, if the map is mounted.
#[wasm_bindgen]
pub fn map_rotation() -> Option<f64> {
    match with_controller(|c| c.runtime().current().map(|s| s.rotation())) {
        Access::Ran(rotation) => rotation,
        Access::Busy | Access::Uninitialized => None,
    }
}
