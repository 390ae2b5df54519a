use bridge::{BridgeError, HostChannel};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const HOST_OBJECT: &str = "ReactNativeWebView";

/// The native shell's `window.ReactNativeWebView.postMessage`.
///
/// Looked up on every send, since the shell injects the object after the
/// page starts loading and may replace it on reload.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebViewChannel;

impl WebViewChannel {
    pub fn new() -> Self {
        Self
    }

    fn host(&self) -> Option<(JsValue, js_sys::Function)> {
        let window = web_sys::window()?;
        let host = js_sys::Reflect::get(&window, &JsValue::from_str(HOST_OBJECT)).ok()?;
        if host.is_undefined() || host.is_null() {
            return None;
        }
        let post = js_sys::Reflect::get(&host, &JsValue::from_str("postMessage")).ok()?;
        let post = post.dyn_into::<js_sys::Function>().ok()?;
        Some((host, post))
    }
}

impl HostChannel for WebViewChannel {
    fn is_available(&self) -> bool {
        self.host().is_some()
    }

    fn send(&self, text: &str) -> Result<(), BridgeError> {
        let (host, post) = self.host().ok_or(BridgeError::ChannelUnavailable)?;
        post.call1(&host, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| BridgeError::Send(format!("{e:?}")))
    }
}
