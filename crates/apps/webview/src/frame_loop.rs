use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Calls a function on every `requestAnimationFrame` until dropped.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: web_sys::Window,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    pub fn start(mut on_frame: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let inner = Rc::new(Inner {
            window,
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let cb = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.raf_id.set(None);
            on_frame();
            inner.schedule();
        });
        *inner.callback.borrow_mut() = Some(cb);
        inner.schedule();

        Ok(Self { inner })
    }
}

impl Inner {
    fn schedule(&self) {
        let cb_ref = self.callback.borrow();
        let Some(cb) = cb_ref.as_ref() else {
            return;
        };
        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(err) => warn!(error = ?err, "requestAnimationFrame failed; frame loop stopped"),
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None) {
            let _ = self.inner.window.cancel_animation_frame(raf_id);
        }
        self.inner.callback.borrow_mut().take();
    }
}
