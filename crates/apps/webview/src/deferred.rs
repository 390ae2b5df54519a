use std::cell::RefCell;
use std::collections::VecDeque;

use bridge::HostChannel;
use map::{MapBackend, MapController};

/// A host call that arrived while the controller was already in use further
/// up the stack (a renderer or `postMessage` call that re-entered the module).
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    HostMessage(String),
    SwitchBaseLayers(Vec<String>),
}

impl Deferred {
    pub fn run<B: MapBackend, C: HostChannel>(self, controller: &mut MapController<B, C>) {
        match self {
            Deferred::HostMessage(raw) => controller.on_host_message(&raw),
            Deferred::SwitchBaseLayers(keys) => controller.switch_base_layers(keys.as_slice()),
        }
    }
}

/// First-in first-out queue of deferred host calls.
///
/// The inner borrow is never held while a call runs, so a running call may
/// queue more work.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    items: RefCell<VecDeque<Deferred>>,
}

impl DeferredQueue {
    pub const fn new() -> Self {
        Self {
            items: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, work: Deferred) {
        self.items.borrow_mut().push_back(work);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Run queued calls in arrival order, including calls queued meanwhile.
    ///
    /// `run` hands the call back when the controller is still busy; it goes
    /// back to the front of the queue and draining stops.
    pub fn drain(&self, mut run: impl FnMut(Deferred) -> Result<(), Deferred>) {
        loop {
            let Some(work) = self.items.borrow_mut().pop_front() else {
                return;
            };
            if let Err(work) = run(work) {
                self.items.borrow_mut().push_front(work);
                return;
            }
        }
    }
}
