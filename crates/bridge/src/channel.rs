use crate::error::BridgeError;

/// The host shell's one-way text send primitive.
pub trait HostChannel {
    /// `false` when the runtime is not hosted (e.g. opened in a plain browser).
    fn is_available(&self) -> bool;

    fn send(&self, text: &str) -> Result<(), BridgeError>;
}

/// A channel with no host behind it. Every send is absorbed.
#[derive(Debug, Default, Copy, Clone)]
pub struct Disconnected;

impl HostChannel for Disconnected {
    fn is_available(&self) -> bool {
        false
    }

    fn send(&self, _text: &str) -> Result<(), BridgeError> {
        Err(BridgeError::ChannelUnavailable)
    }
}

impl<C: HostChannel + ?Sized> HostChannel for &C {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn send(&self, text: &str) -> Result<(), BridgeError> {
        (**self).send(text)
    }
}
