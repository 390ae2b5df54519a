use serde::Serialize;
use tracing::{debug, warn};

use crate::channel::HostChannel;
use crate::error::BridgeError;
use crate::protocol::{Envelope, OutboundMessage};
use crate::stats::TransportStats;

/// Something that can be posted to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Message(OutboundMessage),
    /// Pre-encoded text, sent as-is.
    Text(String),
}

impl From<OutboundMessage> for Payload {
    fn from(m: OutboundMessage) -> Self {
        Payload::Message(m)
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

/// Best-effort transport over a [`HostChannel`].
///
/// Outbound messages are never queued or retried, and no failure is returned
/// to the caller: an absent host, a rejected send, or an unencodable payload
/// all end in a log line and a counter bump.
#[derive(Debug)]
pub struct Bridge<C> {
    channel: C,
    stats: TransportStats,
}

impl<C: HostChannel> Bridge<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            stats: TransportStats::default(),
        }
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    pub fn post(&mut self, payload: impl Into<Payload>) {
        match payload.into() {
            Payload::Text(text) => {
                if self.host_available() {
                    self.send_text(&text);
                }
            }
            Payload::Message(message) => self.post_serialized(&message),
        }
    }

    fn post_serialized<T: Serialize + ?Sized>(&mut self, value: &T) {
        if !self.host_available() {
            return;
        }
        match encode(value) {
            Ok(text) => self.send_text(&text),
            Err(err) => {
                self.stats.dropped_serialize += 1;
                warn!(%err, "dropping outbound payload");
            }
        }
    }

    pub fn post_error(&mut self, message: impl Into<String>) {
        self.post(OutboundMessage::error(message));
    }

    /// Parse one inbound text event and hand a typed envelope to `handler`.
    ///
    /// Invalid JSON is reported back to the host as `WEBVIEW_ERROR`; values
    /// without a usable `type` are dropped quietly. `handler` runs at most
    /// once, before this returns.
    pub fn on_message<F>(&mut self, raw: &str, handler: F)
    where
        F: FnOnce(Envelope),
    {
        let value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                self.stats.malformed += 1;
                let err = BridgeError::Parse(err.to_string());
                debug!(%err, "rejecting inbound message");
                self.post_error(format!("failed to parse message {raw:?}: {err}"));
                return;
            }
        };

        let Some(envelope) = Envelope::from_value(value) else {
            self.stats.untyped += 1;
            debug!("dropping inbound message without a type");
            return;
        };

        self.stats.dispatched += 1;
        handler(envelope);
    }

    fn host_available(&mut self) -> bool {
        let available = self.channel.is_available();
        if !available {
            self.stats.dropped_unavailable += 1;
        }
        available
    }

    fn send_text(&mut self, text: &str) {
        match self.channel.send(text) {
            Ok(()) => self.stats.posted += 1,
            Err(err) => {
                self.stats.dropped_send += 1;
                debug!(%err, "host channel send failed");
            }
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, BridgeError> {
    serde_json::to_string(value).map_err(|e| BridgeError::Serialize(e.to_string()))
}
