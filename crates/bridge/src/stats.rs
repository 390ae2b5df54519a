/// Counters kept by [`crate::Bridge`] for every message it handles.
///
/// Nothing here affects delivery; the counters exist so that silent drops can
/// still be observed from tests and debug tooling.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TransportStats {
    /// Messages handed to the host channel.
    pub posted: u64,
    /// Outbound messages absorbed because no host was present.
    pub dropped_unavailable: u64,
    /// Outbound messages the host channel rejected.
    pub dropped_send: u64,
    /// Outbound payloads that failed to encode.
    pub dropped_serialize: u64,
    /// Inbound events that were not valid JSON.
    pub malformed: u64,
    /// Inbound JSON values without a usable `type`.
    pub untyped: u64,
    /// Inbound envelopes passed to a handler.
    pub dispatched: u64,
}
