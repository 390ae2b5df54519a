use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Inbound text was not valid JSON.
    Parse(String),
    /// An outbound payload could not be encoded.
    Serialize(String),
    /// A known command type arrived with a payload of the wrong shape.
    InvalidPayload { kind: String, reason: String },
    /// The host send primitive is missing.
    ChannelUnavailable,
    /// The host send primitive rejected the message.
    Send(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Parse(e) => write!(f, "invalid JSON from host: {e}"),
            BridgeError::Serialize(e) => write!(f, "failed to encode message: {e}"),
            BridgeError::InvalidPayload { kind, reason } => {
                write!(f, "invalid {kind} payload: {reason}")
            }
            BridgeError::ChannelUnavailable => write!(f, "host channel unavailable"),
            BridgeError::Send(e) => write!(f, "host channel rejected message: {e}"),
        }
    }
}

impl std::error::Error for BridgeError {}
