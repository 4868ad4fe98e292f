#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

/// WebSocket error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// An inbound frame was not valid JSON
    MessageParse(serde_json::Error),
    /// An inbound frame was JSON but did not match the schema of its `type`
    InvalidMessage(String),
    /// The subscribe frame could not be sent
    SubscriptionFailed(String),
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::MessageParse(e) => write!(f, "Failed to parse WebSocket message: {e}"),
            Self::InvalidMessage(msg) => write!(f, "Invalid WebSocket message: {msg}"),
            Self::SubscriptionFailed(reason) => write!(f, "Subscription failed: {reason}"),
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            Self::MessageParse(e) => Some(e),
            _ => None,
        }
    }
}

// Integration with main Error type
impl From<WsError> for crate::error::Error {
    fn from(e: WsError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}

/// Socket-level failures share [`Kind::Transport`](crate::error::Kind::Transport) with REST;
/// everything else the WebSocket layer raises is [`Kind::WebSocket`](crate::error::Kind::WebSocket).
impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        let kind = match &e {
            tokio_tungstenite::tungstenite::Error::Io(_) => crate::error::Kind::Transport,
            _ => crate::error::Kind::WebSocket,
        };

        crate::error::Error::with_source(kind, WsError::Connection(e))
    }
}
