#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt as _;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use super::error::WsError;
use super::hub::EventHub;
use super::types::StreamMessage;
use super::types::response::{
    Activate, Change, Done, ErrorMessage, Heartbeat, Level2Update, MarginProfileUpdate, Match,
    OpenOrder, Received, Snapshot, Ticker,
};
use crate::error::Error;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Dialing the feed
    Connecting,
    /// Transport is up, subscribe frame not sent yet
    Open {
        /// When the transport opened
        since: Instant,
    },
    /// Subscribe frame sent, frames are being dispatched
    Subscribed {
        /// When the transport opened
        since: Instant,
    },
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Open { .. } | Self::Subscribed { .. })
    }
}

/// Connection lifecycle notifications.
#[non_exhaustive]
#[derive(Debug)]
pub struct Events {
    /// The transport opened, emitted before the subscribe frame is sent
    pub open: EventHub<()>,
    /// The transport closed, whichever side closed it
    pub close: EventHub<()>,
    /// Every inbound frame that parsed as JSON, after its typed hub
    pub message: EventHub<Value>,
    /// Transport errors, undecodable frames and listener failures
    pub error: EventHub<Error>,
}

/// One hub per routed message `type`.
#[non_exhaustive]
#[derive(Debug)]
pub struct Messages {
    pub heartbeat: EventHub<Heartbeat>,
    pub ticker: EventHub<Ticker>,
    pub snapshot: EventHub<Snapshot>,
    /// `l2update` frames, also sent as `level2`
    pub level2: EventHub<Level2Update>,
    pub received: EventHub<Received>,
    pub open: EventHub<OpenOrder>,
    pub matches: EventHub<Match>,
    pub done: EventHub<Done>,
    pub change: EventHub<Change>,
    pub margin_profile_update: EventHub<MarginProfileUpdate>,
    pub activate: EventHub<Activate>,
    /// `error` frames sent by the feed, e.g. a rejected subscription
    pub error: EventHub<ErrorMessage>,
    /// Frames with a missing or unrecognised `type`, as received
    pub unknown: EventHub<Value>,
}

/// State shared between the client handle and the connection task.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) events: Events,
    pub(crate) messages: Messages,
    state_tx: watch::Sender<ConnectionState>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            events: Events {
                open: EventHub::new("open"),
                close: EventHub::new("close"),
                message: EventHub::new("message"),
                error: EventHub::new("error"),
            },
            messages: Messages {
                heartbeat: EventHub::new("heartbeat"),
                ticker: EventHub::new("ticker"),
                snapshot: EventHub::new("snapshot"),
                level2: EventHub::new("l2update"),
                received: EventHub::new("received"),
                open: EventHub::new("open"),
                matches: EventHub::new("match"),
                done: EventHub::new("done"),
                change: EventHub::new("change"),
                margin_profile_update: EventHub::new("margin_profile_update"),
                activate: EventHub::new("activate"),
                error: EventHub::new("error"),
                unknown: EventHub::new("unknown"),
            },
            state_tx,
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub(crate) fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?state, "connection state changed");

        self.state_tx.send_replace(state);
    }

    /// Emits on `hub`, forwarding listener failures to the error hub.
    pub(crate) fn emit<T: 'static>(&self, hub: &EventHub<T>, value: &T) {
        for failure in hub.emit(value) {
            self.report(&failure);
        }
    }

    /// Emits `error` on the error hub. Failures of error listeners are only logged.
    pub(crate) fn report(&self, error: &Error) {
        #[cfg(feature = "tracing")]
        tracing::warn!(%error, "feed error");

        for failure in self.events.error.emit(error) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %failure, "error listener failed");
            #[cfg(not(feature = "tracing"))]
            let _ = &failure;
        }
    }

    /// Parses one text frame and fans it out: typed hub first, then the raw message hub.
    ///
    /// A frame whose known `type` does not decode into its schema is reported and goes to the
    /// unknown hub in place of its typed hub.
    pub(crate) fn dispatch(&self, text: &str) {
        #[cfg(feature = "tracing")]
        tracing::trace!(%text, "received frame");

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                self.report(&WsError::MessageParse(e).into());
                return;
            }
        };

        match StreamMessage::from_value(value.clone()) {
            Ok(message) => self.route(&message),
            Err(e) => {
                self.report(&e);
                self.emit(&self.messages.unknown, &value);
            }
        }

        self.emit(&self.events.message, &value);
    }

    fn route(&self, message: &StreamMessage) {
        let messages = &self.messages;

        match message {
            StreamMessage::Heartbeat(m) => self.emit(&messages.heartbeat, m),
            StreamMessage::Ticker(m) => self.emit(&messages.ticker, m),
            StreamMessage::Snapshot(m) => self.emit(&messages.snapshot, m),
            StreamMessage::Level2Update(m) => self.emit(&messages.level2, m),
            StreamMessage::Received(m) => self.emit(&messages.received, m),
            StreamMessage::Open(m) => self.emit(&messages.open, m),
            StreamMessage::Match(m) => self.emit(&messages.matches, m),
            StreamMessage::Done(m) => self.emit(&messages.done, m),
            StreamMessage::Change(m) => self.emit(&messages.change, m),
            StreamMessage::MarginProfileUpdate(m) => {
                self.emit(&messages.margin_profile_update, m);
            }
            StreamMessage::Activate(m) => self.emit(&messages.activate, m),
            StreamMessage::Error(m) => self.emit(&messages.error, m),
            StreamMessage::Unknown(v) => self.emit(&messages.unknown, v),
        }
    }
}

/// Handle to the task owning one live transport.
#[derive(Debug)]
pub(crate) struct Connection {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Connection {
    /// Hands `stream` to a new task that dispatches its frames until either side closes it.
    pub(crate) fn spawn(stream: WsStream, shared: Arc<Shared>) -> Self {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(stream, shutdown_rx, shared));

        Self { shutdown, task }
    }

    /// Sends a close frame and waits until the task has emitted `close`.
    pub(crate) async fn close(self) {
        _ = self.shutdown.send(());

        if let Err(e) = self.task.await {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "connection task failed");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
    }
}

/// Reads frames until the peer closes, the transport fails or `shutdown` fires. Dropping the
/// [`Connection`] handle fires `shutdown` as well.
async fn run(mut stream: WsStream, mut shutdown: oneshot::Receiver<()>, shared: Arc<Shared>) {
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(e) = stream.close(None).await {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(error = %e, "close handshake failed");
                    #[cfg(not(feature = "tracing"))]
                    let _ = &e;
                }
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => shared.dispatch(text.as_str()),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => shared.dispatch(text),
                    Err(e) => shared.report(
                        &WsError::InvalidMessage(format!("binary frame is not UTF-8: {e}")).into(),
                    ),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    // Ping and pong are answered by tungstenite.
                }
                Some(Err(e)) => {
                    shared.report(&e.into());
                    break;
                }
            }
        }
    }

    shared.set_state(ConnectionState::Disconnected);
    shared.emit(&shared.events.close, &());
}
