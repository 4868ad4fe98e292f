use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures::SinkExt as _;
use reqwest::Method;
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message, http::StatusCode};
use url::Url;

use super::connection::{Connection, ConnectionState, Events, Messages, Shared, WsStream};
use super::error::WsError;
use super::types::{SubscribeOptions, SubscribeRequest};
use crate::auth::state::{Authenticated, State, Unauthenticated};
use crate::auth::{Credentials, Payload};
use crate::error::{Error, Kind, RateLimited, Synchronization};
use crate::{FEED_URL, Result, Timestamp, auth};

/// Signed when the subscribe frame names channels explicitly.
const VERIFY_PATH: &str = "/users/self/verify";
/// Signed when the feed picks the channels.
const SELF_PATH: &str = "/users/self";

/// Client for the GDAX WebSocket feed.
///
/// Owns at most one connection. Every connection starts with a single subscribe frame built from
/// the [`SubscribeOptions`] given at construction; an [`Authenticated`] client signs that frame.
/// Inbound frames are decoded and handed to the hubs in [`Client::messages`] and then to
/// [`Events::message`], synchronously and in arrival order, on the connection's task.
///
/// Nothing reconnects automatically: listen on [`Events::close`] and call
/// [`connect`](Client::connect) again if needed.
///
/// ```rust,no_run
/// use gdax_client_sdk::Result;
/// use gdax_client_sdk::ws::Client;
/// use gdax_client_sdk::ws::types::{Channel, SubscribeOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let options = SubscribeOptions::builder()
///         .product_ids(vec!["BTC-USD".to_owned()])
///         .channels(vec![Channel::Ticker.into()])
///         .build();
///     let client = Client::new("wss://ws-feed.gdax.com", options)?;
///
///     client.messages().ticker.subscribe(|ticker| {
///         println!("{} @ {}", ticker.product_id, ticker.price);
///     });
///     client.connect().await?;
///
///     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
///     client.disconnect().await;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client<S: State = Unauthenticated> {
    inner: Arc<ClientInner<S>>,
}

impl Default for Client<Unauthenticated> {
    fn default() -> Self {
        Self::new(FEED_URL, SubscribeOptions::default())
            .expect("WebSocket client with default endpoint should succeed")
    }
}

#[derive(Debug)]
struct ClientInner<S: State> {
    /// Current state of the client (authenticated or unauthenticated)
    state: S,
    endpoint: Url,
    options: SubscribeOptions,
    /// Hubs and connection state, shared with the connection task
    shared: Arc<Shared>,
    /// The live connection, if any. Dropping it shuts the connection down.
    connection: Mutex<Option<Connection>>,
}

impl Client<Unauthenticated> {
    /// Creates a new unauthenticated client. No connection is made until
    /// [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Configuration`] error when `endpoint` is not a `ws://` or `wss://` URL.
    pub fn new(endpoint: &str, options: SubscribeOptions) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(Error::configuration(format!(
                "WebSocket endpoint must use ws:// or wss://, got {endpoint}"
            )));
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                state: Unauthenticated,
                endpoint,
                options,
                shared: Arc::new(Shared::new()),
                connection: Mutex::new(None),
            }),
        })
    }

    /// Elevates this client so that the subscribe frame of every later connection is signed.
    ///
    /// Listeners and a live connection carry over unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`Synchronization`] error when another clone of this client is still alive.
    pub fn authenticate(self, credentials: Credentials) -> Result<Client<Authenticated>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;
        let ClientInner {
            endpoint,
            options,
            shared,
            connection,
            ..
        } = inner;

        Ok(Client {
            inner: Arc::new(ClientInner {
                state: Authenticated { credentials },
                endpoint,
                options,
                shared,
                connection,
            }),
        })
    }
}

impl Client<Authenticated> {
    /// Drops the credentials. Later connections subscribe unsigned.
    ///
    /// # Errors
    ///
    /// Returns a [`Synchronization`] error when another clone of this client is still alive.
    pub fn deauthenticate(self) -> Result<Client<Unauthenticated>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;
        let ClientInner {
            endpoint,
            options,
            shared,
            connection,
            ..
        } = inner;

        Ok(Client {
            inner: Arc::new(ClientInner {
                state: Unauthenticated,
                endpoint,
                options,
                shared,
                connection,
            }),
        })
    }

    #[must_use]
    pub fn state(&self) -> &Authenticated {
        &self.inner.state
    }
}

impl<S: State> Client<S> {
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    #[must_use]
    pub fn options(&self) -> &SubscribeOptions {
        &self.inner.options
    }

    /// Lifecycle hubs: `open`, `close`, the raw `message` hub and `error`.
    #[must_use]
    pub fn events(&self) -> &Events {
        &self.inner.shared.events
    }

    /// One hub per decoded message kind, plus `unknown`.
    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.inner.shared.messages
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.shared.state()
    }

    /// Watches state transitions. The receiver sees the latest state, not every transition.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state_receiver()
    }

    /// Builds the frame [`connect`](Self::connect) sends first, signed with the local clock when
    /// this client is authenticated.
    pub fn subscribe_request(&self) -> Result<SubscribeRequest> {
        let options = &self.inner.options;

        let signature = match self.inner.state.credentials() {
            Some(credentials) => {
                let path = if options.channels.is_empty() {
                    SELF_PATH
                } else {
                    VERIFY_PATH
                };
                Some(auth::sign(
                    credentials,
                    &Method::GET,
                    path,
                    &Payload::new(),
                    Timestamp::now(),
                )?)
            }
            None => None,
        };

        Ok(SubscribeRequest::new(options, signature))
    }

    /// Opens a connection and subscribes.
    ///
    /// A connection that is already live is closed first, and its `close` event emitted, before
    /// the new one is dialed. On success the client is [`ConnectionState::Subscribed`] and frames
    /// are being dispatched.
    ///
    /// # Errors
    ///
    /// - [`Kind::RateLimited`] when the feed answers the upgrade with `429`. Not emitted on
    ///   [`Events::error`].
    /// - [`Kind::Transport`] when the socket cannot be opened, [`Kind::WebSocket`] when the
    ///   upgrade or the subscribe frame fails. Both are also emitted on [`Events::error`].
    pub async fn connect(&self) -> Result<()> {
        self.disconnect().await;

        let shared = &self.inner.shared;
        shared.set_state(ConnectionState::Connecting);

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.inner.endpoint, "connecting to feed");

        let mut stream = match connect_async(self.inner.endpoint.as_str()).await {
            Ok((stream, _)) => stream,
            Err(tungstenite::Error::Http(response))
                if response.status() == StatusCode::TOO_MANY_REQUESTS =>
            {
                #[cfg(feature = "tracing")]
                tracing::warn!("feed refused the connection with 429");

                shared.set_state(ConnectionState::Disconnected);
                return Err(RateLimited.into());
            }
            Err(e) => {
                shared.set_state(ConnectionState::Disconnected);
                let error = Error::from(e);
                shared.report(&error);
                return Err(error);
            }
        };

        let since = Instant::now();
        shared.set_state(ConnectionState::Open { since });
        shared.emit(&shared.events.open, &());

        if let Err(error) = self.handshake(&mut stream).await {
            _ = stream.close(None).await;
            shared.set_state(ConnectionState::Disconnected);
            shared.emit(&shared.events.close, &());
            if error.kind() == Kind::WebSocket {
                shared.report(&error);
            }
            return Err(error);
        }

        shared.set_state(ConnectionState::Subscribed { since });

        let connection = Connection::spawn(stream, Arc::clone(shared));
        let previous = self.lock().replace(connection);
        if let Some(previous) = previous {
            previous.close().await;
        }

        Ok(())
    }

    /// Closes the live connection and waits until `close` has been emitted. A no-op when
    /// nothing is connected.
    pub async fn disconnect(&self) {
        let connection = self.lock().take();

        if let Some(connection) = connection {
            #[cfg(feature = "tracing")]
            tracing::debug!(endpoint = %self.inner.endpoint, "disconnecting from feed");

            connection.close().await;
        }
    }

    async fn handshake(&self, stream: &mut WsStream) -> Result<()> {
        let request = self.subscribe_request()?;
        let frame = serde_json::to_string(&request)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            channels = request.channels.len(),
            signed = request.signature.is_some(),
            "subscribing"
        );

        stream
            .send(Message::text(frame))
            .await
            .map_err(|e| WsError::SubscriptionFailed(e.to_string()).into())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.inner
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
