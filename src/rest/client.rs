use std::sync::Arc;

use bon::Builder;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::auth::state::{Authenticated, State, Unauthenticated};
use crate::auth::{Credentials, Payload};
use crate::error::Synchronization;
use crate::rest::types::request::{
    CancelAllRequest, FillsRequest, HistoricRatesRequest, OrderBookRequest, OrdersRequest,
    PlaceOrderRequest,
};
use crate::rest::types::response::{
    Account, AccountHistory, CancelResponse, Candle, Currency, Fill, Order, OrderBook, Product,
    ProductTicker, ServerTime, Stats24h, Trade,
};
use crate::{API_URL, Result, Timestamp, auth};

/// The main way for API users to interact with the GDAX REST API.
///
/// A [`Client`] is either [`Unauthenticated`] or [`Authenticated`]. Only the methods allowed in
/// the current state are visible: public market data is available in both, account and order
/// methods only once authenticated. Authenticated clients sign every request, public ones
/// included.
///
/// [`Client`] is cheap to clone and thread-safe. Requests are independent and may run
/// concurrently; nothing is retried.
///
/// ```rust,no_run
/// use gdax_client_sdk::Result;
/// use gdax_client_sdk::rest::{Client, Config};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = Client::new("https://api.gdax.com", Config::default())?;
///
///     let time = client.server_time().await?;
///     println!("Server time: {}", time.iso);
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client<S: State = Unauthenticated> {
    inner: Arc<ClientInner<S>>,
}

impl Default for Client<Unauthenticated> {
    fn default() -> Self {
        Client::new(API_URL, Config::default())
            .expect("Client with default endpoint should succeed")
    }
}

/// Configuration for [`Client`]
#[derive(Clone, Debug, Default, Builder)]
pub struct Config {
    /// Whether the [`Client`] signs with the exchange clock from `GET /time` instead of the
    /// local clock. This adds another round trip to every authenticated request.
    #[builder(default)]
    use_server_time: bool,
}

#[derive(Debug)]
struct ClientInner<S: State> {
    config: Config,
    /// The current [`State`] of this client
    state: S,
    /// The [`Url`] against which `client` is making requests.
    host: Url,
    /// The inner [`ReqwestClient`] used to make requests to `host`.
    client: ReqwestClient,
}

impl<S: State> ClientInner<S> {
    /// `host` without its trailing slash, ready to have an absolute path appended.
    fn base(&self) -> &str {
        self.host.as_str().trim_end_matches('/')
    }

    async fn server_time(&self) -> Result<ServerTime> {
        let request = self
            .client
            .request(Method::GET, format!("{}/time", self.base()))
            .build()?;

        crate::request(&self.client, request, None).await
    }

    async fn timestamp(&self) -> Result<Timestamp> {
        if self.config.use_server_time {
            Ok(self.server_time().await?.timestamp())
        } else {
            Ok(Timestamp::now())
        }
    }
}

impl<S: State> Client<S> {
    /// Returns the REST API host URL.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    /// Issues one request to `/<segments joined by "/">`.
    ///
    /// The body and query in `payload` are transmitted exactly as they are signed. When this
    /// client is authenticated the four `CB-ACCESS-*` headers are attached. A 200 response is
    /// decoded as `T`; any other status becomes a [`Status`](crate::error::Status) error carrying
    /// the raw body, and a request that never got a response is a
    /// [`Kind::Transport`](crate::error::Kind::Transport) error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        payload: &Payload,
    ) -> Result<T> {
        let path = format!("/{}", segments.join("/"));

        let mut url = format!("{}{path}", self.inner.base());
        if let Some(query) = payload.query() {
            url.push('?');
            url.push_str(query);
        }

        let mut builder = self.inner.client.request(method.clone(), url);
        if let Some(body) = payload.body() {
            builder = builder.body(body.to_owned());
        }
        let request = builder.build()?;

        let headers = match self.inner.state.credentials() {
            Some(credentials) => {
                let timestamp = self.inner.timestamp().await?;
                let signature = auth::sign(credentials, &method, &path, payload, timestamp)?;
                Some(signature.to_headers()?)
            }
            None => None,
        };

        crate::request(&self.inner.client, request, headers).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.request(Method::GET, segments, &Payload::new()).await
    }

    /// Lists the products available for trading.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.get(&["products"]).await
    }

    /// Returns the order book of `product_id` at the depth chosen in `request`.
    pub async fn product_order_book(
        &self,
        product_id: &str,
        request: &OrderBookRequest,
    ) -> Result<OrderBook> {
        let payload = Payload::new().with_query(request)?;
        self.request(Method::GET, &["products", product_id, "book"], &payload)
            .await
    }

    /// Returns the last trade and the best bid and ask of `product_id`.
    pub async fn product_ticker(&self, product_id: &str) -> Result<ProductTicker> {
        self.get(&["products", product_id, "ticker"]).await
    }

    /// Lists the latest trades of `product_id`.
    pub async fn trades(&self, product_id: &str) -> Result<Vec<Trade>> {
        self.get(&["products", product_id, "trades"]).await
    }

    /// Returns candles for `product_id`, most recent first.
    pub async fn historic_rates(
        &self,
        product_id: &str,
        request: &HistoricRatesRequest,
    ) -> Result<Vec<Candle>> {
        let payload = Payload::new().with_query(request)?;
        self.request(Method::GET, &["products", product_id, "candles"], &payload)
            .await
    }

    /// Returns open, high, low and volume of `product_id` over the last 24 hours.
    pub async fn stats_24h(&self, product_id: &str) -> Result<Stats24h> {
        self.get(&["products", product_id, "stats"]).await
    }

    pub async fn currencies(&self) -> Result<Vec<Currency>> {
        self.get(&["currencies"]).await
    }

    /// Returns the exchange clock. Never signed.
    pub async fn server_time(&self) -> Result<ServerTime> {
        self.inner.server_time().await
    }
}

impl Client<Unauthenticated> {
    /// Creates a new unauthenticated client against `host`, e.g. [`API_URL`] or the sandbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client cannot be initialized.
    pub fn new(host: &str, config: Config) -> Result<Client<Unauthenticated>> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("gdax-client-sdk"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                state: Unauthenticated,
                host: Url::parse(host)?,
                client,
            }),
        })
    }

    /// Elevates this client so that every request is signed with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns a [`Synchronization`] error when another clone of this client is still alive.
    pub fn authenticate(self, credentials: Credentials) -> Result<Client<Authenticated>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: inner.config,
                state: Authenticated { credentials },
                host: inner.host,
                client: inner.client,
            }),
        })
    }
}

impl Client<Authenticated> {
    /// Demotes this authenticated [`Client`] to an unauthenticated one, dropping its credentials.
    pub fn deauthenticate(self) -> Result<Client<Unauthenticated>> {
        let inner = Arc::into_inner(self.inner).ok_or(Synchronization)?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: inner.config,
                state: Unauthenticated,
                host: inner.host,
                client: inner.client,
            }),
        })
    }

    /// Returns a reference to the authenticated state.
    #[must_use]
    pub fn state(&self) -> &Authenticated {
        &self.inner.state
    }

    /// Lists the trading accounts of the profile, one per currency.
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.get(&["accounts"]).await
    }

    pub async fn account(&self, account_id: Uuid) -> Result<Account> {
        self.get(&["accounts", &account_id.to_string()]).await
    }

    /// Lists ledger entries of `account_id`, most recent first.
    pub async fn account_history(&self, account_id: Uuid) -> Result<Vec<AccountHistory>> {
        self.get(&["accounts", &account_id.to_string(), "ledger"])
            .await
    }

    /// Lists orders, by default all that are still open or un-settled.
    pub async fn orders(&self, request: &OrdersRequest) -> Result<Vec<Order>> {
        let payload = Payload::new().with_query(request)?;
        self.request(Method::GET, &["orders"], &payload).await
    }

    pub async fn order(&self, order_id: Uuid) -> Result<Order> {
        self.get(&["orders", &order_id.to_string()]).await
    }

    /// Places an order.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error without contacting
    /// the exchange when a market or stop order does not set exactly one of `size` and `funds`.
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Order> {
        request.validate()?;

        let payload = Payload::new().with_body(request)?;
        self.request(Method::POST, &["orders"], &payload).await
    }

    pub async fn cancel_order(&self, order_id: Uuid) -> Result<CancelResponse> {
        self.request(
            Method::DELETE,
            &["orders", &order_id.to_string()],
            &Payload::new(),
        )
        .await
    }

    /// Cancels every open order, optionally limited to one product.
    pub async fn cancel_all_orders(&self, request: &CancelAllRequest) -> Result<CancelResponse> {
        let payload = Payload::new().with_query(request)?;
        self.request(Method::DELETE, &["orders"], &payload).await
    }

    pub async fn fills(&self, request: &FillsRequest) -> Result<Vec<Fill>> {
        let payload = Payload::new().with_query(request)?;
        self.request(Method::GET, &["fills"], &payload).await
    }
}
