//! GDAX REST API client and types.
//!
//! Every call goes through [`Client::request`], which builds the URL from path segments, attaches
//! the `CB-ACCESS-*` headers when the client is [`Authenticated`](crate::auth::state::Authenticated)
//! and maps any non-200 response to a [`Status`](crate::error::Status) error carrying the raw body.
//!
//! ## Public Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `/products` | Tradable products |
//! | `/products/<id>/book` | Order book at level 1, 2 or 3 |
//! | `/products/<id>/ticker` | Last trade, best bid and ask |
//! | `/products/<id>/trades` | Recent trades |
//! | `/products/<id>/candles` | Historic rates |
//! | `/products/<id>/stats` | 24 hour stats |
//! | `/currencies` | Known currencies |
//! | `/time` | Server time |
//!
//! ## Authenticated Endpoints
//!
//! | Endpoint | Description |
//! |----------|-------------|
//! | `/accounts` | Trading accounts and balances |
//! | `/accounts/<id>/ledger` | Account activity |
//! | `/orders` | List, place and cancel orders |
//! | `/fills` | Recent fills |
//!
//! # Example
//!
//! ```rust,no_run
//! use gdax_client_sdk::auth::Credentials;
//! use gdax_client_sdk::rest::{Client, Config};
//! use gdax_client_sdk::rest::types::request::OrdersRequest;
//! use gdax_client_sdk::API_URL;
//!
//! # async fn example() -> gdax_client_sdk::Result<()> {
//! let client = Client::new(API_URL, Config::default())?;
//! let ticker = client.product_ticker("BTC-USD").await?;
//! println!("BTC-USD: {}", ticker.price);
//!
//! let client = client.authenticate(Credentials::from_env()?)?;
//! for order in client.orders(&OrdersRequest::default()).await? {
//!     println!("{} {} {:?}", order.id, order.side, order.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{Client, Config};
