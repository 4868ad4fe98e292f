//! Real-time feed over WebSocket.
//!
//! A [`Client`] owns one connection to the feed. Right after the socket opens it sends a single
//! subscribe frame; an authenticated client signs it. Every inbound frame is then decoded by its
//! `type` and fanned out synchronously:
//!
//! 1. to the matching hub in [`Messages`] (`heartbeat`, `ticker`, `snapshot`, `l2update`,
//!    `received`, `open`, `match`, `done`, `change`, `margin_profile_update`, `activate`,
//!    `error`), or to [`Messages::unknown`] with the raw JSON for any other `type` and for known
//!    types that do not match their schema;
//! 2. to [`Events::message`] with the raw JSON.
//!
//! Frames that are not JSON, transport errors and failing listeners are reported on
//! [`Events::error`]. Being throttled at connect time is returned from
//! [`Client::connect`] as a [`Kind::RateLimited`](crate::error::Kind::RateLimited) error instead.
//!
//! Listeners are plain closures registered on an [`EventHub`]. They run on the connection task,
//! so a slow listener delays every later frame.

pub mod client;
pub mod connection;
pub mod error;
pub mod hub;
pub mod types;

pub use client::Client;
pub use connection::{ConnectionState, Events, Messages};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use hub::{BoxError, EventHub, SubscriptionId};
