use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};
use strum_macros::Display;
use uuid::Uuid;

use crate::Timestamp;
use crate::error::Error;
use crate::rest::types::{OrderType, Side};
use crate::types::Decimal;
use crate::ws::error::WsError;

/// The `type` discriminants the feed client routes to a dedicated hub.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Heartbeat,
    Ticker,
    Snapshot,
    /// Tagged `l2update`, also accepted as `level2`
    #[strum(serialize = "l2update")]
    Level2Update,
    Received,
    Open,
    Match,
    Done,
    Change,
    MarginProfileUpdate,
    Activate,
    Error,
}

impl MessageKind {
    /// Maps a frame's `type` value to its kind. `None` for anything not in the routed set.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "heartbeat" => Self::Heartbeat,
            "ticker" => Self::Ticker,
            "snapshot" => Self::Snapshot,
            "l2update" | "level2" => Self::Level2Update,
            "received" => Self::Received,
            "open" => Self::Open,
            "match" => Self::Match,
            "done" => Self::Done,
            "change" => Self::Change,
            "margin_profile_update" => Self::MarginProfileUpdate,
            "activate" => Self::Activate,
            "error" => Self::Error,
            _ => return None,
        })
    }
}

/// One inbound frame, decoded by its `type` field.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Heartbeat(Heartbeat),
    Ticker(Ticker),
    Snapshot(Snapshot),
    #[serde(rename = "l2update", alias = "level2")]
    Level2Update(Level2Update),
    Received(Received),
    Open(OpenOrder),
    Match(Match),
    Done(Done),
    Change(Change),
    MarginProfileUpdate(MarginProfileUpdate),
    Activate(Activate),
    Error(ErrorMessage),
    /// Any frame whose `type` is missing or not one of the above, kept as received.
    #[serde(skip_deserializing)]
    Unknown(Value),
}

impl StreamMessage {
    /// Decodes a parsed frame. Unrecognised or missing `type` values yield [`Self::Unknown`];
    /// a known `type` whose payload does not match its schema is an error.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        let Some(kind) = value
            .get("type")
            .and_then(Value::as_str)
            .and_then(MessageKind::from_tag)
        else {
            return Ok(Self::Unknown(value));
        };

        crate::serde_helpers::deserialize_with_warnings(value).map_err(|e| {
            Error::from(WsError::InvalidMessage(format!("`{kind}` frame: {e}")))
        })
    }

    /// `None` for [`Self::Unknown`].
    #[must_use]
    pub fn kind(&self) -> Option<MessageKind> {
        Some(match self {
            Self::Heartbeat(_) => MessageKind::Heartbeat,
            Self::Ticker(_) => MessageKind::Ticker,
            Self::Snapshot(_) => MessageKind::Snapshot,
            Self::Level2Update(_) => MessageKind::Level2Update,
            Self::Received(_) => MessageKind::Received,
            Self::Open(_) => MessageKind::Open,
            Self::Match(_) => MessageKind::Match,
            Self::Done(_) => MessageKind::Done,
            Self::Change(_) => MessageKind::Change,
            Self::MarginProfileUpdate(_) => MessageKind::MarginProfileUpdate,
            Self::Activate(_) => MessageKind::Activate,
            Self::Error(_) => MessageKind::Error,
            Self::Unknown(_) => return None,
        })
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Heartbeat {
    pub sequence: u64,
    pub last_trade_id: u64,
    pub product_id: String,
    pub time: DateTime<Utc>,
}

/// The first ticker after subscribing carries no trade, so the trade fields are optional.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Ticker {
    pub sequence: Option<u64>,
    pub trade_id: Option<u64>,
    pub time: Option<DateTime<Utc>>,
    pub product_id: String,
    pub price: Decimal,
    pub side: Option<Side>,
    pub last_size: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

/// A `[price, size]` row of a level 2 snapshot.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "(Decimal, Decimal)")]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl From<(Decimal, Decimal)> for PriceLevel {
    fn from((price, size): (Decimal, Decimal)) -> Self {
        Self { price, size }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Snapshot {
    pub product_id: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// A `[side, price, size]` row of a level 2 update. A zero `size` removes the price level.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "(Side, Decimal, Decimal)")]
pub struct Level2Change {
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
}

impl From<(Side, Decimal, Decimal)> for Level2Change {
    fn from((side, price, size): (Side, Decimal, Decimal)) -> Self {
        Self { side, price, size }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Level2Update {
    pub product_id: String,
    pub time: Option<DateTime<Utc>>,
    #[serde(alias = "changed")]
    pub changes: Vec<Level2Change>,
}

/// An order accepted by the matching engine. Limit orders carry `size` and `price`, market
/// orders `size` or `funds`.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Received {
    pub sequence: u64,
    pub time: DateTime<Utc>,
    pub product_id: String,
    pub order_id: Uuid,
    pub side: Side,
    pub client_oid: Option<String>,
    pub order_type: OrderType,
    pub size: Option<Decimal>,
    pub price: Option<Decimal>,
    pub funds: Option<Decimal>,
}

/// An order now resting on the book (`type: "open"`).
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OpenOrder {
    pub sequence: u64,
    pub time: DateTime<Utc>,
    pub product_id: String,
    pub order_id: Uuid,
    pub price: Decimal,
    pub remaining_size: Decimal,
    pub side: Side,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoneReason {
    Filled,
    Canceled,
    #[serde(untagged)]
    Unknown(String),
}

/// An order left the book. Market orders carry no `price` or `remaining_size`.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Done {
    pub sequence: u64,
    pub time: DateTime<Utc>,
    pub product_id: String,
    pub order_id: Uuid,
    pub reason: DoneReason,
    pub side: Side,
    pub price: Option<Decimal>,
    pub remaining_size: Option<Decimal>,
}

/// A trade between two orders. `side` is the maker order's side. The user and profile ids are
/// only present on authenticated feeds.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Match {
    pub sequence: u64,
    pub trade_id: u64,
    pub maker_order_id: Uuid,
    pub taker_order_id: Uuid,
    pub time: DateTime<Utc>,
    pub product_id: String,
    pub size: Decimal,
    pub price: Decimal,
    pub side: Side,
    pub taker_user_id: Option<String>,
    pub user_id: Option<String>,
    pub taker_profile_id: Option<String>,
    pub profile_id: Option<String>,
}

/// An order shrank in place, by size for limit orders or by funds for market orders.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Change {
    pub sequence: u64,
    pub time: DateTime<Utc>,
    pub order_id: Uuid,
    pub product_id: String,
    pub new_size: Option<Decimal>,
    pub old_size: Option<Decimal>,
    pub new_funds: Option<Decimal>,
    pub old_funds: Option<Decimal>,
    pub price: Option<Decimal>,
    pub side: Side,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MarginProfileUpdate {
    pub product_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub profile_id: String,
    pub nonce: Option<u64>,
    pub position: Option<String>,
    pub position_size: Option<Decimal>,
    pub position_compliment: Option<Decimal>,
    pub position_max_size: Option<Decimal>,
    pub call_side: Option<Side>,
    pub call_price: Option<Decimal>,
    pub call_size: Option<Decimal>,
    pub call_funds: Option<Decimal>,
    #[serde(default)]
    pub covered: bool,
    pub next_expire_time: Option<DateTime<Utc>>,
    pub base_balance: Option<Decimal>,
    pub base_funding: Option<Decimal>,
    pub quote_balance: Option<Decimal>,
    pub quote_funding: Option<Decimal>,
    #[serde(default)]
    pub private: bool,
}

/// A stop order was triggered.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Activate {
    pub product_id: String,
    /// Epoch seconds, sent as a string.
    #[serde_as(as = "DisplayFromStr")]
    pub timestamp: Timestamp,
    pub user_id: String,
    pub profile_id: String,
    pub order_id: Uuid,
    pub stop_type: String,
    pub side: Side,
    pub stop_price: Decimal,
    pub size: Option<Decimal>,
    pub funds: Option<Decimal>,
    pub taker_fee_rate: Option<Decimal>,
    #[serde(default)]
    pub private: bool,
}

/// Sent by the feed when a subscribe frame is rejected. The feed closes the connection after.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub message: String,
    pub reason: Option<String>,
}
