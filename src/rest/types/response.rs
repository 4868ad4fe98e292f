#![allow(
    clippy::module_name_repetitions,
    reason = "Response suffix is intentional for clarity"
)]

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{DefaultOnNull, DisplayFromStr, OneOrMany, PickFirst, serde_as};
use uuid::Uuid;

use crate::Timestamp;
use crate::error::Error;
use crate::rest::types::{
    Liquidity, OrderStatus, OrderType, SelfTradePrevention, Side, TimeInForce,
};
use crate::types::Decimal;

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct Product {
    pub id: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub base_min_size: Decimal,
    pub base_max_size: Decimal,
    pub quote_increment: Decimal,
    pub display_name: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub margin_enabled: bool,
    pub status_message: Option<String>,
}

/// Orders behind one book entry: a count when aggregated (levels 1 and 2), an order id at level 3.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BookOrders {
    Count(u64),
    OrderId(Uuid),
}

/// One `[price, size, orders]` row of an order book side.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[serde(from = "(Decimal, Decimal, BookOrders)")]
pub struct BookEntry {
    pub price: Decimal,
    pub size: Decimal,
    pub orders: BookOrders,
}

impl From<(Decimal, Decimal, BookOrders)> for BookEntry {
    fn from((price, size, orders): (Decimal, Decimal, BookOrders)) -> Self {
        Self {
            price,
            size,
            orders,
        }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct OrderBook {
    pub sequence: u64,
    pub bids: Vec<BookEntry>,
    pub asks: Vec<BookEntry>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct ProductTicker {
    pub trade_id: u64,
    pub price: Decimal,
    pub size: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub volume: Decimal,
    pub time: DateTime<Utc>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct Trade {
    pub time: DateTime<Utc>,
    pub trade_id: u64,
    pub price: Decimal,
    pub size: Decimal,
    pub side: Side,
}

type CandleRow = (i64, Decimal, Decimal, Decimal, Decimal, Decimal);

/// One `[time, low, high, open, close, volume]` row of `/products/<id>/candles`.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[serde(try_from = "CandleRow")]
pub struct Candle {
    /// Start of the bucket.
    pub time: DateTime<Utc>,
    pub low: Decimal,
    pub high: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl TryFrom<CandleRow> for Candle {
    type Error = Error;

    fn try_from((time, low, high, open, close, volume): CandleRow) -> crate::Result<Self> {
        let time = DateTime::from_timestamp(time, 0)
            .ok_or_else(|| Error::validation(format!("candle time {time} is out of range")))?;

        Ok(Self {
            time,
            low,
            high,
            open,
            close,
            volume,
        })
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct Stats24h {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub last: Option<Decimal>,
    pub volume_30day: Option<Decimal>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct Currency {
    pub id: String,
    pub name: String,
    pub min_size: Decimal,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, Builder, PartialEq)]
pub struct ServerTime {
    pub iso: DateTime<Utc>,
    /// Seconds since the Unix epoch, fractional.
    pub epoch: f64,
}

impl ServerTime {
    /// The exchange clock in the form used for signing.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_secs(self.epoch)
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct Account {
    pub id: Uuid,
    pub currency: String,
    pub balance: Decimal,
    pub available: Decimal,
    pub hold: Decimal,
    pub profile_id: Uuid,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Transfer,
    Match,
    Fee,
    Rebate,
    #[serde(untagged)]
    Unknown(String),
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct EntryDetails {
    pub order_id: Option<Uuid>,
    pub trade_id: Option<String>,
    pub product_id: Option<String>,
}

/// One row of `/accounts/<id>/ledger`.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
pub struct AccountHistory {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub amount: Decimal,
    pub balance: Decimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub details: Option<EntryDetails>,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct Order {
    pub id: Uuid,
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
    pub funds: Option<Decimal>,
    pub product_id: String,
    pub side: Side,
    pub stp: Option<SelfTradePrevention>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    #[builder(default)]
    pub post_only: bool,
    pub created_at: DateTime<Utc>,
    pub fill_fees: Option<Decimal>,
    pub filled_size: Option<Decimal>,
    pub executed_value: Option<Decimal>,
    pub status: OrderStatus,
    #[serde(default)]
    #[builder(default)]
    pub settled: bool,
}

#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Builder, PartialEq)]
#[builder(on(String, into))]
pub struct Fill {
    pub trade_id: u64,
    pub product_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub liquidity: Liquidity,
    pub fee: Decimal,
    #[serde(default)]
    #[builder(default)]
    pub settled: bool,
    pub side: Side,
}

/// Ids of the orders a cancel call removed. Accepts a single id, a list, or an empty body.
#[non_exhaustive]
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Builder, PartialEq)]
#[serde(transparent)]
pub struct CancelResponse {
    #[serde_as(as = "DefaultOnNull<OneOrMany<_>>")]
    pub order_ids: Vec<Uuid>,
}
