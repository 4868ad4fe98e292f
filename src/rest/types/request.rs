#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::Result;
use crate::error::Error;
use crate::rest::types::{BookLevel, CancelAfter, OrderStatus, SelfTradePrevention, Side, TimeInForce};
use crate::types::Decimal;

#[non_exhaustive]
#[derive(Debug, Default, Serialize, Builder)]
pub struct OrderBookRequest {
    #[builder(default)]
    pub level: BookLevel,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Builder)]
pub struct HistoricRatesRequest {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Candle width in seconds.
    pub granularity: Option<u32>,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Builder)]
#[builder(on(String, into))]
pub struct OrdersRequest {
    pub status: Option<OrderStatus>,
    pub product_id: Option<String>,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Builder)]
#[builder(on(String, into))]
pub struct CancelAllRequest {
    pub product_id: Option<String>,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Builder)]
#[builder(on(String, into))]
pub struct FillsRequest {
    pub order_id: Option<Uuid>,
    pub product_id: Option<String>,
}

/// Body of `POST /orders`. The `type` field is written from the variant.
#[non_exhaustive]
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaceOrderRequest {
    Market(MarketOrder),
    Limit(LimitOrder),
    Stop(StopOrder),
}

impl PlaceOrderRequest {
    /// Rejects market and stop orders that set neither or both of `size` and `funds`.
    pub fn validate(&self) -> Result<()> {
        let (size, funds) = match self {
            Self::Limit(_) => return Ok(()),
            Self::Market(order) => (order.size, order.funds),
            Self::Stop(order) => (order.size, order.funds),
        };

        match (size, funds) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (None, None) => Err(Error::validation(
                "one of `size` or `funds` is required for market and stop orders",
            )),
            (Some(_), Some(_)) => Err(Error::validation(
                "only one of `size` or `funds` may be set for market and stop orders",
            )),
        }
    }
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Serialize, Builder)]
#[builder(on(String, into))]
pub struct MarketOrder {
    pub client_oid: Option<Uuid>,
    pub side: Side,
    pub product_id: String,
    pub stp: Option<SelfTradePrevention>,
    pub size: Option<Decimal>,
    pub funds: Option<Decimal>,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Serialize, Builder)]
#[builder(on(String, into))]
pub struct LimitOrder {
    pub client_oid: Option<Uuid>,
    pub side: Side,
    pub product_id: String,
    pub stp: Option<SelfTradePrevention>,
    pub price: Decimal,
    pub size: Decimal,
    pub time_in_force: Option<TimeInForce>,
    /// Only valid with [`TimeInForce::Gtt`].
    pub cancel_after: Option<CancelAfter>,
    pub post_only: Option<bool>,
}

#[non_exhaustive]
#[skip_serializing_none]
#[derive(Debug, Serialize, Builder)]
#[builder(on(String, into))]
pub struct StopOrder {
    pub client_oid: Option<Uuid>,
    pub side: Side,
    pub product_id: String,
    pub stp: Option<SelfTradePrevention>,
    pub price: Decimal,
    pub size: Option<Decimal>,
    pub funds: Option<Decimal>,
}

impl From<MarketOrder> for PlaceOrderRequest {
    fn from(order: MarketOrder) -> Self {
        Self::Market(order)
    }
}

impl From<LimitOrder> for PlaceOrderRequest {
    fn from(order: LimitOrder) -> Self {
        Self::Limit(order)
    }
}

impl From<StopOrder> for PlaceOrderRequest {
    fn from(order: StopOrder) -> Self {
        Self::Stop(order)
    }
}
