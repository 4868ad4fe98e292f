use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::Display;

pub mod request;
pub mod response;

#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[non_exhaustive]
#[derive(Clone, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    /// Unknown order type from the API (captures the raw value for debugging).
    #[serde(untagged)]
    Unknown(String),
}

#[non_exhaustive]
#[derive(Clone, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Pending,
    Active,
    Done,
    /// Any status the exchange adds later, e.g. `rejected`.
    #[serde(untagged)]
    Unknown(String),
}

/// Self-trade prevention flag.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SelfTradePrevention {
    /// Decrease and cancel
    Dc,
    /// Cancel oldest
    Co,
    /// Cancel newest
    Cn,
    /// Cancel both
    Cb,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good 'til Cancelled
    Gtc,
    /// Good 'til Time, see [`CancelAfter`]
    Gtt,
    /// Immediate or Cancel
    Ioc,
    /// Fill or Kill
    Fok,
}

/// Lifetime of a [`TimeInForce::Gtt`] order.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CancelAfter {
    Min,
    Hour,
    Day,
}

/// Whether a fill added (maker) or removed (taker) liquidity.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
pub enum Liquidity {
    #[serde(rename = "M")]
    #[strum(serialize = "M")]
    Maker,
    #[serde(rename = "T")]
    #[strum(serialize = "T")]
    Taker,
}

/// Depth of `/products/<id>/book`.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum BookLevel {
    /// Best bid and ask only
    #[default]
    Best = 1,
    /// Top 50 aggregated price levels
    Top50 = 2,
    /// Full non-aggregated book, one entry per order
    Full = 3,
}
