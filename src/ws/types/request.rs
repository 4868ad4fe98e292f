use bon::Builder;
use serde::Serialize;
use strum_macros::Display;

use crate::auth::Signature;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Subscribe,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Heartbeat,
    Ticker,
    Level2,
    /// The full channel filtered to the authenticated user's own orders
    User,
    Matches,
    Full,
}

/// A channel either by bare name (using the request's top-level `product_ids`) or with its own
/// product list.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelSubscription {
    Name(Channel),
    WithProducts {
        name: Channel,
        product_ids: Vec<String>,
    },
}

impl ChannelSubscription {
    #[must_use]
    pub fn with_products<I, P>(name: Channel, product_ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::WithProducts {
            name,
            product_ids: product_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Channel> for ChannelSubscription {
    fn from(channel: Channel) -> Self {
        Self::Name(channel)
    }
}

/// What a [`Client`](crate::ws::Client) subscribes to on every connection.
///
/// Leaving `channels` empty subscribes to the feed's default channels.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Builder)]
pub struct SubscribeOptions {
    #[builder(default)]
    pub product_ids: Vec<String>,
    #[builder(default)]
    pub channels: Vec<ChannelSubscription>,
}

/// The first frame sent on a connection. `signature` is flattened into the top level when the
/// client is authenticated.
#[non_exhaustive]
#[derive(Clone, Debug, Serialize)]
pub struct SubscribeRequest {
    pub r#type: Operation,
    pub product_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelSubscription>,
    #[serde(flatten)]
    pub signature: Option<Signature>,
}

impl SubscribeRequest {
    #[must_use]
    pub fn new(options: &SubscribeOptions, signature: Option<Signature>) -> Self {
        Self {
            r#type: Operation::Subscribe,
            product_ids: options.product_ids.clone(),
            channels: options.channels.clone(),
            signature,
        }
    }
}
