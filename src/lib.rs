#![cfg_attr(all(doc, feature = "ws"), doc = include_str!("../README.md"))]
#![cfg_attr(
    all(doc, not(feature = "ws")),
    doc = "REST client for the GDAX exchange. Enable the `ws` feature for the real-time feed."
)]

pub mod auth;
pub mod error;
pub mod rest;
pub(crate) mod serde_helpers;
pub mod types;
#[cfg(feature = "ws")]
pub mod ws;

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use reqwest::{Request, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Production REST endpoint.
pub const API_URL: &str = "https://api.gdax.com";

/// Production WebSocket feed.
pub const FEED_URL: &str = "wss://ws-feed.gdax.com";

pub const API_KEY_VAR: &str = "GDAX_API_KEY";
pub const SECRET_VAR: &str = "GDAX_SECRET";
pub const PASSPHRASE_VAR: &str = "GDAX_PASSPHRASE";

/// Seconds since [`std::time::UNIX_EPOCH`], with a fractional part.
///
/// The [`Display`](fmt::Display) form is the exact string that goes into the signature prehash,
/// the `CB-ACCESS-TIMESTAMP` header and the subscribe frame: `1000`, `1000.5`,
/// `1700000000.123`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The local clock, at millisecond precision.
    #[must_use]
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "Epoch milliseconds fit comfortably in an f64 mantissa"
    )]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis as f64 / 1000.0)
    }

    #[must_use]
    pub const fn from_secs(seconds: f64) -> Self {
        Self(seconds)
    }

    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }
}

impl From<f64> for Timestamp {
    fn from(seconds: f64) -> Self {
        Self(seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<f64>()
            .map(Self)
            .map_err(|e| Error::validation(format!("invalid timestamp {s:?}: {e}")))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Trait for converting request types to URL query strings.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
/// Arrays are serialized as repeated keys (`key=val1&key=val2`), `None` fields are skipped.
pub trait ToQueryParams: Serialize {
    /// Returns the URL-encoded pairs without a leading `?`; empty when nothing is set.
    fn query_string(&self) -> Result<String> {
        Ok(serde_html_form::to_string(self)?)
    }
}

impl<T: Serialize + ?Sized> ToQueryParams for T {}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    let body = response.text().await?;

    if status_code != StatusCode::OK {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            body = %body,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, body));
    }

    let json_value = if body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&body)?
    };

    serde_helpers::deserialize_with_warnings(json_value)
}
