use std::env;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac as _};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::Error;
use crate::{API_KEY_VAR, PASSPHRASE_VAR, Result, SECRET_VAR, Timestamp, ToQueryParams as _};

pub(crate) const CB_ACCESS_KEY: &str = "CB-ACCESS-KEY";
pub(crate) const CB_ACCESS_SIGN: &str = "CB-ACCESS-SIGN";
pub(crate) const CB_ACCESS_TIMESTAMP: &str = "CB-ACCESS-TIMESTAMP";
pub(crate) const CB_ACCESS_PASSPHRASE: &str = "CB-ACCESS-PASSPHRASE";

/// The API key triple issued by the exchange. `secret` is the base64 encoded shared HMAC key.
///
/// Built once and never mutated. `Debug` redacts the secret and the passphrase.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    pub(crate) key: String,
    pub(crate) secret: SecretString,
    pub(crate) passphrase: SecretString,
}

#[derive(Deserialize)]
struct RawCredentials {
    #[serde(alias = "apiKey", alias = "api_key")]
    key: String,
    secret: String,
    passphrase: String,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = Error;

    fn try_from(raw: RawCredentials) -> Result<Self> {
        Self::new(raw.key, raw.secret, raw.passphrase)
    }
}

impl Credentials {
    /// Validates and wraps the triple. Fails with [`crate::error::Kind::Configuration`] when a
    /// field is empty or the secret is not standard base64.
    pub fn new<K, S, P>(key: K, secret: S, passphrase: P) -> Result<Self>
    where
        K: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        let key = key.into();
        let secret = secret.into();
        let passphrase = passphrase.into();

        if key.is_empty() {
            return Err(Error::configuration("API key is empty"));
        }
        if secret.is_empty() {
            return Err(Error::configuration("API secret is empty"));
        }
        if passphrase.is_empty() {
            return Err(Error::configuration("API passphrase is empty"));
        }

        STANDARD.decode(&secret)?;

        Ok(Self {
            key,
            secret: SecretString::from(secret),
            passphrase: SecretString::from(passphrase),
        })
    }

    /// Reads `GDAX_API_KEY`, `GDAX_SECRET` and `GDAX_PASSPHRASE`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            env::var(name).map_err(|e| Error::configuration(format!("{name}: {e}")))
        };

        Self::new(var(API_KEY_VAR)?, var(SECRET_VAR)?, var(PASSPHRASE_VAR)?)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    #[must_use]
    pub fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }
}

/// The serialized body and encoded query of one request, in the exact form they are transmitted.
/// The same strings feed the signature.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    body: Option<String>,
    query: Option<String>,
}

impl Payload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `body` to JSON once. That string is what gets signed and sent.
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Encodes `query` as `key=value` pairs. An empty result leaves the query unset.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        let encoded = query.query_string()?;
        self.query = (!encoded.is_empty()).then_some(encoded);
        Ok(self)
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The request-specific tail of the prehash: the body when present, otherwise `?` plus the
    /// query when present, otherwise nothing.
    #[must_use]
    pub fn message_body(&self) -> String {
        match (&self.body, &self.query) {
            (Some(body), _) => body.clone(),
            (None, Some(query)) => format!("?{query}"),
            (None, None) => String::new(),
        }
    }
}

/// Authentication material for exactly one request. Compute a fresh one per request.
#[non_exhaustive]
#[derive(Clone, Debug, Serialize)]
pub struct Signature {
    pub(crate) key: String,
    pub(crate) signature: String,
    pub(crate) timestamp: Timestamp,
    #[serde(serialize_with = "crate::serde_helpers::expose_secret")]
    pub(crate) passphrase: SecretString,
}

impl Signature {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Base64 encoded HMAC-SHA256 digest.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[must_use]
    pub fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }

    /// The four `CB-ACCESS-*` headers.
    pub fn to_headers(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();

        map.insert(CB_ACCESS_KEY, HeaderValue::from_str(&self.key)?);
        map.insert(CB_ACCESS_SIGN, HeaderValue::from_str(&self.signature)?);
        map.insert(
            CB_ACCESS_TIMESTAMP,
            HeaderValue::from_str(&self.timestamp.to_string())?,
        );
        let mut passphrase = HeaderValue::from_str(self.passphrase.expose_secret())?;
        passphrase.set_sensitive(true);
        map.insert(CB_ACCESS_PASSPHRASE, passphrase);

        Ok(map)
    }
}

/// Signs one request.
///
/// The prehash is `timestamp + METHOD + path + message_body`, where `path` is relative to the
/// API root and starts with `/`. Deterministic for a fixed `timestamp`.
pub fn sign(
    credentials: &Credentials,
    method: &Method,
    path: &str,
    payload: &Payload,
    timestamp: Timestamp,
) -> Result<Signature> {
    let message = to_message(method, path, payload, timestamp);
    let signature = hmac(&credentials.secret, &message)?;

    Ok(Signature {
        key: credentials.key.clone(),
        signature,
        timestamp,
        passphrase: credentials.passphrase.clone(),
    })
}

#[must_use]
fn to_message(method: &Method, path: &str, payload: &Payload, timestamp: Timestamp) -> String {
    let method = method.as_str().to_ascii_uppercase();
    let body = payload.message_body();

    format!("{timestamp}{method}{path}{body}")
}

fn hmac(secret: &SecretString, message: &str) -> Result<String> {
    let decoded_secret = STANDARD.decode(secret.expose_secret())?;
    let mut mac = Hmac::<Sha256>::new_from_slice(&decoded_secret)?;
    mac.update(message.as_bytes());

    let result = mac.finalize().into_bytes();
    Ok(STANDARD.encode(result))
}

/// Each client can exist in one state at a time, i.e. [`state::Unauthenticated`] or
/// [`state::Authenticated`].
pub mod state {
    use crate::auth::Credentials;

    /// The initial state of the client
    #[non_exhaustive]
    #[derive(Clone, Debug)]
    pub struct Unauthenticated;

    /// The elevated state of the client. Requests are signed with `credentials`.
    #[non_exhaustive]
    #[derive(Clone, Debug)]
    pub struct Authenticated {
        pub(crate) credentials: Credentials,
    }

    impl Authenticated {
        #[must_use]
        pub fn credentials(&self) -> &Credentials {
            &self.credentials
        }
    }

    /// A client state can only be [`Unauthenticated`] or [`Authenticated`].
    pub trait State: sealed::Sealed + Clone + Send + Sync + 'static {
        /// `Some` when requests made in this state must be signed.
        fn credentials(&self) -> Option<&Credentials>;
    }

    impl State for Unauthenticated {
        fn credentials(&self) -> Option<&Credentials> {
            None
        }
    }
    impl sealed::Sealed for Unauthenticated {}

    impl State for Authenticated {
        fn credentials(&self) -> Option<&Credentials> {
            Some(&self.credentials)
        }
    }
    impl sealed::Sealed for Authenticated {}

    mod sealed {
        pub trait Sealed {}
    }
}
