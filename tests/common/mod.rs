#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gdax_client_sdk::auth::Credentials;
use gdax_client_sdk::auth::state::Authenticated;
use gdax_client_sdk::rest::{Client, Config};
use hmac::{Hmac, Mac as _};
use httpmock::MockServer;
use reqwest::StatusCode;
use serde_json::json;
use sha2::Sha256;

pub const KEY: &str = "test-key";
/// base64 of `s`
pub const SECRET: &str = "cw==";
pub const PASSPHRASE: &str = "test-passphrase";

pub const CB_ACCESS_KEY: &str = "CB-ACCESS-KEY";
pub const CB_ACCESS_SIGN: &str = "CB-ACCESS-SIGN";
pub const CB_ACCESS_TIMESTAMP: &str = "CB-ACCESS-TIMESTAMP";
pub const CB_ACCESS_PASSPHRASE: &str = "CB-ACCESS-PASSPHRASE";

/// The epoch served by [`mock_server_time`].
pub const SERVER_EPOCH: &str = "1000.5";

pub type TestClient = Client<Authenticated>;

#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new(KEY, SECRET, PASSPHRASE).unwrap()
}

/// base64(HMAC-SHA256(base64decode(secret), prehash)), computed without the crate's signer.
#[must_use]
pub fn expected_signature(prehash: &str) -> String {
    let secret = STANDARD.decode(SECRET).unwrap();
    let mut mac = Hmac::<Sha256>::new_from_slice(&secret).unwrap();
    mac.update(prehash.as_bytes());

    STANDARD.encode(mac.finalize().into_bytes())
}

/// Serves `GET /time` with [`SERVER_EPOCH`].
pub fn mock_server_time(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/time");
        then.status(StatusCode::OK).json_body(json!({
            "iso": "1970-01-01T00:16:40.5Z",
            "epoch": 1000.5
        }));
    })
}

/// An authenticated client against `server` that signs with the mocked server clock, so every
/// signature is deterministic. Pair with [`mock_server_time`].
pub fn create_authenticated(server: &MockServer) -> anyhow::Result<TestClient> {
    let config = Config::builder().use_server_time(true).build();

    Ok(Client::new(&server.base_url(), config)?.authenticate(credentials())?)
}
