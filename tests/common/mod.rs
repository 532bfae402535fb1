#![allow(dead_code, reason = "each test binary uses a different subset")]

use httpmock::prelude::*;
use httpmock::Mock;
use kucoin_spot_client::auth::Credentials;
use kucoin_spot_client::rest::Policies;
use kucoin_spot_client::{Config, Kucoin};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

pub const SERVER_TIME: i64 = 1_700_000_000_000;
pub const API_KEY: &str = "key-123";
/// Signature of `GET /api/v1/accounts` at `SERVER_TIME` with secret `secret`.
pub const ACCOUNTS_SIGNATURE: &str = "ka2jGwVPj+HJ5t7L4fEM4HttekAXENIQpmo8ulfZmV8=";
/// HMAC of `passphrase` keyed by `secret`.
pub const SIGNED_PASSPHRASE: &str = "sWd5rQWAxDzYJTY6K2sov6seA0l3uNP70anWxITg8IA=";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn credentials() -> Credentials {
    Credentials::new(
        API_KEY,
        SecretString::from("secret"),
        SecretString::from("passphrase"),
    )
}

pub fn config(server: &MockServer) -> Config {
    config_with(server, Policies::default())
}

pub fn config_with(server: &MockServer, policies: Policies) -> Config {
    Config::builder()
        .credentials(credentials())
        .host(Url::parse(&server.base_url()).expect("mock server url"))
        .policies(policies)
        .build()
}

pub fn ok(data: Value) -> Value {
    json!({ "code": "200000", "data": data })
}

pub fn mock_time(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/timestamp");
        then.status(200).json_body(ok(json!(SERVER_TIME)));
    })
}

pub fn mock_accounts(server: &MockServer, status: u16, body: Value) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/accounts");
        then.status(status).json_body(body);
    })
}

pub fn accounts_payload() -> Value {
    ok(json!([
        {
            "id": "5bd6e9286d99522a52e458de",
            "currency": "BTC",
            "type": "trade",
            "balance": "0.5",
            "available": "0.4",
            "holds": "0.1"
        },
        {
            "id": "5bd6e9216d99522a52e458d6",
            "currency": "USDT",
            "type": "trade",
            "balance": "10000",
            "available": "10000",
            "holds": "0"
        }
    ]))
}

pub fn ticker_payload(price: &str) -> Value {
    ok(json!({
        "time": SERVER_TIME,
        "sequence": "1550467636704",
        "price": price,
        "size": "0.17",
        "bestBid": price,
        "bestBidSize": "0.5",
        "bestAsk": price,
        "bestAskSize": "1.2"
    }))
}

pub fn mock_ticker<'a>(server: &'a MockServer, symbol: &str, price: &str) -> Mock<'a> {
    let body = ticker_payload(price);
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/market/orderbook/level1")
            .query_param("symbol", symbol);
        then.status(200).json_body(body);
    })
}

/// Logs in against `server` with a server-clock time policy.
pub fn login(server: &MockServer) -> Kucoin {
    init_tracing();
    mock_time(server);
    mock_accounts(server, 200, accounts_payload());
    Kucoin::login(config(server)).expect("login against mock server")
}
