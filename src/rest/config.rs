use secrecy::{ExposeSecret as _, SecretString};
use strum_macros::Display;
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;
use crate::rest::policy::Policies;

pub const PRODUCTION_HOST: &str = "https://api.kucoin.com";
pub const SANDBOX_HOST: &str = "https://openapi-sandbox.kucoin.com";
pub const DEFAULT_BROKER: &str = "KuCoin";

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum TradingType {
    Spot,
    Futures,
}

/// Raw values typically passed from app-level bot config.
#[derive(Clone, Debug)]
pub struct RawConfig {
    pub api_key: String,
    pub api_secret: SecretString,
    pub api_passphrase: SecretString,
    pub host: Option<String>,
    pub testnet: bool,
    pub futures: bool,
    pub broker: Option<String>,
}

/// Client configuration.
#[derive(Clone, Debug, bon::Builder)]
pub struct Config {
    pub credentials: Credentials,
    /// Use the sandbox host instead of production
    #[builder(default)]
    pub testnet: bool,
    /// Accepted for parity with futures accounts; futures orders are rejected
    #[builder(default)]
    pub futures: bool,
    #[builder(into, default = DEFAULT_BROKER.to_owned())]
    pub broker: String,
    /// Overrides the host picked from `testnet`
    pub host: Option<Url>,
    #[builder(default)]
    pub policies: Policies,
}

impl Config {
    pub fn from_raw(raw: RawConfig, policies: Policies) -> Result<Self> {
        if raw.api_key.trim().is_empty() {
            return Err(Error::validation("api key must not be empty"));
        }
        if raw.api_secret.expose_secret().is_empty() {
            return Err(Error::validation("api secret must not be empty"));
        }
        if raw.api_passphrase.expose_secret().is_empty() {
            return Err(Error::validation("api passphrase must not be empty"));
        }

        let host = raw.host.as_deref().map(Url::parse).transpose()?;
        let credentials = Credentials::new(raw.api_key, raw.api_secret, raw.api_passphrase);

        Ok(Config::builder()
            .credentials(credentials)
            .testnet(raw.testnet)
            .futures(raw.futures)
            .broker(raw.broker.unwrap_or_else(|| DEFAULT_BROKER.to_owned()))
            .maybe_host(host)
            .policies(policies)
            .build())
    }

    /// Host every request is sent to.
    pub fn base_url(&self) -> Result<Url> {
        match &self.host {
            Some(host) => Ok(host.clone()),
            None if self.testnet => Ok(Url::parse(SANDBOX_HOST)?),
            None => Ok(Url::parse(PRODUCTION_HOST)?),
        }
    }

    #[must_use]
    pub fn trading_type(&self) -> TradingType {
        if self.futures {
            TradingType::Futures
        } else {
            TradingType::Spot
        }
    }
}
