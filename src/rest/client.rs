use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::Client as ReqwestClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::{self, Credentials};
use crate::error::{Error, Kind};
use crate::rest::order::{
    CandleRequest, OrderParams, OrderRequest, OrderShape, check_path_id, truncate_candles,
};
use crate::rest::{Config, Policies, TimePolicy};
use crate::serde_helpers::path_with_query;
use crate::types::{Account, ApiVersion, CancelledOrders, Candle, Decimal, PlacedOrder, Ticker};
use crate::{Result, Timestamp};

/// Blocking client for the exchange's spot REST API.
///
/// Construction performs one signed probe against the account listing; the
/// outcome is kept as [`RestClient::is_authenticated`] and never refreshed.
#[derive(Clone, Debug)]
pub struct RestClient {
    host: Url,
    credentials: Credentials,
    policies: Policies,
    authenticated: bool,
    client: ReqwestClient,
}

impl RestClient {
    /// Creates a client and probes the credentials.
    pub fn connect(config: &Config) -> Result<Self> {
        Self::connect_with_client(config, ReqwestClient::new())
    }

    /// Creates a client with a custom HTTP client and probes the credentials.
    pub fn connect_with_client(config: &Config, client: ReqwestClient) -> Result<Self> {
        let mut rest = Self {
            host: config.base_url()?,
            credentials: config.credentials.clone(),
            policies: config.policies,
            authenticated: false,
            client,
        };
        rest.authenticated = rest.probe()?;

        Ok(rest)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Server clock in Unix milliseconds. Unauthenticated.
    ///
    /// Any answer other than a well-formed 200 is a [`Kind::TimeFetch`] error;
    /// a missing response stays [`Kind::Transport`].
    pub fn server_time(&self) -> Result<Timestamp> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(ApiVersion::V1, "timestamp")?)
            .build()?;

        crate::request::<Timestamp>(&self.client, request, None).map_err(|e| match e.kind() {
            Kind::Transport => e,
            _ => Error::time_fetch(format!("Error in fetching time: {e}")),
        })
    }

    /// Lists every account (main, trade, margin) with its balances.
    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.signed(Method::GET, ApiVersion::V1, "accounts", None)
    }

    /// Balance detail of a single account.
    pub fn account(&self, account_id: &str) -> Result<Account> {
        check_path_id("account id", account_id)?;
        self.signed(
            Method::GET,
            ApiVersion::V1,
            &format!("accounts/{account_id}"),
            None,
        )
    }

    /// Best bid/ask and last traded price of `symbol`.
    pub fn ticker(&self, symbol: &str) -> Result<Ticker> {
        let path = path_with_query("market/orderbook/level1", &SymbolQuery { symbol })?;
        self.signed(Method::GET, ApiVersion::V1, &path, None)
    }

    pub fn last_price(&self, symbol: &str) -> Result<Decimal> {
        Ok(self.ticker(symbol)?.price)
    }

    /// Names of the tradable markets (`USDS`, `BTC`, `ALTS`, ...).
    pub fn markets(&self) -> Result<Vec<String>> {
        self.signed(Method::GET, ApiVersion::V1, "markets", None)
    }

    /// Candle history, cut down to `request.limit` rows. Unauthenticated.
    pub fn candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        let http = self
            .client
            .request(Method::GET, self.endpoint(ApiVersion::V1, &request.path()?)?)
            .build()?;
        let candles: Vec<Candle> = crate::request(&self.client, http, None)?;

        Ok(truncate_candles(candles, request.limit))
    }

    /// Validates and places an order. Nothing is sent if validation fails.
    pub fn create_order(
        &self,
        symbol: &str,
        size: Decimal,
        params: OrderParams,
        shape: OrderShape,
    ) -> Result<PlacedOrder> {
        let order = OrderRequest::new(symbol, size, params, shape)?;
        self.place_order(&order)
    }

    /// Places an order built by [`OrderRequest::new`]. Each value is sent once.
    pub(crate) fn place_order(&self, order: &OrderRequest) -> Result<PlacedOrder> {
        let path = order.shape.placement_path()?;
        let body = order.body()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            client_oid = %order.client_oid,
            symbol = %order.symbol,
            side = %order.side,
            shape = ?order.shape,
            "placing order"
        );

        self.signed(Method::POST, order.shape.version(), path, Some(body))
    }

    /// Fetches one order. The payload differs per shape and is returned as-is.
    pub fn fetch_order(&self, order_id: &str, shape: OrderShape) -> Result<Value> {
        self.fetch_or_delete_order(order_id, shape, false)
    }

    /// Cancels one order.
    pub fn cancel_order(&self, order_id: &str, shape: OrderShape) -> Result<CancelledOrders> {
        let data = self.fetch_or_delete_order(order_id, shape, true)?;
        Ok(serde_json::from_value(data)?)
    }

    /// `GET` (or `DELETE` when `delete`) on the order resource for `shape`.
    pub fn fetch_or_delete_order(
        &self,
        order_id: &str,
        shape: OrderShape,
        delete: bool,
    ) -> Result<Value> {
        let path = shape.lookup_path(order_id, delete)?;
        let method = if delete { Method::DELETE } else { Method::GET };

        self.signed(method, shape.version(), &path, None)
    }

    /// Signed `GET accounts`; `true` only on HTTP 200.
    fn probe(&self) -> Result<bool> {
        let path = "accounts";
        let headers = self.headers(&Method::GET, ApiVersion::V1, path, None)?;
        let request = self
            .client
            .request(Method::GET, self.endpoint(ApiVersion::V1, path)?)
            .headers(headers)
            .build()?;

        let status = self.client.execute(request)?.status();

        #[cfg(feature = "tracing")]
        {
            if status == StatusCode::OK {
                tracing::info!(host = %self.host, "credentials accepted");
            } else {
                tracing::warn!(host = %self.host, status = %status, "credentials rejected");
            }
        }

        Ok(status == StatusCode::OK)
    }

    fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        version: ApiVersion,
        path: &str,
        body: Option<String>,
    ) -> Result<T> {
        let headers = self.headers(&method, version, path, body.as_deref())?;

        let mut builder = self.client.request(method, self.endpoint(version, path)?);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.build()?;

        crate::request(&self.client, request, Some(headers))
    }

    fn headers(
        &self,
        method: &Method,
        version: ApiVersion,
        path: &str,
        body: Option<&str>,
    ) -> Result<reqwest::header::HeaderMap> {
        let timestamp = self.timestamp()?;
        auth::create_headers(
            &self.credentials,
            self.policies.key_version,
            method,
            timestamp,
            version,
            path,
            body,
        )
    }

    fn timestamp(&self) -> Result<Timestamp> {
        match self.policies.time {
            TimePolicy::Server => self.server_time(),
            TimePolicy::Local => Ok(TimePolicy::local_timestamp()),
        }
    }

    fn endpoint(&self, version: ApiVersion, path: &str) -> Result<Url> {
        Ok(self.host.join(&format!("api/{version}/{path}"))?)
    }
}

#[derive(Serialize)]
struct SymbolQuery<'a> {
    symbol: &'a str,
}
