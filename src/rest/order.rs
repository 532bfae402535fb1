use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::Result;
use crate::error::Error;
use crate::serde_helpers::path_with_query;
use crate::types::{
    ApiVersion, Candle, CandleInterval, Decimal, OrderType, SelfTradePrevention, Side,
    StopDirection, TimeInForce,
};

pub const MAX_REMARK_CHARS: usize = 50;
pub const DEFAULT_CANDLE_LIMIT: usize = 250;

/// Which order family a request targets. Each family has its own endpoint,
/// API version and validation rules.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum OrderShape {
    /// Plain market or limit order
    #[default]
    Plain,
    /// Order that activates once the price crosses `stop_price`
    Stop,
    /// One-cancels-the-other pair
    Oco,
    /// Futures order; not implemented by this client
    Futures,
}

impl OrderShape {
    /// Maps flag-style arguments onto a shape. OCO and stop cannot be combined.
    ///
    /// Order placement from flags goes through [`OrderRequest::from_flags`],
    /// which checks the quantity first.
    pub fn from_flags(stop: bool, oco: bool, futures: bool) -> Result<Self> {
        if oco && stop {
            return Err(Error::validation(
                "OCO and Stop Order can't be placed together",
            ));
        }

        Ok(if futures {
            OrderShape::Futures
        } else if oco {
            OrderShape::Oco
        } else if stop {
            OrderShape::Stop
        } else {
            OrderShape::Plain
        })
    }

    #[must_use]
    pub const fn version(self) -> ApiVersion {
        match self {
            OrderShape::Oco => ApiVersion::V3,
            _ => ApiVersion::V1,
        }
    }

    /// Placement path, relative to `/api/{version}/`.
    pub fn placement_path(self) -> Result<&'static str> {
        match self {
            OrderShape::Plain => Ok("orders"),
            OrderShape::Stop => Ok("stop-order"),
            OrderShape::Oco => Ok("oco/order"),
            OrderShape::Futures => Err(Self::futures_unsupported()),
        }
    }

    /// Fetch (`delete == false`) or cancel path of a single order.
    ///
    /// OCO lookups go through `oco/order/details/{id}`; cancellation uses the
    /// bare `oco/order/{id}` resource.
    pub fn lookup_path(self, order_id: &str, delete: bool) -> Result<String> {
        check_path_id("order id", order_id)?;

        let resource = match self {
            OrderShape::Plain => "order",
            OrderShape::Stop => "stop-order",
            OrderShape::Oco if delete => "oco/order",
            OrderShape::Oco => "oco/order/details",
            OrderShape::Futures => return Err(Self::futures_unsupported()),
        };

        Ok(format!("{resource}/{order_id}"))
    }

    fn futures_unsupported() -> Error {
        Error::unsupported("futures orders are not implemented")
    }
}

/// Rejects ids that would not survive as a single path segment.
///
/// Exchange-issued ids are alphanumeric; client ids are UUIDs.
pub(crate) fn check_path_id(what: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(Error::validation(format!(
            "{what} may only contain letters, digits, '-' and '_'"
        )));
    }

    Ok(())
}

/// Caller-supplied order fields. Built fresh for every call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderParams {
    pub side: Option<Side>,
    pub order_type: Option<OrderType>,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub limit_price: Option<Decimal>,
    pub stop: Option<StopDirection>,
    pub stp: Option<SelfTradePrevention>,
    pub remark: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    /// Seconds until a `GTT` order is cancelled
    pub cancel_after: Option<u64>,
    pub post_only: Option<bool>,
    pub hidden: Option<bool>,
    pub iceberg: Option<bool>,
    pub visible_size: Option<Decimal>,
}

impl OrderParams {
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side: Some(side),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub const fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub const fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    #[must_use]
    pub const fn with_limit_price(mut self, limit_price: Decimal) -> Self {
        self.limit_price = Some(limit_price);
        self
    }

    #[must_use]
    pub const fn with_stop(mut self, stop: StopDirection) -> Self {
        self.stop = Some(stop);
        self
    }

    #[must_use]
    pub const fn with_stp(mut self, stp: SelfTradePrevention) -> Self {
        self.stp = Some(stp);
        self
    }

    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    #[must_use]
    pub const fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    #[must_use]
    pub const fn with_cancel_after(mut self, seconds: u64) -> Self {
        self.cancel_after = Some(seconds);
        self
    }

    #[must_use]
    pub const fn with_post_only(mut self, post_only: bool) -> Self {
        self.post_only = Some(post_only);
        self
    }

    #[must_use]
    pub const fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    #[must_use]
    pub const fn with_iceberg(mut self, visible_size: Decimal) -> Self {
        self.iceberg = Some(true);
        self.visible_size = Some(visible_size);
        self
    }
}

/// A validated order, ready to be serialized and signed.
///
/// The only way to obtain one is [`OrderRequest::new`] (or
/// [`OrderRequest::from_flags`]), and its fields cannot be changed afterwards:
///
/// ```compile_fail
/// use kucoin_spot_client::rest::{OrderParams, OrderRequest, OrderShape};
/// use kucoin_spot_client::types::{Decimal, Side};
///
/// let params = OrderParams::new(Side::Buy);
/// let Ok(mut order) = OrderRequest::new("BTC-USDT", Decimal::ONE, params, OrderShape::Plain)
/// else {
///     return;
/// };
/// order.size = Decimal::NEGATIVE_ONE;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub(crate) client_oid: String,
    pub(crate) symbol: String,
    pub(crate) side: Side,
    #[serde(rename = "type")]
    pub(crate) order_type: OrderType,
    pub(crate) size: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stop_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stop: Option<StopDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stp: Option<SelfTradePrevention>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) time_in_force: Option<TimeInForce>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cancel_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) post_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) iceberg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) visible_size: Option<Decimal>,

    #[serde(skip)]
    pub(crate) shape: OrderShape,
}

impl OrderRequest {
    /// Validates `params` for `shape` and tags the result with a fresh client
    /// order id. Checks run in a fixed order and the first failure wins:
    ///
    /// 1. `size` is positive
    /// 2. a side is present
    /// 3. `remark` fits in 50 characters
    /// 4. OCO: `stop_price` and `price` are present and positive
    /// 5. otherwise: `limit` orders carry a price, and stop orders carry a
    ///    positive `stop_price` and a stop direction
    ///
    /// Closed sets (type, stp, stop direction) are enforced by their types.
    /// Futures orders pass validation and are rejected afterwards.
    pub fn new(
        symbol: impl Into<String>,
        size: Decimal,
        params: OrderParams,
        shape: OrderShape,
    ) -> Result<Self> {
        check_size(size)?;

        let side = params
            .side
            .ok_or_else(|| Error::validation("Invalid side (please use buy or sell)"))?;

        if params
            .remark
            .as_deref()
            .is_some_and(|remark| remark.chars().count() > MAX_REMARK_CHARS)
        {
            return Err(Error::validation(format!(
                "Remark should be at most {MAX_REMARK_CHARS} characters"
            )));
        }

        let order_type = params.order_type.unwrap_or_default();

        if shape == OrderShape::Oco {
            if !is_positive(params.stop_price) {
                return Err(Error::validation(
                    "Stop Price must be specified for OCO orders",
                ));
            }
            if !is_positive(params.price) {
                return Err(Error::validation("Price must be specified for OCO orders"));
            }
        } else {
            if order_type == OrderType::Limit && params.price.is_none() {
                return Err(Error::validation(
                    "Price must be specified for limit orders",
                ));
            }
            if shape == OrderShape::Stop {
                let Some(stop_price) = params.stop_price else {
                    return Err(Error::validation(
                        "Stop Price must be specified for stop orders",
                    ));
                };
                if stop_price <= Decimal::ZERO {
                    return Err(Error::validation("Stop Price must be greater than 0"));
                }
                if params.stop.is_none() {
                    return Err(Error::validation("Stop must be specified for stop orders"));
                }
            }
        }

        shape.placement_path()?;

        Ok(Self {
            client_oid: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            order_type,
            size,
            price: params.price,
            stop_price: params.stop_price,
            limit_price: params.limit_price,
            stop: params.stop,
            stp: params.stp,
            remark: params.remark,
            time_in_force: params.time_in_force,
            cancel_after: params.cancel_after,
            post_only: params.post_only,
            hidden: params.hidden,
            iceberg: params.iceberg,
            visible_size: params.visible_size,
            shape,
        })
    }

    /// Flag-style constructor. The quantity is checked before the OCO/stop
    /// exclusivity, then the remaining checks run as in [`OrderRequest::new`].
    pub fn from_flags(
        symbol: impl Into<String>,
        size: Decimal,
        params: OrderParams,
        stop: bool,
        oco: bool,
        futures: bool,
    ) -> Result<Self> {
        check_size(size)?;
        let shape = OrderShape::from_flags(stop, oco, futures)?;
        Self::new(symbol, size, params, shape)
    }

    /// JSON body exactly as it is signed and sent.
    pub fn body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn client_oid(&self) -> &str {
        &self.client_oid
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[must_use]
    pub fn size(&self) -> Decimal {
        self.size
    }

    #[must_use]
    pub fn shape(&self) -> OrderShape {
        self.shape
    }
}

fn check_size(size: Decimal) -> Result<()> {
    if size <= Decimal::ZERO {
        return Err(Error::validation("Quantity should be greater than 0"));
    }
    Ok(())
}

fn is_positive(value: Option<Decimal>) -> bool {
    value.is_some_and(|v| v > Decimal::ZERO)
}

/// Query for `/api/v1/market/candles`.
#[derive(Clone, Debug, PartialEq)]
pub struct CandleRequest {
    pub symbol: String,
    pub interval: CandleInterval,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl CandleRequest {
    #[must_use]
    pub fn new(symbol: impl Into<String>, interval: CandleInterval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start: None,
            end: None,
            limit: DEFAULT_CANDLE_LIMIT,
        }
    }

    #[must_use]
    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Path and encoded query, relative to `/api/v1/`. The range is only
    /// sent when both bounds are set.
    pub fn path(&self) -> Result<String> {
        let range = self.start.zip(self.end);
        let query = CandleQuery {
            symbol: &self.symbol,
            interval: self.interval.to_string(),
            start_at: range.map(|(start, _)| start.timestamp()),
            end_at: range.map(|(_, end)| end.timestamp()),
        };

        path_with_query("market/candles", &query)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CandleQuery<'a> {
    symbol: &'a str,
    #[serde(rename = "type")]
    interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_at: Option<i64>,
}

/// Keeps the first `limit` rows in their original order.
#[must_use]
pub fn truncate_candles(mut candles: Vec<Candle>, limit: usize) -> Vec<Candle> {
    candles.truncate(limit);
    candles
}
