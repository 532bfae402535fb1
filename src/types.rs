use std::str::FromStr;

pub use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use strum_macros::Display;

use crate::Timestamp;
use crate::error::Error;

/// Code the exchange puts in the envelope of every successful response.
pub const SUCCESS_CODE: &str = "200000";

/// REST API version segment, `/api/{version}/...`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
    V3,
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(Error::validation("Invalid side (please use buy or sell)")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            _ => Err(Error::validation(
                "Invalid type (please use limit or market)",
            )),
        }
    }
}

/// Trigger direction of a stop order.
///
/// `Loss` fires when the price falls to (sell) or rises to (buy) the stop
/// price; `Entry` is the take-profit direction.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StopDirection {
    Loss,
    Entry,
}

impl FromStr for StopDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss" => Ok(StopDirection::Loss),
            "entry" => Ok(StopDirection::Entry),
            _ => Err(Error::validation(
                "Invalid stop value (please use loss or entry)",
            )),
        }
    }
}

/// Self-trade prevention mode.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SelfTradePrevention {
    /// Cancel newest
    CN,
    /// Cancel oldest
    CO,
    /// Cancel both
    CB,
    /// Decrease and cancel
    DC,
}

impl FromStr for SelfTradePrevention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CN" => Ok(SelfTradePrevention::CN),
            "CO" => Ok(SelfTradePrevention::CO),
            "CB" => Ok(SelfTradePrevention::CB),
            "DC" => Ok(SelfTradePrevention::DC),
            _ => Err(Error::validation(
                "Invalid stp value (please use CN, CO, CB, or DC)",
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TimeInForce {
    GTC,
    GTT,
    IOC,
    FOK,
}

impl FromStr for TimeInForce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GTC" => Ok(TimeInForce::GTC),
            "GTT" => Ok(TimeInForce::GTT),
            "IOC" => Ok(TimeInForce::IOC),
            "FOK" => Ok(TimeInForce::FOK),
            other => Err(Error::validation(format!(
                "Invalid timeInForce `{other}` (please use GTC, GTT, IOC or FOK)"
            ))),
        }
    }
}

/// Candle width accepted by `/api/v1/market/candles`.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum CandleInterval {
    #[strum(serialize = "1min")]
    OneMinute,
    #[strum(serialize = "3min")]
    ThreeMinutes,
    #[strum(serialize = "5min")]
    FiveMinutes,
    #[strum(serialize = "15min")]
    FifteenMinutes,
    #[strum(serialize = "30min")]
    ThirtyMinutes,
    #[default]
    #[strum(serialize = "1hour")]
    OneHour,
    #[strum(serialize = "2hour")]
    TwoHours,
    #[strum(serialize = "4hour")]
    FourHours,
    #[strum(serialize = "6hour")]
    SixHours,
    #[strum(serialize = "8hour")]
    EightHours,
    #[strum(serialize = "12hour")]
    TwelveHours,
    #[strum(serialize = "1day")]
    OneDay,
    #[strum(serialize = "1week")]
    OneWeek,
}

/// `{ code, data, msg }` wrapper around every REST payload.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub data: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwraps `data`, turning a non-success `code` into an exchange error.
    pub fn into_data(self) -> crate::Result<T> {
        if self.code != SUCCESS_CODE {
            let message = self
                .msg
                .unwrap_or_else(|| format!("exchange error code {}", self.code));
            return Err(Error::exchange(self.code, message));
        }

        self.data
            .ok_or_else(|| Error::exchange(self.code, "response carried no data"))
    }
}

/// Level-1 order book snapshot.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub sequence: String,
    pub price: Decimal,
    pub size: Decimal,
    pub best_bid: Decimal,
    pub best_bid_size: Decimal,
    pub best_ask: Decimal,
    pub best_ask_size: Decimal,
    pub time: Timestamp,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: Option<String>,
    pub currency: String,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    pub balance: Decimal,
    pub available: Decimal,
    pub holds: Decimal,
}

/// One OHLCV row. The exchange sends candles as string arrays ordered
/// `[time, open, close, high, low, volume, turnover]`, newest first.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "CandleRow")]
pub struct Candle {
    /// Candle start, Unix seconds
    pub time: i64,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
}

#[serde_as]
#[derive(Deserialize)]
struct CandleRow(
    #[serde_as(as = "DisplayFromStr")] i64,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
);

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        let CandleRow(time, open, close, high, low, volume, turnover) = row;
        Self {
            time,
            open,
            close,
            high,
            low,
            volume,
            turnover,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrders {
    #[serde(default)]
    pub cancelled_order_ids: Vec<String>,
}
