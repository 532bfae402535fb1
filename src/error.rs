use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;

use crate::types::Side;

/// Broad category of a failed call.
///
/// `Transport` means no response was received at all, which callers must keep
/// apart from `Status` (the exchange answered with a non-200) and `Exchange`
/// (the exchange answered 200 with an embedded error code).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// DNS, connect, timeout or any other failure before a response arrived
    Transport,
    /// HTTP status other than 200
    Status,
    /// HTTP 200 with a business error code in the envelope
    Exchange,
    /// Order parameters rejected before any network I/O
    Validation,
    /// OCO trigger prices on the wrong side of the current price
    PriceRelationship,
    /// Server time could not be fetched
    TimeFetch,
    /// Login probe was rejected by the exchange
    Authentication,
    /// Requested feature is not implemented by this client
    Unsupported,
    /// Decoding, URL or header construction failures
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    backtrace: Backtrace,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self::with_source(
            Kind::Validation,
            Validation {
                reason: reason.into(),
            },
        )
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Self::with_source(
            Kind::Status,
            Status {
                status_code,
                method,
                path,
                message: message.into(),
            },
        )
    }

    pub fn exchange<C: Into<String>, S: Into<String>>(code: C, message: S) -> Self {
        Self::with_source(
            Kind::Exchange,
            ExchangeFailure {
                code: code.into(),
                message: message.into(),
            },
        )
    }

    #[must_use]
    pub fn price_relationship(
        side: Side,
        stop_price: Decimal,
        take_profit_price: Decimal,
        last_price: Decimal,
    ) -> Self {
        Self::with_source(
            Kind::PriceRelationship,
            PriceRelationship {
                side,
                stop_price,
                take_profit_price,
                last_price,
            },
        )
    }

    pub fn time_fetch<S: Into<String>>(message: S) -> Self {
        Self::with_source(Kind::TimeFetch, Message(message.into()))
    }

    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::with_source(Kind::Authentication, Message(message.into()))
    }

    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::with_source(Kind::Unsupported, Message(message.into()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

/// Business error reported inside a 200 response.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExchangeFailure {
    pub code: String,
    pub message: String,
}

impl fmt::Display for ExchangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exchange rejected request ({}): {}", self.code, self.message)
    }
}

impl StdError for ExchangeFailure {}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceRelationship {
    pub side: Side,
    pub stop_price: Decimal,
    pub take_profit_price: Decimal,
    pub last_price: Decimal,
}

impl fmt::Display for PriceRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Buy => write!(
                f,
                "buy OCO requires take profit ({}) < last price ({}) < stop price ({})",
                self.take_profit_price, self.last_price, self.stop_price
            ),
            Side::Sell => write!(
                f,
                "sell OCO requires stop price ({}) < last price ({}) < take profit ({})",
                self.stop_price, self.last_price, self.take_profit_price
            ),
        }
    }
}

impl StdError for PriceRelationship {}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            Error::with_source(Kind::Transport, e)
        } else {
            Error::with_source(Kind::Internal, e)
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

#[cfg(feature = "tracing")]
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Error::with_source(Kind::Internal, e)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn validation_error_exposes_reason() {
        let err = Error::validation("Quantity should be greater than 0");

        assert_eq!(err.kind(), Kind::Validation);
        let validation = err.downcast_ref::<Validation>().expect("validation source");
        assert_eq!(validation.reason, "Quantity should be greater than 0");
        assert_eq!(
            err.to_string(),
            "Validation: invalid: Quantity should be greater than 0"
        );
    }

    #[test]
    fn status_error_formats_call_details() {
        let err = Error::status(
            StatusCode::UNAUTHORIZED,
            Method::GET,
            "/api/v1/accounts".to_owned(),
            "Invalid KC-API-SIGN",
        );

        assert_eq!(err.kind(), Kind::Status);
        assert_eq!(
            err.to_string(),
            "Status: error(401 Unauthorized) making GET call to /api/v1/accounts with Invalid KC-API-SIGN"
        );
    }

    #[test]
    fn exchange_error_keeps_code() {
        let err = Error::exchange("400100", "account not found");

        let failure = err.downcast_ref::<ExchangeFailure>().expect("exchange source");
        assert_eq!(failure.code, "400100");
        assert_eq!(failure.message, "account not found");
    }

    #[test]
    fn price_relationship_message_names_ordering() {
        let err = Error::price_relationship(Side::Buy, dec!(95000), dec!(90000), dec!(96000));

        assert_eq!(err.kind(), Kind::PriceRelationship);
        assert!(err.to_string().contains("take profit (90000) < last price (96000)"));
    }
}
