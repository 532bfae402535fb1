//! Named trading operations on top of [`RestClient`].
//!
//! Each method assembles a fresh [`OrderParams`] for its order family and
//! hands it to the validated placement path.

use serde_json::Value;

use crate::Result;
use crate::error::Error;
use crate::rest::{
    CandleRequest, Config, OrderParams, OrderRequest, OrderShape, RestClient, TradingType,
};
use crate::types::{
    Account, CancelledOrders, Candle, Decimal, OrderType, PlacedOrder, Side, StopDirection, Ticker,
};

/// Logged-in exchange session.
#[derive(Clone, Debug)]
pub struct Kucoin {
    rest: RestClient,
    broker: String,
    trading_type: TradingType,
}

impl Kucoin {
    /// Connects and fails unless the credential probe succeeded.
    pub fn login(config: Config) -> Result<Self> {
        let rest = RestClient::connect(&config)?;
        Self::from_rest(config, rest)
    }

    /// Like [`Kucoin::login`] with a custom HTTP client.
    pub fn login_with_client(config: Config, client: reqwest::blocking::Client) -> Result<Self> {
        let rest = RestClient::connect_with_client(&config, client)?;
        Self::from_rest(config, rest)
    }

    fn from_rest(config: Config, rest: RestClient) -> Result<Self> {
        if !rest.is_authenticated() {
            return Err(Error::authentication("Login Failed"));
        }

        Ok(Self {
            rest,
            trading_type: config.trading_type(),
            broker: config.broker,
        })
    }

    #[must_use]
    pub fn broker(&self) -> &str {
        &self.broker
    }

    #[must_use]
    pub fn trading_type(&self) -> TradingType {
        self.trading_type
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.rest.is_authenticated()
    }

    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn balance(&self) -> Result<Vec<Account>> {
        self.rest.accounts()
    }

    pub fn account(&self, account_id: &str) -> Result<Account> {
        self.rest.account(account_id)
    }

    pub fn ticker(&self, symbol: &str) -> Result<Ticker> {
        self.rest.ticker(symbol)
    }

    pub fn last_price(&self, symbol: &str) -> Result<Decimal> {
        self.rest.last_price(symbol)
    }

    pub fn load_markets(&self) -> Result<Vec<String>> {
        self.rest.markets()
    }

    pub fn fetch_ohlcv(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        self.rest.candles(request)
    }

    /// Raw entry point: any parameter set, any shape.
    pub fn create_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        params: OrderParams,
        shape: OrderShape,
    ) -> Result<PlacedOrder> {
        self.rest.create_order(symbol, quantity, params, shape)
    }

    pub fn create_market_buy_order(&self, symbol: &str, quantity: Decimal) -> Result<PlacedOrder> {
        self.create_order(symbol, quantity, OrderParams::new(Side::Buy), OrderShape::Plain)
    }

    pub fn create_market_sell_order(&self, symbol: &str, quantity: Decimal) -> Result<PlacedOrder> {
        self.create_order(symbol, quantity, OrderParams::new(Side::Sell), OrderShape::Plain)
    }

    pub fn create_limit_buy_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(Side::Buy)
            .with_order_type(OrderType::Limit)
            .with_price(price);
        self.create_order(symbol, quantity, params, OrderShape::Plain)
    }

    pub fn create_limit_sell_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(Side::Sell)
            .with_order_type(OrderType::Limit)
            .with_price(price);
        self.create_order(symbol, quantity, params, OrderShape::Plain)
    }

    /// Market order that triggers at `stop_price` (stop-loss direction).
    pub fn create_stop_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(side)
            .with_stop(StopDirection::Loss)
            .with_stop_price(stop_price);
        self.create_order(symbol, quantity, params, OrderShape::Stop)
    }

    /// Limit order at `price` that triggers at `stop_price` (stop-loss direction).
    pub fn create_stop_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(side)
            .with_stop(StopDirection::Loss)
            .with_stop_price(stop_price)
            .with_order_type(OrderType::Limit)
            .with_price(price);
        self.create_order(symbol, quantity, params, OrderShape::Stop)
    }

    /// Market order that triggers at `take_profit_price` (entry direction).
    pub fn create_take_profit(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        take_profit_price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(side)
            .with_stop(StopDirection::Entry)
            .with_stop_price(take_profit_price);
        self.create_order(symbol, quantity, params, OrderShape::Stop)
    }

    /// Limit order at `price` that triggers at `take_profit_price`.
    pub fn create_take_profit_limit(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(side)
            .with_stop(StopDirection::Entry)
            .with_stop_price(take_profit_price)
            .with_order_type(OrderType::Limit)
            .with_price(price);
        self.create_order(symbol, quantity, params, OrderShape::Stop)
    }

    /// Buy OCO: requires `take_profit_price < last price < stop_price`.
    pub fn create_buy_oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        stop_price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<PlacedOrder> {
        self.create_oco_order(symbol, Side::Buy, quantity, stop_price, take_profit_price)
    }

    /// Sell OCO: requires `stop_price < last price < take_profit_price`.
    pub fn create_sell_oco_order(
        &self,
        symbol: &str,
        quantity: Decimal,
        stop_price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<PlacedOrder> {
        self.create_oco_order(symbol, Side::Sell, quantity, stop_price, take_profit_price)
    }

    fn create_oco_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<PlacedOrder> {
        let params = OrderParams::new(side)
            .with_stop_price(stop_price)
            .with_price(take_profit_price)
            .with_limit_price(take_profit_price);
        // validate before the ticker round trip
        let order = OrderRequest::new(symbol, quantity, params, OrderShape::Oco)?;

        let last_price = self.rest.last_price(symbol)?;
        check_oco_prices(side, stop_price, take_profit_price, last_price)?;

        self.rest.place_order(&order)
    }

    pub fn fetch_order(&self, order_id: &str, shape: OrderShape) -> Result<Value> {
        self.rest.fetch_order(order_id, shape)
    }

    /// Cancels on the resource matching `shape`.
    pub fn cancel_order(&self, order_id: &str, shape: OrderShape) -> Result<CancelledOrders> {
        self.rest.cancel_order(order_id, shape)
    }
}

/// Checks that both OCO trigger prices sit on the correct side of the
/// current price.
pub fn check_oco_prices(
    side: Side,
    stop_price: Decimal,
    take_profit_price: Decimal,
    last_price: Decimal,
) -> Result<()> {
    let ordered = match side {
        Side::Buy => take_profit_price < last_price && last_price < stop_price,
        Side::Sell => stop_price < last_price && last_price < take_profit_price,
    };

    if ordered {
        Ok(())
    } else {
        Err(Error::price_relationship(
            side,
            stop_price,
            take_profit_price,
            last_price,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::Kind;

    #[test]
    fn buy_oco_needs_take_profit_below_and_stop_above() {
        check_oco_prices(Side::Buy, dec!(95000), dec!(90000), dec!(92000)).unwrap();

        for (stop, take_profit) in [
            (dec!(95000), dec!(92000)),
            (dec!(92000), dec!(90000)),
            (dec!(90000), dec!(95000)),
        ] {
            let err = check_oco_prices(Side::Buy, stop, take_profit, dec!(92000)).unwrap_err();
            assert_eq!(err.kind(), Kind::PriceRelationship);
        }
    }

    #[test]
    fn sell_oco_is_the_mirror_image() {
        check_oco_prices(Side::Sell, dec!(90000), dec!(95000), dec!(92000)).unwrap();

        let err = check_oco_prices(Side::Sell, dec!(95000), dec!(90000), dec!(92000)).unwrap_err();
        assert_eq!(err.kind(), Kind::PriceRelationship);

        let err = check_oco_prices(Side::Sell, dec!(92000), dec!(95000), dec!(92000)).unwrap_err();
        assert_eq!(err.kind(), Kind::PriceRelationship);
    }
}
