//! Request and response bodies of the HTTP API
//!
//! Field names follow the wire contract the web client consumes. Prices and
//! money amounts go out as JSON numbers.

use axum::extract::{FromRequest, FromRequestParts};
use chrono::{DateTime, Utc};
use matching_engine::book::RestingOrder;
use matching_engine::SubmitResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{AccountId, MarketId, OrderId, TradeId};
use types::market::{Market, MarketStatus, Outcome};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, OrderType, Side};
use types::position::PositionEntry;
use types::trade::Trade;

use crate::error::AppError;

/// `Json` whose rejections render as `{"detail": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMarketRequest {
    pub question: String,
    pub description: Option<String>,
    pub initial_price_yes: Price,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketResponse {
    pub id: MarketId,
    pub slug: String,
    pub question: String,
    pub description: Option<String>,
    pub status: MarketStatus,
    pub outcome: Option<Outcome>,
    pub yes_price: Price,
    pub no_price: Price,
}

impl From<Market> for MarketResponse {
    fn from(market: Market) -> Self {
        Self {
            id: market.id,
            slug: market.slug,
            question: market.question,
            description: market.description,
            status: market.status,
            outcome: market.outcome,
            yes_price: market.yes_price,
            no_price: market.no_price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: u64,
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub id: TradeId,
    pub market_id: MarketId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub executed_at: DateTime<Utc>,
}

impl From<&Trade> for TradeResponse {
    fn from(trade: &Trade) -> Self {
        Self {
            id: trade.trade_id,
            market_id: trade.market_id,
            side: trade.side,
            price: trade.price,
            quantity: trade.quantity,
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            executed_at: DateTime::from_timestamp_nanos(trade.executed_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResultResponse {
    pub id: OrderId,
    pub market_id: MarketId,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub resting_quantity: Quantity,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_fill_price: Option<Decimal>,
    pub trades: Vec<TradeResponse>,
}

impl From<SubmitResult> for OrderResultResponse {
    fn from(result: SubmitResult) -> Self {
        let average_fill_price = result.average_fill_price();
        let order = result.order;
        Self {
            id: order.order_id,
            market_id: order.market_id,
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            quantity: order.quantity,
            filled_quantity: order.filled_quantity,
            resting_quantity: order.remaining_quantity,
            status: order.status,
            average_fill_price,
            trades: result.trades.iter().map(TradeResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionResponse {
    pub market_id: MarketId,
    pub side: Side,
    pub quantity: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub realized_pnl: Decimal,
}

impl From<PositionEntry> for PositionResponse {
    fn from(entry: PositionEntry) -> Self {
        Self {
            market_id: entry.market_id,
            side: entry.side,
            quantity: entry.quantity,
            average_price: entry.average_price,
            realized_pnl: entry.realized_pnl,
        }
    }
}

/// One resting order, not an aggregated level
#[derive(Debug, Clone, Serialize)]
pub struct OrderBookEntryResponse {
    pub id: OrderId,
    pub market_id: MarketId,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderBookEntryResponse {
    pub fn new(market_id: MarketId, resting: &RestingOrder) -> Self {
        Self {
            id: resting.order_id,
            market_id,
            side: resting.side,
            order_type: resting.order_type,
            price: resting.price,
            quantity: resting.remaining_quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueRequest {
    pub quantity: u64,
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountQuery {
    pub account_id: Option<AccountId>,
}
