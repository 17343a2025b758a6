use crate::error::AppError;
use crate::models::{
    AccountQuery, AppJson, AppPath, AppQuery, CreateMarketRequest, IssueRequest, MarketResponse,
    OrderBookEntryResponse, OrderResultResponse, PlaceOrderRequest, PositionResponse,
    ResolveRequest, TradeResponse,
};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use matching_engine::{NewMarket, OrderRequest};
use types::ids::MarketId;
use types::numeric::Quantity;
use uuid::Uuid;

pub async fn list_markets(State(state): State<AppState>) -> Json<Vec<MarketResponse>> {
    let markets = state.registry.list_markets();
    Json(markets.into_iter().map(MarketResponse::from).collect())
}

pub async fn create_market(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMarketRequest>,
) -> Result<(StatusCode, Json<MarketResponse>), AppError> {
    let market = state.registry.create_market(NewMarket {
        question: payload.question,
        description: payload.description,
        initial_yes_price: payload.initial_price_yes,
        slug: payload.slug,
    })?;

    Ok((StatusCode::CREATED, Json(market.into())))
}

pub async fn get_market(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
) -> Result<Json<MarketResponse>, AppError> {
    let market = state.registry.get_market(&MarketId::from_uuid(market_id))?;
    Ok(Json(market.into()))
}

pub async fn place_order(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResultResponse>), AppError> {
    let request = OrderRequest::new(
        payload.side,
        payload.order_type,
        payload.price,
        Quantity::new(payload.quantity),
    )
    .for_account(payload.account_id.unwrap_or_default());

    let result = state
        .registry
        .submit_order(&MarketId::from_uuid(market_id), request)?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

pub async fn resolve_market(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
    AppJson(payload): AppJson<ResolveRequest>,
) -> Result<Json<MarketResponse>, AppError> {
    let report = state
        .registry
        .resolve(&MarketId::from_uuid(market_id), payload.outcome)?;
    Ok(Json(report.market.into()))
}

pub async fn get_positions(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AccountQuery>,
) -> Result<Json<Vec<PositionResponse>>, AppError> {
    let account_id = query.account_id.unwrap_or_default();
    let positions = state
        .registry
        .positions(&MarketId::from_uuid(market_id), &account_id)?;
    Ok(Json(positions.into_iter().map(PositionResponse::from).collect()))
}

pub async fn issue_complete_set(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
    AppJson(payload): AppJson<IssueRequest>,
) -> Result<Json<Vec<PositionResponse>>, AppError> {
    let positions = state.registry.issue_complete_set(
        &MarketId::from_uuid(market_id),
        payload.account_id.unwrap_or_default(),
        Quantity::new(payload.quantity),
    )?;
    Ok(Json(positions.into_iter().map(PositionResponse::from).collect()))
}

pub async fn get_order_book(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
) -> Result<Json<Vec<OrderBookEntryResponse>>, AppError> {
    let market_id = MarketId::from_uuid(market_id);
    let resting = state.registry.order_book(&market_id)?;
    Ok(Json(
        resting
            .iter()
            .map(|order| OrderBookEntryResponse::new(market_id, order))
            .collect(),
    ))
}

pub async fn get_trades(
    State(state): State<AppState>,
    AppPath(market_id): AppPath<Uuid>,
) -> Result<Json<Vec<TradeResponse>>, AppError> {
    let trades = state.registry.trades(&MarketId::from_uuid(market_id))?;
    Ok(Json(trades.iter().map(TradeResponse::from).collect()))
}
