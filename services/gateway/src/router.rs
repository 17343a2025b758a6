use crate::handlers::{health, markets};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/markets", get(markets::list_markets).post(markets::create_market))
        .route("/markets/{id}", get(markets::get_market))
        .route("/markets/{id}/orders", post(markets::place_order))
        .route("/markets/{id}/resolve", post(markets::resolve_market))
        .route("/markets/{id}/positions", get(markets::get_positions))
        .route("/markets/{id}/order-book", get(markets::get_order_book))
        .route("/markets/{id}/trades", get(markets::get_trades))
        .route("/markets/{id}/issue", post(markets::issue_complete_set))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
