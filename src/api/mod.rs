pub mod analyze;
pub mod health;

use crate::comparator::MarketRiskService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketRiskService>,
}

impl AppState {
    pub fn new(service: Arc<MarketRiskService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/analyze", post(analyze::analyze))
        .layer(cors)
        .with_state(state)
}
