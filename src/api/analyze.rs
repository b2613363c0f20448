use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use crate::domain::AnalysisReport;
use crate::error::AppError;

const MISSING_PARAMETERS: &str = "Missing required parameters: market_address and vnet_id";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub market_address: Option<String>,
    pub vnet_id: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, AppError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected analyze request body: {}", e);
        AppError::BadRequest(MISSING_PARAMETERS.to_string())
    })?;

    let (market_address, vnet_id) = match (request.market_address, request.vnet_id) {
        (Some(market), Some(vnet)) => (market, vnet),
        _ => return Err(AppError::BadRequest(MISSING_PARAMETERS.to_string())),
    };

    info!("POST /api/analyze market={} vnet={}", market_address, vnet_id);

    let report = state
        .service
        .analyze_market(&market_address, &vnet_id)
        .await?;

    Ok(Json(report))
}
