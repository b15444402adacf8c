//! Handlers for the aggregation API (§4.7, §6).

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;

use crate::dto::{DashboardResponse, PairingDto, PercentileDto};
use crate::error::HttpError;
use crate::state::AppState;

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, HttpError> {
    let stats = state.aggregation.dashboard_stats().await?;
    let service_mix = state.aggregation.service_mix().await?;
    let vendor_usage = state.aggregation.vendor_usage().await?;
    Ok(Json(DashboardResponse::new(stats, service_mix, vendor_usage)))
}

pub async fn pairings(State(state): State<AppState>) -> Result<Json<Vec<PairingDto>>, HttpError> {
    let pairings = state.aggregation.top_pairings().await?;
    Ok(Json(pairings.into_iter().map(PairingDto::from).collect()))
}

pub async fn percentiles(State(state): State<AppState>) -> Result<Json<HashMap<String, PercentileDto>>, HttpError> {
    let by_metric = state.aggregation.percentiles().await?;
    let out = by_metric
        .into_iter()
        .map(|(name, percentiles)| (name.as_str().to_string(), PercentileDto::from(percentiles)))
        .collect();
    Ok(Json(out))
}
