//! Dashboard and analytics endpoints.

use super::ApiResult;
use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use irrbb_core::config::PaginationConfig;
use irrbb_core::{DashboardData, DashboardMetric, PortfolioComposition, SnapshotSummary};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default)]
    pub scenario: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsParams {
    #[serde(default = "default_metrics_limit")]
    pub limit: u32,
}

fn default_metrics_limit() -> u32 {
    PaginationConfig::DEFAULT_METRICS_LIMIT
}

pub async fn live_data(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardData>> {
    Ok(Json(state.api.live_dashboard().await?))
}

pub async fn portfolio_composition(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PortfolioComposition>>> {
    Ok(Json(state.api.portfolio_composition().await?))
}

/// Body is optional; an empty body records the default scenario.
///
/// A body that is present must be a valid `SnapshotRequest`.
pub async fn record_snapshot(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SnapshotSummary>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SnapshotRequest::default()
    } else {
        let Json(request) = Json::<SnapshotRequest>::from_bytes(&body)?;
        request
    };
    let summary = state.api.record_snapshot(request.scenario).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn list_metrics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MetricsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<DashboardMetric>>> {
    let Query(params) = params?;
    Ok(Json(state.api.list_metrics(params.limit).await?))
}
