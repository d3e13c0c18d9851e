//! Loan and deposit endpoints.

use super::ApiResult;
use crate::server::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use irrbb_core::config::PaginationConfig;
use irrbb_core::{Deposit, DepositTerms, Loan, LoanTerms};
use serde::Deserialize;
use std::sync::Arc;

/// `?skip=&limit=` for instrument listings.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    PaginationConfig::DEFAULT_LIMIT
}

pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Loan>>> {
    let Query(page) = page?;
    Ok(Json(state.api.list_loans(page.skip, page.limit).await?))
}

pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Loan>> {
    let Path(id) = id?;
    Ok(Json(state.api.get_loan(id).await?))
}

pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoanTerms>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let Json(terms) = payload?;
    let loan = state.api.create_loan(terms).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

pub async fn list_deposits(
    State(state): State<Arc<AppState>>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Deposit>>> {
    let Query(page) = page?;
    Ok(Json(state.api.list_deposits(page.skip, page.limit).await?))
}

pub async fn get_deposit(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Deposit>> {
    let Path(id) = id?;
    Ok(Json(state.api.get_deposit(id).await?))
}

pub async fn create_deposit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DepositTerms>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Deposit>)> {
    let Json(terms) = payload?;
    let deposit = state.api.create_deposit(terms).await?;
    Ok((StatusCode::CREATED, Json(deposit)))
}
