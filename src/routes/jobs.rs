use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::{error::Result, middleware::auth::Bearer, AppState};

#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>, bearer: Bearer) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.list(&bearer).await?))
}

#[axum::debug_handler]
pub async fn featured_jobs(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.featured(&bearer).await?))
}

#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    bearer: Bearer,
    Query(query): Query<JobSearchQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.search(&query.q, &bearer).await?))
}

#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.job_service.get(&id, &bearer).await?))
}

#[axum::debug_handler]
pub async fn list_business_units(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<impl IntoResponse> {
    Ok(Json(state.business_unit_service.list(&bearer).await?))
}

#[axum::debug_handler]
pub async fn get_business_unit(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.business_unit_service.get(&id, &bearer).await?))
}

#[axum::debug_handler]
pub async fn business_unit_jobs(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.business_unit_service.jobs(&id, &bearer).await?))
}

#[axum::debug_handler]
pub async fn application_status(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.application_service.status(&id, &bearer).await?))
}
