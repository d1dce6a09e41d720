use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::dashboard_dto::{ActionResponse, CandidateRow, InterviewRow, OfferRow},
    error::Result,
    services::dashboard_service::{DashboardAction, DashboardQuery, DashboardView},
    AppState,
};

#[axum::debug_handler]
pub async fn candidates(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let view = state.dashboard.candidates(&query, state.dashboard_page_size);
    Json(DashboardView {
        page: view.page.map(CandidateRow::from),
        kpis: view.kpis,
    })
}

#[axum::debug_handler]
pub async fn offers(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let view = state.dashboard.offers(&query, state.dashboard_page_size);
    let store = &state.dashboard;
    Json(DashboardView {
        page: view
            .page
            .map(|offer| {
                let stage = store.candidate_stage(offer.candidate_id);
                OfferRow::new(offer, stage)
            }),
        kpis: view.kpis,
    })
}

#[axum::debug_handler]
pub async fn interviews(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let view = state.dashboard.interviews(&query, state.dashboard_page_size);
    let store = &state.dashboard;
    Json(DashboardView {
        page: view.page.map(|interview| {
            let stage = store.candidate_stage(interview.candidate_id);
            InterviewRow::new(interview, stage)
        }),
        kpis: view.kpis,
    })
}

#[axum::debug_handler]
pub async fn positions(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    Json(state.dashboard.positions(&query, state.dashboard_page_size))
}

#[axum::debug_handler]
pub async fn dispatch_action(
    State(state): State<AppState>,
    Json(action): Json<DashboardAction>,
) -> Result<impl IntoResponse> {
    let changed = state.dashboard.dispatch(action)?;
    Ok(Json(ActionResponse { changed }))
}
