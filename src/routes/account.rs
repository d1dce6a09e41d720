use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::Result,
    middleware::auth::Bearer,
    models::user::UserProfile,
    services::auth_service::{LoginPayload, RegisterPayload},
    AppState,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = state.auth_service.login(&payload).await?;
    tracing::info!(email = %payload.email, "Signed in");
    Ok(Json(session))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = state.auth_service.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Always tells the caller to drop its token, whatever the upstream says.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, bearer: Bearer) -> impl IntoResponse {
    if let Err(e) = state.auth_service.logout(&bearer).await {
        tracing::warn!(status = e.status, "Upstream logout failed");
    }
    Json(json!({ "loggedOut": true }))
}

#[axum::debug_handler]
pub async fn verify(State(state): State<AppState>, bearer: Bearer) -> Result<impl IntoResponse> {
    Ok(Json(state.auth_service.verify(&bearer).await?))
}

#[axum::debug_handler]
pub async fn user_applications(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.user_service.applications(&user_id, &bearer).await?))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.user_service.profile(&user_id, &bearer).await?))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(user_id): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<impl IntoResponse> {
    profile.validate()?;
    Ok(Json(
        state
            .user_service
            .update_profile(&user_id, &profile, &bearer)
            .await?,
    ))
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<impl IntoResponse> {
    Ok(Json(state.notification_service.list(&bearer).await?))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.notification_service.mark_read(&id, &bearer).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<impl IntoResponse> {
    state.notification_service.mark_all_read(&bearer).await?;
    Ok(StatusCode::NO_CONTENT)
}
