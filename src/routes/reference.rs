use axum::{response::IntoResponse, Json};

use crate::utils::countries::COUNTRIES;

/// Dial codes offered next to the phone field.
#[axum::debug_handler]
pub async fn list_countries() -> impl IntoResponse {
    Json(COUNTRIES)
}
