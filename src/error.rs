use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::draft::DraftError;
use crate::services::api_client::ApiError;
use crate::services::dashboard_service::DashboardError;
use crate::services::wizard_service::WizardError;
use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Draft(err) => (draft_status(&err), err.to_string()),
            Error::Wizard(err) => (wizard_status(&err), err.to_string()),
            Error::Dashboard(err) => (dashboard_status(&err), err.to_string()),
            Error::Upstream(err) => {
                let status = StatusCode::from_u16(err.status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, err.user_message())
            }
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Storage(err) => {
                tracing::error!(error = %err, "Draft storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

fn draft_status(err: &DraftError) -> StatusCode {
    match err {
        DraftError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        DraftError::RowOutOfRange { .. } | DraftError::UnknownSkill(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn wizard_status(err: &WizardError) -> StatusCode {
    match err {
        WizardError::Draft(inner) => draft_status(inner),
        WizardError::StepOutOfRange(_) => StatusCode::BAD_REQUEST,
        WizardError::SubmissionInFlight | WizardError::AlreadySubmitted => StatusCode::CONFLICT,
        WizardError::StepInvalid(_)
        | WizardError::TermsNotAccepted
        | WizardError::VideoMissing
        | WizardError::AttachmentNeedsReupload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn dashboard_status(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
        DashboardError::InvalidTransition { .. } => StatusCode::CONFLICT,
        DashboardError::InvalidScore(_) => StatusCode::BAD_REQUEST,
    }
}
