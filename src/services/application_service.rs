use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;

use super::api_client::{ApiClient, ApiError, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::application::{ApplicationStatus, SubmitResponse};
use crate::models::draft::FileAttachment;

/// Everything sent in the single multipart submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub application_data: JsonValue,
    pub cv: Option<FileAttachment>,
    pub video: Option<FileAttachment>,
    /// Session of the applicant submitting, forwarded to `/apply`.
    pub bearer: Bearer,
}

/// Where a finished draft goes. The wizard only depends on this seam.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    async fn submit(&self, submission: Submission) -> ApiResult<SubmitResponse>;
}

#[derive(Clone)]
pub struct ApplicationService {
    api: ApiClient,
}

impl ApplicationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn apply(&self, submission: Submission) -> ApiResult<SubmitResponse> {
        let mut form = Form::new().text("application_data", submission.application_data.to_string());
        if let Some(cv) = submission.cv {
            form = form.part("cv_file", file_part(cv)?);
        }
        if let Some(video) = submission.video {
            form = form.part("video_file", file_part(video)?);
        }

        let response: SubmitResponse = self
            .api
            .post_multipart("apply", form, &submission.bearer)
            .await?;
        tracing::info!(application_id = %response.application_id, "Application submitted");
        Ok(response)
    }

    pub async fn status(&self, application_id: &str, bearer: &Bearer) -> ApiResult<ApplicationStatus> {
        self.api
            .get(&format!("applications/{}/status", application_id), bearer)
            .await
    }
}

#[async_trait]
impl ApplicationGateway for ApplicationService {
    async fn submit(&self, submission: Submission) -> ApiResult<SubmitResponse> {
        self.apply(submission).await
    }
}

fn file_part(file: FileAttachment) -> ApiResult<Part> {
    Part::bytes(file.data.to_vec())
        .file_name(file.name)
        .mime_str(&file.content_type)
        .map_err(ApiError::invalid_request)
}
