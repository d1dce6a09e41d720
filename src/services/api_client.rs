use std::fmt::Display;
use std::time::Duration;

use reqwest::{multipart::Form, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::{Error, Result};
use crate::middleware::auth::Bearer;

/// Normalized failure of an upstream call. `status` is 0 when no response arrived.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ApiError {
    pub fn network(err: impl Display) -> Self {
        tracing::warn!(error = %err, "Upstream request failed before a response arrived");
        Self {
            status: 0,
            message: "Network error".to_string(),
            data: None,
        }
    }

    pub fn invalid_request(err: impl Display) -> Self {
        Self {
            status: 400,
            message: err.to_string(),
            data: None,
        }
    }

    pub fn from_response(status: u16, body: Option<JsonValue>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| {
                b.get("message")
                    .or_else(|| b.get("error"))
                    .and_then(|m| m.as_str())
            })
            .map(str::to_string)
            .unwrap_or_else(|| default_message(status).to_string());

        Self {
            status,
            message,
            data: body,
        }
    }

    pub fn requires_login(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    /// Text shown to the applicant next to the submit control.
    pub fn user_message(&self) -> String {
        match self.status {
            0 => "Network error. Please check your connection and try again.".to_string(),
            400 => "Invalid data. Please check your form and try again.".to_string(),
            413 => "The uploaded file is too large. Please choose a smaller file.".to_string(),
            422 => "Some fields are invalid. Please review your form.".to_string(),
            500 | 503 => "Server error. Please try again later.".to_string(),
            _ => self.message.clone(),
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Session expired. Please sign in again.",
        403 => "Access denied",
        404 => "Resource not found",
        413 => "Payload too large",
        422 => "Validation failed",
        500 => "Internal server error",
        503 => "Service unavailable",
        _ => "Request failed",
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Shared HTTP client for the recruitment REST API. Every call names the caller's
/// [`Bearer`]; the client itself holds no session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid API_BASE_URL '{}': {}", base_url, e)))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(ApiError::invalid_request)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, bearer: &Bearer) -> ApiResult<T> {
        let url = self.url(path)?;
        self.send(self.client.get(url), bearer).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, bearer: &Bearer) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.client.get(url).query(query), bearer).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, bearer: &Bearer) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.client.post(url).json(body), bearer).await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B, bearer: &Bearer) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.client.put(url).json(body), bearer).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, bearer: &Bearer) -> ApiResult<T> {
        let url = self.url(path)?;
        self.send(self.client.patch(url), bearer).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        bearer: &Bearer,
    ) -> ApiResult<T> {
        let url = self.url(path)?;
        self.send(self.client.post(url).multipart(form), bearer).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, bearer: &Bearer) -> ApiResult<T> {
        let request = match bearer.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(ApiError::network)?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(ApiError::network)?;
            let value = if bytes.is_empty() {
                JsonValue::Null
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    tracing::error!(error = %e, "Upstream returned a body that is not JSON");
                    ApiError::from_response(StatusCode::BAD_GATEWAY.as_u16(), None)
                })?
            };
            return serde_json::from_value(value).map_err(|e| {
                tracing::error!(error = %e, "Upstream response did not match the expected shape");
                ApiError {
                    status: StatusCode::BAD_GATEWAY.as_u16(),
                    message: "Unexpected response from server".to_string(),
                    data: None,
                }
            });
        }

        let body = response.json::<JsonValue>().await.ok();
        let err = ApiError::from_response(status.as_u16(), body);
        if err.requires_login() {
            tracing::warn!("Upstream rejected the caller's session");
        } else {
            tracing::warn!(status = err.status, message = %err.message, "Upstream request rejected");
        }
        Err(err)
    }
}
