use serde_json::Value as JsonValue;

use super::api_client::{ApiClient, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::notification::Notification;

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, bearer: &Bearer) -> ApiResult<Vec<Notification>> {
        self.api.get("notifications", bearer).await
    }

    pub async fn mark_read(&self, id: &str, bearer: &Bearer) -> ApiResult<()> {
        let _: JsonValue = self
            .api
            .patch(&format!("notifications/{}/read", id), bearer)
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, bearer: &Bearer) -> ApiResult<()> {
        let _: JsonValue = self.api.patch("notifications/read-all", bearer).await?;
        Ok(())
    }
}
