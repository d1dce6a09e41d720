use super::api_client::{ApiClient, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::application::UserApplication;
use crate::models::user::UserProfile;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn applications(&self, user_id: &str, bearer: &Bearer) -> ApiResult<Vec<UserApplication>> {
        self.api
            .get(&format!("users/{}/applications", user_id), bearer)
            .await
    }

    pub async fn profile(&self, user_id: &str, bearer: &Bearer) -> ApiResult<UserProfile> {
        self.api
            .get(&format!("users/{}/profile", user_id), bearer)
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
        bearer: &Bearer,
    ) -> ApiResult<UserProfile> {
        self.api
            .put_json(&format!("users/{}/profile", user_id), profile, bearer)
            .await
    }
}
