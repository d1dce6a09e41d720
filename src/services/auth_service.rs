use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use super::api_client::{ApiClient, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::user::{AuthSession, User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Sign-in flows. Tokens are handed back to the caller, which sends them on
/// later requests; nothing is kept here.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, payload: &LoginPayload) -> ApiResult<AuthSession> {
        self.api
            .post_json("auth/login", payload, &Bearer::anonymous())
            .await
    }

    pub async fn register(&self, payload: &RegisterPayload) -> ApiResult<AuthSession> {
        self.api
            .post_json("auth/register", payload, &Bearer::anonymous())
            .await
    }

    pub async fn logout(&self, bearer: &Bearer) -> ApiResult<()> {
        let _: JsonValue = self
            .api
            .post_json("auth/logout", &JsonValue::Null, bearer)
            .await?;
        Ok(())
    }

    pub async fn verify(&self, bearer: &Bearer) -> ApiResult<User> {
        self.api.get("auth/verify", bearer).await
    }
}
