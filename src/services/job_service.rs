use serde::Serialize;

use super::api_client::{ApiClient, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::job::Job;

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

#[derive(Clone)]
pub struct JobService {
    api: ApiClient,
}

impl JobService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, bearer: &Bearer) -> ApiResult<Vec<Job>> {
        self.api.get("jobs", bearer).await
    }

    pub async fn featured(&self, bearer: &Bearer) -> ApiResult<Vec<Job>> {
        self.api.get("jobs/featured", bearer).await
    }

    pub async fn search(&self, query: &str, bearer: &Bearer) -> ApiResult<Vec<Job>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(bearer).await;
        }
        self.api
            .get_with_query("jobs/search", &SearchQuery { q: query }, bearer)
            .await
    }

    pub async fn get(&self, id: &str, bearer: &Bearer) -> ApiResult<Job> {
        self.api.get(&format!("jobs/{}", id), bearer).await
    }
}
