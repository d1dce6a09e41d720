use super::api_client::{ApiClient, ApiResult};
use crate::middleware::auth::Bearer;
use crate::models::job::{BusinessUnit, Job};

#[derive(Clone)]
pub struct BusinessUnitService {
    api: ApiClient,
}

impl BusinessUnitService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, bearer: &Bearer) -> ApiResult<Vec<BusinessUnit>> {
        self.api.get("business-units", bearer).await
    }

    pub async fn get(&self, id: &str, bearer: &Bearer) -> ApiResult<BusinessUnit> {
        self.api.get(&format!("business-units/{}", id), bearer).await
    }

    pub async fn jobs(&self, id: &str, bearer: &Bearer) -> ApiResult<Vec<Job>> {
        self.api
            .get(&format!("business-units/{}/jobs", id), bearer)
            .await
    }
}
