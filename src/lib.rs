pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::{
    api_client::ApiClient, application_service::ApplicationGateway,
    application_service::ApplicationService, auth_service::AuthService,
    business_unit_service::BusinessUnitService, dashboard_service::DashboardStore,
    document_service::DocumentService, job_service::JobService,
    notification_service::NotificationService, seed_service, user_service::UserService,
    wizard_service::WizardRegistry,
};
use crate::storage::{FileStore, KeyValueStore};

#[derive(Clone)]
pub struct AppState {
    pub dashboard_page_size: usize,
    pub job_service: JobService,
    pub business_unit_service: BusinessUnitService,
    pub application_service: ApplicationService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub notification_service: NotificationService,
    pub document_service: DocumentService,
    pub gateway: Arc<dyn ApplicationGateway>,
    pub wizards: WizardRegistry,
    pub dashboard: Arc<DashboardStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> error::Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage_dir).await?);
        Self::with_store(config, store)
    }

    /// Builds the state over an explicit key-value backend.
    pub fn with_store(config: &Config, store: Arc<dyn KeyValueStore>) -> error::Result<Self> {
        let api = ApiClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let application_service = ApplicationService::new(api.clone());

        Ok(Self {
            dashboard_page_size: config.dashboard_page_size,
            job_service: JobService::new(api.clone()),
            business_unit_service: BusinessUnitService::new(api.clone()),
            gateway: Arc::new(application_service.clone()),
            application_service,
            auth_service: AuthService::new(api.clone()),
            user_service: UserService::new(api.clone()),
            notification_service: NotificationService::new(api),
            document_service: DocumentService::new(Duration::from_millis(config.cv_parse_delay_ms)),
            wizards: WizardRegistry::new(store),
            dashboard: Arc::new(DashboardStore::new(seed_service::sample_data())),
        })
    }
}
