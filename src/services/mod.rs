pub mod api_client;
pub mod application_service;
pub mod auth_service;
pub mod business_unit_service;
pub mod dashboard_service;
pub mod document_service;
pub mod job_service;
pub mod media_service;
pub mod notification_service;
pub mod seed_service;
pub mod user_service;
pub mod wizard_service;
