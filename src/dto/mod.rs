pub mod dashboard_dto;
pub mod wizard_dto;
