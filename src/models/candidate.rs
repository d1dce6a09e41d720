use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pipeline::PipelineStage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub position: String,
    pub business_unit: String,
    pub stage: PipelineStage,
    pub assessment_score: f64,
    pub experience_years: u32,
    pub applied_on: NaiveDate,
}
