use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Hire,
    Hold,
    Reject,
}

/// Committee scores on a 1..=5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Evaluation {
    #[validate(range(min = 1, max = 5))]
    pub technical: u8,
    #[validate(range(min = 1, max = 5))]
    pub communication: u8,
    #[validate(range(min = 1, max = 5))]
    pub culture_fit: u8,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Evaluation {
    pub fn average(&self) -> f64 {
        f64::from(u16::from(self.technical) + u16::from(self.communication) + u16::from(self.culture_fit))
            / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub position: String,
    pub business_unit: String,
    pub scheduled_on: NaiveDate,
    pub committee: Vec<String>,
    pub evaluation: Option<Evaluation>,
}
