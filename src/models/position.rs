use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    OnHold,
    Filled,
}

impl PositionStatus {
    pub fn key(self) -> &'static str {
        match self {
            PositionStatus::Open => "open",
            PositionStatus::OnHold => "on_hold",
            PositionStatus::Filled => "filled",
        }
    }
}

/// Manpower line for one role inside a business unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: Uuid,
    pub title: String,
    pub business_unit: String,
    pub planned_headcount: u32,
    pub filled_headcount: u32,
    pub opened_on: NaiveDate,
    pub status: PositionStatus,
}

impl PositionRecord {
    pub fn open_vacancies(&self) -> u32 {
        self.planned_headcount.saturating_sub(self.filled_headcount)
    }
}
